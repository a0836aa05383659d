//! Publish/subscribe notices with subscriber-controlled credit.
//!
//! A [`Publisher`] fans items out to any number of [`Subscription`]s. Each
//! subscription owns a `crossbeam-channel` queue and a credit counter:
//! 1. **Credit:** an item is delivered only while the subscriber has outstanding
//!    credit, granted with [`Subscription::request`]. Items published without
//!    credit are dropped for that subscriber, so a slow consumer bounds its own
//!    queue instead of stalling the execution thread.
//! 2. **Cancellation:** [`Subscription::cancel`] and delivery both take the
//!    subscription's own lock, so once `cancel` returns no further item is queued.
//!    Dropping a subscription cancels it; publishers prune it on their next
//!    publish.
//! 3. **Sharing:** one subscription may be attached to several publishers; the
//!    register file uses this to offer a single listener for all registers.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

#[derive(Debug)]
struct Gate {
    credit: u64,
    cancelled: bool,
}

#[derive(Debug)]
struct Slot<T> {
    gate: Mutex<Gate>,
    sender: Sender<T>,
}

impl<T> Slot<T> {
    /// Queues `item` if the subscriber has credit. Returns false once the
    /// subscription is cancelled or its receiver is gone.
    fn offer(&self, item: T) -> bool {
        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if gate.cancelled {
            return false;
        }
        if gate.credit > 0 {
            if self.sender.send(item).is_err() {
                gate.cancelled = true;
                return false;
            }
            gate.credit -= 1;
        }
        true
    }
}

/// Receiving end of a notice stream.
#[derive(Debug)]
pub struct Subscription<T> {
    slot: Arc<Slot<T>>,
    receiver: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Creates a subscription that is not yet attached to any publisher.
    pub fn detached() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            slot: Arc::new(Slot {
                gate: Mutex::new(Gate {
                    credit: 0,
                    cancelled: false,
                }),
                sender,
            }),
            receiver,
        }
    }

    /// Grants credit for `count` more items.
    pub fn request(&self, count: u64) {
        let mut gate = self.slot.gate.lock().unwrap_or_else(PoisonError::into_inner);
        gate.credit = gate.credit.saturating_add(count);
    }

    /// Outstanding credit.
    pub fn credit(&self) -> u64 {
        self.slot
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .credit
    }

    /// Stops delivery. Items already queued stay readable.
    pub fn cancel(&self) {
        let mut gate = self.slot.gate.lock().unwrap_or_else(PoisonError::into_inner);
        gate.cancelled = true;
        gate.credit = 0;
    }

    /// Returns true once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.slot
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancelled
    }

    /// Next queued item, if any.
    pub fn try_recv(&self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the next item.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All queued items, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// The underlying channel, for use with `crossbeam_channel::select!`.
    pub fn receiver(&self) -> &Receiver<T> {
        &self.receiver
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sending end shared by all subscribers of one source.
#[derive(Debug)]
pub struct Publisher<T> {
    subscribers: Mutex<Vec<Arc<Slot<T>>>>,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> Publisher<T> {
    /// Creates a publisher without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subscription attached to this publisher, with no credit.
    pub fn subscribe(&self) -> Subscription<T> {
        let subscription = Subscription::detached();
        self.attach(&subscription);
        subscription
    }

    /// Attaches an existing subscription. Attaching twice has no effect.
    pub fn attach(&self, subscription: &Subscription<T>) {
        let mut subscribers = self.lock();
        if !subscribers
            .iter()
            .any(|slot| Arc::ptr_eq(slot, &subscription.slot))
        {
            subscribers.push(Arc::clone(&subscription.slot));
        }
    }

    /// Detaches a subscription without cancelling it.
    pub fn detach(&self, subscription: &Subscription<T>) {
        self.lock()
            .retain(|slot| !Arc::ptr_eq(slot, &subscription.slot));
    }

    /// Offers `item` to every subscriber and prunes cancelled ones.
    pub fn publish(&self, item: &T) {
        self.lock().retain(|slot| slot.offer(item.clone()));
    }

    /// Number of attached, not yet pruned, subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nobody is listening, letting callers skip building notices.
    pub fn is_idle(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<Slot<T>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
