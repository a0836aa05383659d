//! System instructions: environment calls, breakpoints, `uret`, fences, and
//! the Zicsr register accessors.

use super::decode::InstructionBits;
use super::instruction::{BasicInstruction, Extension, Format};
use super::rv32i::I_MASK;
use crate::common::Trap;
use crate::machine::Machine;

/// Mask fixing every bit of the encoding.
const EXACT_MASK: u32 = 0xFFFF_FFFF;

/// The system table.
pub static INSTRUCTIONS: &[BasicInstruction] = &[
    BasicInstruction::new("ecall", Format::None, EXACT_MASK, 0x0000_0073, Extension::I,
        "Issue a system call: service number in a7", ecall),
    BasicInstruction::new("ebreak", Format::None, EXACT_MASK, 0x0010_0073, Extension::I,
        "Pause execution", ebreak),
    BasicInstruction::new("uret", Format::None, EXACT_MASK, 0x0020_0073, Extension::N,
        "Return from a user trap handler to uepc", uret),
    BasicInstruction::new("fence", Format::I, I_MASK, 0x0F, Extension::I,
        "Order memory accesses (no effect on a single hart)", nop),
    BasicInstruction::new("fence.i", Format::I, I_MASK, 0x100F, Extension::Zifencei,
        "Synchronize instruction fetch with stores (no effect here)", nop),
    BasicInstruction::new("csrrw", Format::I, I_MASK, 0x1073, Extension::Zicsr,
        "Atomic read/write CSR: t0 = csr, csr = t1", csrrw),
    BasicInstruction::new("csrrs", Format::I, I_MASK, 0x2073, Extension::Zicsr,
        "Atomic read and set bits: t0 = csr, csr |= t1", csrrs),
    BasicInstruction::new("csrrc", Format::I, I_MASK, 0x3073, Extension::Zicsr,
        "Atomic read and clear bits: t0 = csr, csr &= ~t1", csrrc),
    BasicInstruction::new("csrrwi", Format::I, I_MASK, 0x5073, Extension::Zicsr,
        "Atomic read/write CSR immediate", csrrwi),
    BasicInstruction::new("csrrsi", Format::I, I_MASK, 0x6073, Extension::Zicsr,
        "Atomic read and set bits immediate", csrrsi),
    BasicInstruction::new("csrrci", Format::I, I_MASK, 0x7073, Extension::Zicsr,
        "Atomic read and clear bits immediate", csrrci),
];

fn ecall(m: &mut Machine, _inst: u32) -> Result<(), Trap> {
    m.environment_call()
}

fn ebreak(m: &mut Machine, _inst: u32) -> Result<(), Trap> {
    Err(Trap::Breakpoint(m.pc().wrapping_sub(m.instruction_length())))
}

fn uret(m: &mut Machine, _inst: u32) -> Result<(), Trap> {
    m.trap_return();
    Ok(())
}

fn nop(_m: &mut Machine, _inst: u32) -> Result<(), Trap> {
    Ok(())
}

/// Reads the CSR, optionally writes `update(old)`, then writes the old value
/// to `rd`. Unknown CSRs and writes to read-only ones are illegal.
#[inline]
fn access(
    m: &mut Machine,
    inst: u32,
    update: impl FnOnce(u64) -> Option<u64>,
) -> Result<(), Trap> {
    let number = inst.csr();
    let old = m.csr(number).ok_or(Trap::IllegalInstruction(inst))?;
    if let Some(value) = update(old) {
        let _ = m
            .set_csr(number, value)
            .map_err(|_| Trap::IllegalInstruction(inst))?;
    }
    m.set_x(inst.rd(), old);
    Ok(())
}

fn csrrw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let source = m.x(inst.rs1());
    access(m, inst, |_| Some(source))
}

fn csrrs(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let mask = m.x(inst.rs1());
    let writes = inst.rs1() != 0;
    access(m, inst, |old| writes.then_some(old | mask))
}

fn csrrc(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let mask = m.x(inst.rs1());
    let writes = inst.rs1() != 0;
    access(m, inst, |old| writes.then_some(old & !mask))
}

fn csrrwi(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let uimm = inst.rs1() as u64;
    access(m, inst, |_| Some(uimm))
}

fn csrrsi(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let uimm = inst.rs1() as u64;
    access(m, inst, |old| (uimm != 0).then_some(old | uimm))
}

fn csrrci(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let uimm = inst.rs1() as u64;
    access(m, inst, |old| (uimm != 0).then_some(old & !uimm))
}
