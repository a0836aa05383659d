use rvisa_engine::config::{Config, Xlen};
use rvisa_engine::machine::Machine;
use rvisa_engine::sim::{Program, SimState, Simulator};
use tracing_subscriber::EnvFilter;

/// Text base of the default memory layout.
pub const TEXT: u64 = 0x0040_0000;

/// Data base of the default memory layout.
pub const DATA: u64 = 0x1001_0000;

/// Installs a test-writer subscriber once per process; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// RV32 with M, F and D.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// RV64 with M, F and D.
    pub fn rv64() -> Self {
        Self::with_config(Config::rv64())
    }

    /// RV32 or RV64 with the C extension enabled.
    pub fn compressed(xlen: Xlen) -> Self {
        let mut config = Config::default();
        config.general.xlen = xlen;
        config.general.extensions.c = true;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let sim = Simulator::new(&config).unwrap();
        Self { sim }
    }

    /// Loads 32-bit instruction words at the text base.
    pub fn load_program(mut self, words: &[u32]) -> Self {
        self.sim.load_program(&Program::from_words(words)).unwrap();
        self
    }

    /// Loads instruction words and initialized data.
    pub fn load_with_data(mut self, words: &[u32], data: &[u8]) -> Self {
        let program = Program::from_words(words).with_data(data.to_vec());
        self.sim.load_program(&program).unwrap();
        self
    }

    /// Loads 16-bit parcels at the text base.
    pub fn load_parcels(mut self, parcels: &[u16]) -> Self {
        let program = Program {
            text: parcels.iter().flat_map(|p| p.to_le_bytes()).collect(),
            data: Vec::new(),
        };
        self.sim.load_program(&program).unwrap();
        self
    }

    pub fn step(&mut self) -> SimState {
        self.sim.step().unwrap()
    }

    /// Executes `count` single steps.
    pub fn steps(&mut self, count: usize) -> SimState {
        let mut state = self.sim.state().clone();
        for _ in 0..count {
            state = self.step();
        }
        state
    }

    /// Runs with a generous step budget.
    pub fn run(&mut self) -> SimState {
        self.sim.run(Some(100_000)).unwrap()
    }

    pub fn machine(&self) -> &Machine {
        self.sim.machine()
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        self.sim.machine_mut()
    }

    /// Reads `x{reg}`.
    pub fn x(&self, reg: u32) -> u64 {
        self.machine().x(reg as usize)
    }

    /// Writes `x{reg}`.
    pub fn set_x(&mut self, reg: u32, value: u64) {
        self.machine_mut().set_x(reg as usize, value);
    }

    pub fn pc(&self) -> u64 {
        self.machine().pc()
    }
}
