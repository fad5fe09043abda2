/// Monotonic world tick counter.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    tick: u64,
}

impl Clock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// The current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
