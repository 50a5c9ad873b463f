/// Tracks simulation time: a monotonic tick counter and elapsed seconds.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
    elapsed: f64,
}

impl SimClock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame of `dt` seconds. Returns the new tick number.
    pub fn advance(&mut self, dt: f32) -> u64 {
        self.tick += 1;
        self.elapsed += f64::from(dt.max(0.0));
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seconds simulated since the clock was created.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
