use std::time::Duration;

/// Fixed-timestep simulation clock. Simulated time only moves when a tick
/// is taken, never with the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    dt: Duration,
    elapsed: Duration,
    ticks: u64,
}

impl SimClock {
    pub fn new(dt: Duration) -> Self {
        Self {
            dt,
            elapsed: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Clock with `dt = 1 / hz`, rounded to the nearest nanosecond.
    pub fn from_tick_rate(hz: f32) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self::new(Duration::from_nanos((1e9 / hz as f64).round() as u64))
    }

    pub fn advance(&mut self) -> Duration {
        self.ticks += 1;
        self.elapsed += self.dt;
        self.elapsed
    }

    pub fn dt(&self) -> Duration {
        self.dt
    }

    /// Step interval in milliseconds, the unit physics engines take.
    pub fn dt_ms(&self) -> f32 {
        (self.dt.as_secs_f64() * 1000.0) as f32
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.ticks = 0;
    }
}
