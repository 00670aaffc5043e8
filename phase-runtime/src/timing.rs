//! Wall-clock timing for pass and engine measurement.

use std::time::Instant;

/// Wall-clock timer reporting milliseconds.
pub struct BenchTimer {
    start: Instant,
}

impl BenchTimer {
    /// Start the timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer was started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Return the elapsed milliseconds and start a new interval.
    pub fn lap_ms(&mut self) -> f64 {
        let elapsed = self.elapsed_ms();
        self.start = Instant::now();
        elapsed
    }
}

/// Run `f`, returning its output and the time it took in milliseconds.
pub fn time_ms<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let timer = BenchTimer::start();
    let out = f();
    (out, timer.elapsed_ms())
}
