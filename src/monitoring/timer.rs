//! Request timing handle.

use std::time::Instant;

/// Captures a start instant; [`end`](Timer::end) reports elapsed milliseconds.
///
/// Holds no shared state, so any number may run concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer started. May be called repeatedly.
    pub fn end(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = Timer::start();
        sleep(Duration::from_millis(20));

        let elapsed = timer.end();
        assert!(elapsed >= 20.0, "elapsed {}ms", elapsed);
    }

    #[test]
    fn test_timer_is_monotonic() {
        let timer = Timer::start();
        let first = timer.end();
        let second = timer.end();
        assert!(second >= first);
    }
}
