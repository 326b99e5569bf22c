use std::time::{Duration, Instant};

/// Time source the replay engine polls.
///
/// `start` fixes the reference point, `elapsed_s` reports seconds since that
/// point, and `pause` yields between polling iterations.
pub trait ReplayClock {
    fn start(&mut self);
    fn elapsed_s(&self) -> f64;
    fn pause(&mut self, interval: Duration);
}

/// Real wall-clock time. `pause` sleeps the current thread.
#[derive(Debug, Default)]
pub struct WallClock {
    started_at: Option<Instant>,
}

impl WallClock {
    pub const fn new() -> Self {
        Self { started_at: None }
    }
}

impl ReplayClock for WallClock {
    fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    #[inline(always)]
    fn elapsed_s(&self) -> f64 {
        self.started_at
            .map_or(0.0, |t| t.elapsed().as_secs_f64())
    }

    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Virtual time that only moves when the engine pauses.
///
/// Each `pause` advances the clock by the requested interval, so a replay
/// runs to completion without sleeping.
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    now_s: f64,
}

impl VirtualClock {
    pub const fn new() -> Self {
        Self { now_s: 0.0 }
    }
}

impl ReplayClock for VirtualClock {
    fn start(&mut self) {
        self.now_s = 0.0;
    }

    #[inline(always)]
    fn elapsed_s(&self) -> f64 {
        self.now_s
    }

    fn pause(&mut self, interval: Duration) {
        // A zero interval would stall virtual time forever.
        let step = if interval.is_zero() {
            Duration::from_millis(1)
        } else {
            interval
        };
        self.now_s += step.as_secs_f64();
    }
}

#[cfg(test)]
mod tests {
    use super::{ReplayClock, VirtualClock, WallClock};
    use std::time::Duration;

    #[test]
    fn virtual_clock_only_moves_on_pause() {
        let mut clock = VirtualClock::new();
        clock.start();
        assert_eq!(clock.elapsed_s(), 0.0);
        clock.pause(Duration::from_millis(250));
        clock.pause(Duration::from_millis(250));
        assert!(
            (clock.elapsed_s() - 0.5).abs() < 1e-9,
            "expected 0.5s, got {}",
            clock.elapsed_s()
        );
    }

    #[test]
    fn virtual_clock_restarts_from_zero() {
        let mut clock = VirtualClock::new();
        clock.start();
        clock.pause(Duration::from_millis(100));
        clock.start();
        assert_eq!(clock.elapsed_s(), 0.0);
    }

    #[test]
    fn virtual_clock_zero_interval_still_advances() {
        let mut clock = VirtualClock::new();
        clock.start();
        clock.pause(Duration::ZERO);
        assert!(clock.elapsed_s() > 0.0);
    }

    #[test]
    fn wall_clock_is_zero_before_start() {
        let clock = WallClock::new();
        assert_eq!(clock.elapsed_s(), 0.0);
    }

    #[test]
    fn wall_clock_advances_after_pause() {
        let mut clock = WallClock::new();
        clock.start();
        clock.pause(Duration::from_millis(2));
        assert!(clock.elapsed_s() >= 0.002);
    }
}
