use std::time::{Duration, Instant};

/// Simulation time snapshot for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimTime {
    /// Seconds of simulated time since the session started. Never decreases.
    pub seconds: f64,

    /// Clamped time step that produced this snapshot, in seconds.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl SimTime {
    pub const ZERO: SimTime = SimTime {
        seconds: 0.0,
        dt: 0.0,
        frame_index: 0,
    };
}

/// Clock producing `SimTime` snapshots.
///
/// Simulated time is the sum of clamped frame steps rather than wall-clock time
/// since start, so a stall (debugger, minimized window, slow shader compile on
/// first frame) advances the animation by at most `dt_max`.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    last: Instant,
    seconds: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl SimulationClock {
    /// Creates a new clock with default clamps.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            seconds: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the wall-clock baseline without touching simulated time.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds of simulated time accumulated so far.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Advances the clock by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> SimTime {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.advance(elapsed)
    }

    /// Advances the clock by `elapsed`, after clamping.
    pub fn advance(&mut self, elapsed: Duration) -> SimTime {
        let dt = elapsed.clamp(self.dt_min, self.dt_max);

        // The first frame is reported at t = 0.
        if self.frame_index > 0 {
            self.seconds += dt.as_secs_f64();
        }

        let snapshot = SimTime {
            seconds: self.seconds,
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        snapshot
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_starts_at_zero() {
        let mut clock = SimulationClock::new();
        let t = clock.advance(Duration::from_millis(16));
        assert_eq!(t.seconds, 0.0);
        assert_eq!(t.frame_index, 0);
    }

    #[test]
    fn time_accumulates_and_never_decreases() {
        let mut clock = SimulationClock::new();
        let mut prev = clock.advance(Duration::ZERO).seconds;
        for ms in [16, 0, 33, 1, 16] {
            let t = clock.advance(Duration::from_millis(ms));
            assert!(t.seconds >= prev);
            prev = t.seconds;
        }
        assert_eq!(clock.advance(Duration::ZERO).frame_index, 6);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = SimulationClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        clock.advance(Duration::ZERO);
        let t = clock.advance(Duration::from_secs(5));
        assert!((t.seconds - 0.1).abs() < 1e-9);
        assert!((t.dt - 0.1).abs() < 1e-6);
    }
}
