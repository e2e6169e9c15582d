/// Frames-per-second counter over windows of simulated time.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    delay: f64,
    window_start: Option<f64>,
    frames: u32,
}

impl FpsCounter {
    /// `delay` is the window length in seconds. Non-positive disables reporting.
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            window_start: None,
            frames: 0,
        }
    }

    /// Counts one frame at time `t` and returns the rate once a window closes.
    ///
    /// A `t` earlier than the current window start opens a new window.
    pub fn tick(&mut self, t: f64) -> Option<f64> {
        if self.delay <= 0.0 {
            return None;
        }

        let start = match self.window_start {
            Some(start) if t >= start => start,
            _ => {
                self.window_start = Some(t);
                self.frames = 0;
                return None;
            }
        };

        self.frames += 1;
        let elapsed = t - start;
        if elapsed < self.delay {
            return None;
        }

        let fps = f64::from(self.frames) / elapsed;
        self.window_start = Some(t);
        self.frames = 0;
        Some(fps)
    }
}
