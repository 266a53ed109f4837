// SPDX-License-Identifier: CEPL-1.0
use std::time::{Duration, Instant};

/// Wall-clock delta between consecutive `tick` calls, clamped so a long
/// stall (minimized window, debugger) does not fling the camera.
pub struct FrameClock {
    last: Instant,
    max_dt: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            max_dt: Duration::from_millis(100),
        }
    }

    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).min(self.max_dt);
        self.last = now;
        dt.as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts presented frames and reports the rate about once per second.
pub struct FpsCounter {
    frames: u32,
    last_report: Instant,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            last_report: Instant::now(),
        }
    }

    pub fn frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    /// Returns the frame count of the elapsed window once at least a second
    /// has passed, then starts a new window.
    pub fn poll(&mut self) -> Option<u32> {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> Option<u32> {
        if now.duration_since(self.last_report).as_secs_f32() < 1.0 {
            return None;
        }
        let fps = self.frames;
        self.frames = 0;
        self.last_report = now;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reports_after_a_second() {
        let mut fps = FpsCounter::new();
        let start = fps.last_report;
        for _ in 0..42 {
            fps.frame();
        }
        assert_eq!(fps.poll_at(start + Duration::from_millis(500)), None);
        assert_eq!(fps.poll_at(start + Duration::from_millis(1001)), Some(42));
        assert_eq!(fps.frames, 0);
    }

    #[test]
    fn clock_delta_is_clamped() {
        let mut clock = FrameClock::new();
        if let Some(earlier) = Instant::now().checked_sub(Duration::from_secs(5)) {
            clock.last = earlier;
        }
        let dt = clock.tick();
        assert!(dt <= 0.1 + f32::EPSILON);
    }
}
