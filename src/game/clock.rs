/// Turns animation-frame timestamps into tick deltas.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        FrameClock { last_ms: None, max_delta }
    }

    /// Seconds since the previous frame. The first frame after a reset is
    /// always zero.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta.clamp(0.0, self.max_delta)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.delta(12_345.0), 0.0);
        assert!((clock.delta(12_361.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut clock = FrameClock::new(0.1);
        clock.delta(0.0);
        assert_eq!(clock.delta(5_000.0), 0.1);
        assert_eq!(clock.delta(4_000.0), 0.0);
    }

    #[test]
    fn test_reset_restarts_timing() {
        let mut clock = FrameClock::new(0.1);
        clock.delta(100.0);
        clock.reset();
        assert_eq!(clock.delta(10_000.0), 0.0);
    }
}
