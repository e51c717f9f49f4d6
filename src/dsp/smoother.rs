//! One-pole parameter smoothing.
//!
//! Control-thread parameter changes arrive as step changes. Applying a step
//! directly to a gain produces a click, so the render thread moves each live
//! parameter toward its target with a single-pole exponential approach:
//!
//!   value += (target - value) × (1 - e^(-dt / τ))
//!
//! `dt` is the time covered by one update. The renderer updates once per
//! block and ramps linearly between consecutive block values, so the cost is
//! one `exp()` per parameter per block, not per sample.
//!
//! After about 5τ the value is within 1% of the target. With τ = 10 ms that
//! is 50 ms: fast enough to feel immediate, slow enough not to click.

/// Default smoothing time constant in seconds.
pub const DEFAULT_TIME_CONSTANT: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct ParamSmoother {
    value: f32,
    target: f32,
    time_constant: f32,
}

impl ParamSmoother {
    pub fn new(initial: f32, time_constant: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            time_constant: time_constant.max(0.0),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Advance by `dt` seconds and return the new value.
    #[inline]
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.time_constant <= 0.0 || dt <= 0.0 {
            if self.time_constant <= 0.0 {
                self.value = self.target;
            }
            return self.value;
        }

        let coeff = 1.0 - (-dt / self.time_constant).exp();
        self.value += (self.target - self.value) * coeff;

        // Settle exactly once we're inaudibly close
        if (self.target - self.value).abs() < 1e-6 {
            self.value = self.target;
        }
        self.value
    }

    /// Advance over one block of `frames` samples and return the
    /// `(start, end)` values to ramp between.
    #[inline]
    pub fn advance_block(&mut self, frames: usize, sample_rate: f32) -> (f32, f32) {
        let start = self.value;
        let end = self.advance(frames as f32 / sample_rate);
        (start, end)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approaches_target_without_overshoot() {
        let mut s = ParamSmoother::new(0.0, 0.01);
        s.set_target(1.0);

        let mut previous = 0.0;
        for _ in 0..20 {
            let v = s.advance(0.001);
            assert!(v > previous && v <= 1.0);
            previous = v;
        }
    }

    #[test]
    fn one_time_constant_covers_63_percent() {
        let mut s = ParamSmoother::new(0.0, 0.01);
        s.set_target(1.0);
        let v = s.advance(0.01);
        assert!((v - (1.0 - (-1.0f32).exp())).abs() < 1e-5);
    }

    #[test]
    fn settles_exactly() {
        let mut s = ParamSmoother::new(0.7, 0.01);
        s.set_target(0.2);
        for _ in 0..100 {
            s.advance(0.01);
        }
        assert!(s.is_settled());
        assert_eq!(s.value(), 0.2);
    }

    #[test]
    fn zero_time_constant_jumps() {
        let mut s = ParamSmoother::new(0.0, 0.0);
        s.set_target(0.5);
        assert_eq!(s.advance(0.001), 0.5);
    }

    #[test]
    fn block_advance_reports_both_ends() {
        let mut s = ParamSmoother::new(1.0, 0.01);
        s.set_target(0.0);
        let (start, end) = s.advance_block(480, 48_000.0);
        assert_eq!(start, 1.0);
        assert!(end < start && end > 0.0);
    }

    #[test]
    fn non_finite_target_is_ignored() {
        let mut s = ParamSmoother::new(0.3, 0.01);
        s.set_target(f32::NAN);
        assert_eq!(s.target(), 0.3);
    }
}
