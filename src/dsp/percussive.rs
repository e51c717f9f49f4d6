//! One-shot percussive envelopes evaluated in continuous time.

/*
Percussive Envelope
===================

A drum hit has no gate: it is struck and rings out. The percussive envelope
is a function of the time since the trigger instant t0:

  Level
  peak ┐ ╱╲
       │╱  ╲
       │    ╲_
       │      ‾‾──___
 floor └──────────────‾‾‾‾───→ t
       0  a            end

  Attack   linear ramp 0 → peak over `attack` seconds (5 ms for the body,
           2 ms for the click).
  Decay    exponential ramp peak → floor, ending at `end` seconds after the
           trigger.
  Done     holds the floor.

Exponential Ramps
-----------------

An exponential ramp from v0 to v1 over [t0, t1] is

    v(t) = v0 · (v1 / v0) ^ ((t - t0) / (t1 - t0))

It moves by a constant RATIO per unit time, which our ears hear as a
constant rate of fade. Because it is a ratio, neither endpoint may be zero:
a true exponential never reaches zero in finite time. That is why the decay
targets a small positive floor (1e-4, -80 dB) instead of 0.0.

Why Continuous Time?
--------------------

Voices are scheduled ahead of real time at absolute audio-clock times. Each
envelope is evaluated directly from the elapsed time instead of stepping a
counter, so a voice rendered in blocks of any size, starting anywhere inside
a block, produces exactly the same curve.

Pitch Sweep
-----------

The kick's pitch drop is the same exponential ramp applied to frequency:
`tune + punch` Hz at t0 down to `tune` Hz at t0 + pitchDecay, then held.
The pitch ramp has no attack.
*/

/// Smallest level an exponential decay is allowed to target.
pub const ENVELOPE_FLOOR: f32 = 1e-4;

/// Linear attack of the body amplitude envelope.
pub const BODY_ATTACK: f32 = 0.005;

/// Linear attack of the click envelope.
pub const CLICK_ATTACK: f32 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercussiveStage {
    Attack,
    Decay,
    Done,
}

/// Exponential interpolation between two strictly positive values.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialRamp {
    from: f32,
    to: f32,
    duration: f32,
}

impl ExponentialRamp {
    /// Both endpoints are raised to `ENVELOPE_FLOOR` so the ratio is defined.
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from: from.max(ENVELOPE_FLOOR),
            to: to.max(ENVELOPE_FLOOR),
            duration: duration.max(0.0),
        }
    }

    /// Value `t` seconds after the ramp starts. Holds `from` before the start
    /// and `to` after the end.
    #[inline]
    pub fn value_at(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return self.from;
        }
        if t >= self.duration {
            return self.to;
        }
        self.from * (self.to / self.from).powf(t / self.duration)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PercussiveEnvelope {
    peak: f32,
    attack: f32,
    end: f32,
    decay: ExponentialRamp,
}

impl PercussiveEnvelope {
    /// `end` is measured from the trigger, not from the end of the attack.
    /// It is pushed past the attack if the two overlap.
    pub fn new(peak: f32, attack: f32, end: f32) -> Self {
        let peak = if peak.is_finite() { peak.clamp(0.0, 1.0) } else { 0.0 };
        let attack = attack.max(0.0);
        let end = end.max(attack + crate::MIN_TIME);

        Self {
            peak,
            attack,
            end,
            decay: ExponentialRamp::new(peak, ENVELOPE_FLOOR, end - attack),
        }
    }

    /// Body amplitude: 5 ms attack to full scale, decaying until `decay`.
    pub fn body(decay: f32) -> Self {
        Self::new(1.0, BODY_ATTACK, decay)
    }

    /// Click amplitude: 2 ms attack to `level`, decaying until `decay`.
    pub fn click(level: f32, decay: f32) -> Self {
        Self::new(level, CLICK_ATTACK, decay)
    }

    pub fn stage_at(&self, t: f32) -> PercussiveStage {
        if t < self.attack {
            PercussiveStage::Attack
        } else if t < self.end {
            PercussiveStage::Decay
        } else {
            PercussiveStage::Done
        }
    }

    /// Envelope level `t` seconds after the trigger, always within [0, 1].
    #[inline]
    pub fn value_at(&self, t: f32) -> f32 {
        if t < 0.0 || self.peak <= 0.0 {
            return 0.0;
        }

        let level = match self.stage_at(t) {
            PercussiveStage::Attack => self.peak * t / self.attack,
            PercussiveStage::Decay => self.decay.value_at(t - self.attack),
            PercussiveStage::Done => ENVELOPE_FLOOR.min(self.peak),
        };

        level.clamp(0.0, 1.0)
    }

    /// Seconds from trigger until the decay reaches its floor.
    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }
}

/// Exponential pitch drop from `tune + punch` to `tune`.
#[derive(Debug, Clone, Copy)]
pub struct PitchSweep {
    ramp: ExponentialRamp,
}

impl PitchSweep {
    pub fn new(tune: f32, punch: f32, pitch_decay: f32) -> Self {
        Self {
            ramp: ExponentialRamp::new(tune + punch.max(0.0), tune, pitch_decay),
        }
    }

    #[inline]
    pub fn frequency_at(&self, t: f32) -> f32 {
        self.ramp.value_at(t)
    }

    pub fn duration(&self) -> f32 {
        self.ramp.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_is_linear() {
        let env = PercussiveEnvelope::body(0.5);
        assert_eq!(env.value_at(0.0), 0.0);
        assert!((env.value_at(0.0025) - 0.5).abs() < 1e-4);
        assert_eq!(env.stage_at(0.001), PercussiveStage::Attack);
    }

    #[test]
    fn decay_is_monotonic_and_never_zero() {
        let decay = 0.3;
        let env = PercussiveEnvelope::body(decay);
        let steps = 3_000;

        let mut previous = env.value_at(BODY_ATTACK);
        for i in 1..=steps {
            let t = BODY_ATTACK + (decay - BODY_ATTACK) * i as f32 / steps as f32;
            let v = env.value_at(t);
            assert!(v <= previous + 1e-7, "rose at t={t}: {previous} -> {v}");
            assert!(v > 0.0, "hit zero at t={t}");
            previous = v;
        }
    }

    #[test]
    fn reaches_floor_after_decay() {
        let env = PercussiveEnvelope::body(0.2);
        assert!(env.value_at(0.2) <= ENVELOPE_FLOOR);
        assert!(env.value_at(0.2 + 0.1) <= ENVELOPE_FLOOR);
        assert_eq!(env.stage_at(0.25), PercussiveStage::Done);
    }

    #[test]
    fn silent_click_stays_silent() {
        let env = PercussiveEnvelope::click(0.0, 0.02);
        assert_eq!(env.value_at(0.001), 0.0);
        assert_eq!(env.value_at(0.01), 0.0);
    }

    #[test]
    fn click_peaks_at_level() {
        let env = PercussiveEnvelope::click(0.8, 0.02);
        assert!((env.value_at(CLICK_ATTACK) - 0.8).abs() < 1e-4);
    }

    #[test]
    fn decay_shorter_than_attack_is_pushed_out() {
        let env = PercussiveEnvelope::body(0.0);
        assert!(env.end() > BODY_ATTACK);
        assert!(env.value_at(1.0) <= ENVELOPE_FLOOR);
    }

    #[test]
    fn pitch_sweep_from_punch_to_tune() {
        let sweep = PitchSweep::new(50.0, 150.0, 0.05);
        assert!((sweep.frequency_at(0.0) - 200.0).abs() < 1e-3);

        // Halfway the ratio is sqrt(50/200) = 0.5
        assert!((sweep.frequency_at(0.025) - 100.0).abs() < 0.01);

        assert!((sweep.frequency_at(0.05) - 50.0).abs() < 1e-3);
        assert_eq!(sweep.frequency_at(0.2), 50.0);
    }

    #[test]
    fn pitch_sweep_decreases_monotonically() {
        let sweep = PitchSweep::new(50.0, 150.0, 0.05);
        let mut previous = sweep.frequency_at(0.0);
        for i in 1..=500 {
            let f = sweep.frequency_at(i as f32 * 0.0001);
            assert!(f <= previous);
            previous = f;
        }
    }

    #[test]
    fn zero_punch_holds_tune() {
        let sweep = PitchSweep::new(60.0, 0.0, 0.05);
        assert_eq!(sweep.frequency_at(0.0), 60.0);
        assert_eq!(sweep.frequency_at(0.03), 60.0);
    }
}
