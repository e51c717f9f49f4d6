//! Signal mixing and crossfading primitives.

/*
Signal Mixing
=============

Two kinds of mixing happen in a kick voice:

  summing     The body and click layers are ADDED at the voice's mix point,
              and every active voice is added into the master bus. Summing
              can exceed [-1, 1]; headroom is managed by the curve
              normalization and the master gain.

  crossfade   Wet/dry blending inside the distortion stage:

                  output = dry × (1 - mix) + wet × mix

              The weights always sum to 1.0, so a crossfade never boosts the
              level beyond the louder of its two inputs.

This is a LINEAR crossfade. At mix = 0.5 two uncorrelated signals sound
slightly quieter than either alone (power adds, amplitude doesn't), but for
a distortion wet/dry the shaped signal is strongly correlated with the dry
one and the dip is inaudible.
*/

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Apply a gain that moves linearly from `start` to `end` across the buffer.
///
/// The last sample gets exactly `end`, so consecutive blocks join without a
/// step.
#[inline]
pub fn apply_gain_ramp(buffer: &mut [f32], start: f32, end: f32) {
    let len = buffer.len();
    if len == 0 {
        return;
    }
    if start == end {
        for sample in buffer.iter_mut() {
            *sample *= end;
        }
        return;
    }

    let step = (end - start) / len as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= start + step * (i + 1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_can_exceed_one() {
        let mut a = [1.0, 0.5];
        let b = [1.0, 0.8];

        sum_in_place(&mut a, &b);

        assert_eq!(a[0], 2.0); // Exceeds 1.0!
        assert_eq!(a[1], 1.3);
    }

    #[test]
    fn test_blend_dry_wet() {
        // All dry
        assert_eq!(blend_dry_wet(1.0, 0.5, 0.0), 1.0);
        // All wet
        assert_eq!(blend_dry_wet(1.0, 0.5, 1.0), 0.5);
        // 50/50 mix
        assert_eq!(blend_dry_wet(1.0, 0.0, 0.5), 0.5);
    }

    #[test]
    fn test_gain_ramp_ends_on_target() {
        let mut buffer = [1.0; 4];
        apply_gain_ramp(&mut buffer, 0.0, 1.0);
        assert_eq!(buffer, [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_flat_gain_ramp() {
        let mut buffer = [0.5, -0.5];
        apply_gain_ramp(&mut buffer, 0.7, 0.7);
        assert_eq!(buffer, [0.35, -0.35]);
    }
}
