#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::distortion::{drive_to_gain, DistortionAlgorithm, ShaperKind};
use crate::dsp::noise::NoiseKind;
use crate::dsp::oscillator::OscillatorWaveform;
use crate::engine::message::LiveParams;
use crate::graph::VoiceSettings;
use crate::processor::ParamDescriptor;

pub const TUNE: ParamDescriptor = ParamDescriptor::new("tune", 50.0, 20.0, 500.0);
pub const DECAY: ParamDescriptor = ParamDescriptor::new("decay", 0.5, 0.01, 5.0);
pub const PUNCH: ParamDescriptor = ParamDescriptor::new("punch", 150.0, 0.0, 1_000.0);
pub const PITCH_DECAY: ParamDescriptor = ParamDescriptor::new("pitchDecay", 0.05, 0.001, 1.0);
pub const CLICK_LEVEL: ParamDescriptor = ParamDescriptor::new("clickLevel", 0.8, 0.0, 1.0);
pub const CLICK_DECAY: ParamDescriptor = ParamDescriptor::new("clickDecay", 0.02, 0.001, 0.5);
pub const CLICK_FILTER_FREQ: ParamDescriptor =
    ParamDescriptor::new("clickFilterFreq", 3_000.0, 20.0, 20_000.0);
pub const CLICK_HIGH_PASS_FREQ: ParamDescriptor =
    ParamDescriptor::new("clickHighPassFreq", 300.0, 20.0, 20_000.0);
pub const DRIVE: ParamDescriptor = ParamDescriptor::new("drive", 40.0, 0.0, 200.0);
pub const SHAPE_CHARACTER: ParamDescriptor = ParamDescriptor::new("shapeCharacter", 0.5, 0.0, 1.0);
pub const DISTORTION_AMOUNT: ParamDescriptor =
    ParamDescriptor::new("distortionAmount", 0.5, 0.0, 1.0);
pub const MIX: ParamDescriptor = ParamDescriptor::new("mix", 1.0, 0.0, 1.0);
pub const DIST_CHAR: ParamDescriptor = ParamDescriptor::new("distChar", 0.5, 0.01, 5.0);
pub const OUTPUT_GAIN: ParamDescriptor = ParamDescriptor::new("outputGain", 0.7, 0.0, 1.0);

/// Every numeric kick parameter.
pub const NUMERIC_PARAMS: &[ParamDescriptor] = &[
    TUNE,
    DECAY,
    PUNCH,
    PITCH_DECAY,
    CLICK_LEVEL,
    CLICK_DECAY,
    CLICK_FILTER_FREQ,
    CLICK_HIGH_PASS_FREQ,
    DRIVE,
    SHAPE_CHARACTER,
    DISTORTION_AMOUNT,
    MIX,
    DIST_CHAR,
    OUTPUT_GAIN,
];

/// The full kick parameter set.
///
/// Timing and tone parameters are latched into a voice when it is
/// triggered. `drive`, `mix`, `dist_char` and `output_gain` are live: they
/// are smoothed on the render thread and affect voices already playing.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", default)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickParams {
    /// Base frequency the pitch sweep ends on, Hz
    pub tune: f32,
    /// Body amplitude decay, seconds
    pub decay: f32,
    /// Extra starting pitch above `tune`, Hz
    pub punch: f32,
    /// Pitch sweep time, seconds
    pub pitch_decay: f32,
    pub click_level: f32,
    pub click_decay: f32,
    /// Click low-pass cutoff, Hz
    pub click_filter_freq: f32,
    /// Click high-pass cutoff, Hz
    pub click_high_pass_freq: f32,
    pub click_noise_type: NoiseKind,
    pub osc_type: OscillatorWaveform,
    pub drive: f32,
    pub shape_character: f32,
    pub distortion_amount: f32,
    pub mix: f32,
    pub dist_algo: DistortionAlgorithm,
    pub dist_char: f32,
    pub output_gain: f32,
    pub shaper: ShaperKind,
}

impl Default for KickParams {
    fn default() -> Self {
        Self {
            tune: TUNE.default,
            decay: DECAY.default,
            punch: PUNCH.default,
            pitch_decay: PITCH_DECAY.default,
            click_level: CLICK_LEVEL.default,
            click_decay: CLICK_DECAY.default,
            click_filter_freq: CLICK_FILTER_FREQ.default,
            click_high_pass_freq: CLICK_HIGH_PASS_FREQ.default,
            click_noise_type: NoiseKind::White,
            osc_type: OscillatorWaveform::Sine,
            drive: DRIVE.default,
            shape_character: SHAPE_CHARACTER.default,
            distortion_amount: DISTORTION_AMOUNT.default,
            mix: MIX.default,
            dist_algo: DistortionAlgorithm::SoftClip,
            dist_char: DIST_CHAR.default,
            output_gain: OUTPUT_GAIN.default,
            shaper: ShaperKind::Curve,
        }
    }
}

/// A partial parameter write. `None` leaves the current value alone.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", default)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamsUpdate {
    pub tune: Option<f32>,
    pub decay: Option<f32>,
    pub punch: Option<f32>,
    pub pitch_decay: Option<f32>,
    pub click_level: Option<f32>,
    pub click_decay: Option<f32>,
    pub click_filter_freq: Option<f32>,
    pub click_high_pass_freq: Option<f32>,
    pub click_noise_type: Option<NoiseKind>,
    pub osc_type: Option<OscillatorWaveform>,
    pub drive: Option<f32>,
    pub shape_character: Option<f32>,
    pub distortion_amount: Option<f32>,
    pub mix: Option<f32>,
    pub dist_algo: Option<DistortionAlgorithm>,
    pub dist_char: Option<f32>,
    pub output_gain: Option<f32>,
    pub shaper: Option<ShaperKind>,
}

/// What a merge actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChanges {
    /// The distortion curve must be rebuilt.
    pub curve: bool,
    /// Live values must be republished to the renderer.
    pub live: bool,
    /// Something only new voices will pick up.
    pub latched: bool,
}

impl ParamChanges {
    pub fn any(&self) -> bool {
        self.curve || self.live || self.latched
    }
}

fn merge(slot: &mut f32, value: Option<f32>, descriptor: &ParamDescriptor) {
    if let Some(value) = value {
        *slot = descriptor.clamp(value);
    }
}

fn replace<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl KickParams {
    /// Merge `update` into this set, clamping every numeric value into range.
    /// Non-finite values fall back to the parameter's default.
    pub fn apply(&mut self, update: &ParamsUpdate) -> ParamChanges {
        let before = *self;

        merge(&mut self.tune, update.tune, &TUNE);
        merge(&mut self.decay, update.decay, &DECAY);
        merge(&mut self.punch, update.punch, &PUNCH);
        merge(&mut self.pitch_decay, update.pitch_decay, &PITCH_DECAY);
        merge(&mut self.click_level, update.click_level, &CLICK_LEVEL);
        merge(&mut self.click_decay, update.click_decay, &CLICK_DECAY);
        merge(&mut self.click_filter_freq, update.click_filter_freq, &CLICK_FILTER_FREQ);
        merge(&mut self.click_high_pass_freq, update.click_high_pass_freq, &CLICK_HIGH_PASS_FREQ);
        merge(&mut self.drive, update.drive, &DRIVE);
        merge(&mut self.shape_character, update.shape_character, &SHAPE_CHARACTER);
        merge(&mut self.distortion_amount, update.distortion_amount, &DISTORTION_AMOUNT);
        merge(&mut self.mix, update.mix, &MIX);
        merge(&mut self.dist_char, update.dist_char, &DIST_CHAR);
        merge(&mut self.output_gain, update.output_gain, &OUTPUT_GAIN);

        replace(&mut self.click_noise_type, update.click_noise_type);
        replace(&mut self.osc_type, update.osc_type);
        replace(&mut self.dist_algo, update.dist_algo);
        replace(&mut self.shaper, update.shaper);

        ParamChanges {
            curve: before.shape_character != self.shape_character
                || before.distortion_amount != self.distortion_amount,
            live: before.live() != self.live(),
            latched: before.voice_settings() != self.voice_settings()
                || before.click_noise_type != self.click_noise_type,
        }
    }

    /// Build a fully clamped set from an update applied over the defaults.
    pub fn from_update(update: &ParamsUpdate) -> Self {
        let mut params = Self::default();
        params.apply(update);
        params
    }

    pub fn live(&self) -> LiveParams {
        LiveParams {
            output_gain: self.output_gain,
            pre_gain: drive_to_gain(self.drive),
            mix: self.mix,
            character: self.dist_char,
        }
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            tune: self.tune,
            punch: self.punch,
            pitch_decay: self.pitch_decay,
            decay: self.decay,
            waveform: self.osc_type,
            shaper: self.shaper,
            algorithm: self.dist_algo,
            click_level: self.click_level,
            click_decay: self.click_decay,
            click_lowpass: self.click_filter_freq,
            click_highpass: self.click_high_pass_freq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = KickParams::default();
        assert_eq!(p.tune, 50.0);
        assert_eq!(p.decay, 0.5);
        assert_eq!(p.punch, 150.0);
        assert_eq!(p.pitch_decay, 0.05);
        assert_eq!(p.drive, 40.0);
        assert_eq!(p.click_level, 0.8);
        assert_eq!(p.click_decay, 0.02);
        assert_eq!(p.click_filter_freq, 3_000.0);
        assert_eq!(p.output_gain, 0.7);
    }

    #[test]
    fn descriptor_defaults_are_in_range() {
        assert!(NUMERIC_PARAMS.iter().all(ParamDescriptor::is_valid));
    }

    #[test]
    fn partial_merge_leaves_other_fields() {
        let mut p = KickParams::default();
        p.apply(&ParamsUpdate {
            tune: Some(60.0),
            ..Default::default()
        });

        assert_eq!(p.tune, 60.0);
        assert_eq!(
            KickParams {
                tune: 50.0,
                ..p
            },
            KickParams::default()
        );
    }

    #[test]
    fn out_of_range_writes_are_clamped() {
        let p = KickParams::from_update(&ParamsUpdate {
            tune: Some(10_000.0),
            click_level: Some(-3.0),
            decay: Some(0.0),
            ..Default::default()
        });
        assert_eq!(p.tune, 500.0);
        assert_eq!(p.click_level, 0.0);
        assert_eq!(p.decay, 0.01);
    }

    #[test]
    fn nan_writes_fall_back_to_default() {
        let mut p = KickParams::default();
        p.apply(&ParamsUpdate {
            punch: Some(400.0),
            ..Default::default()
        });
        p.apply(&ParamsUpdate {
            punch: Some(f32::NAN),
            ..Default::default()
        });
        assert_eq!(p.punch, 150.0);
    }

    #[test]
    fn change_flags() {
        let mut p = KickParams::default();

        let changes = p.apply(&ParamsUpdate {
            shape_character: Some(0.9),
            ..Default::default()
        });
        assert!(changes.curve);
        assert!(!changes.live);

        let changes = p.apply(&ParamsUpdate {
            output_gain: Some(0.2),
            ..Default::default()
        });
        assert!(changes.live && !changes.curve && !changes.latched);

        let changes = p.apply(&ParamsUpdate {
            osc_type: Some(OscillatorWaveform::Triangle),
            ..Default::default()
        });
        assert!(changes.latched && !changes.live);

        // Writing the current value again changes nothing
        let changes = p.apply(&ParamsUpdate {
            output_gain: Some(0.2),
            ..Default::default()
        });
        assert!(!changes.any());
    }

    #[test]
    fn drive_maps_to_pre_gain() {
        let p = KickParams::from_update(&ParamsUpdate {
            drive: Some(100.0),
            ..Default::default()
        });
        assert_eq!(p.live().pre_gain, 6.0);
    }
}
