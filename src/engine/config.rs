#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::curve::DEFAULT_TABLE_SIZE;
use crate::dsp::smoother::DEFAULT_TIME_CONSTANT;

/// Engine construction settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Length of each precomputed noise buffer, in seconds.
    pub noise_duration: f32,
    /// Entries in the distortion lookup table.
    pub curve_table_size: usize,
    /// Seed for the noise generator. `None` seeds from entropy.
    pub noise_seed: Option<u64>,
    /// Capacity of the command and event ring buffers.
    pub queue_capacity: usize,
    /// Voices the renderer holds at once; the oldest is stolen beyond this.
    pub max_voices: usize,
    /// Seconds past a voice's nominal end before the engine forces cleanup.
    pub safety_margin: f64,
    /// Time constant for live parameter smoothing, in seconds.
    pub smoothing_time: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_duration: 0.5,
            curve_table_size: DEFAULT_TABLE_SIZE,
            noise_seed: None,
            queue_capacity: 256,
            max_voices: 32,
            safety_margin: 0.25,
            smoothing_time: DEFAULT_TIME_CONSTANT,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Pull every field into a usable range.
    pub(crate) fn sanitized(&self) -> Self {
        let noise_duration = if self.noise_duration.is_finite() {
            self.noise_duration.max(crate::MIN_TIME)
        } else {
            0.5
        };
        let safety_margin = if self.safety_margin.is_finite() {
            self.safety_margin.max(0.0)
        } else {
            0.25
        };
        let smoothing_time = if self.smoothing_time.is_finite() {
            self.smoothing_time.max(0.0)
        } else {
            DEFAULT_TIME_CONSTANT
        };

        Self {
            noise_duration,
            curve_table_size: self.curve_table_size.max(2),
            noise_seed: self.noise_seed,
            queue_capacity: self.queue_capacity.max(8),
            max_voices: self.max_voices.max(1),
            safety_margin,
            smoothing_time,
        }
    }
}
