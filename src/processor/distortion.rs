use crate::dsp::distortion::{distort, limit, DistortionAlgorithm};
use crate::dsp::mix::blend_dry_wet;
use crate::processor::{AudioProcessor, ParamBlock, ParamDescriptor, ProcessorDefinition};

const PRE_GAIN: usize = 0;
const MIX: usize = 1;
const ALGO_TYPE: usize = 2;
const CHARACTER: usize = 3;

/// Algorithmic distortion with every parameter automatable per sample.
///
/// `out = limit(dry · (1 - mix) + distort(dry · preGain) · mix)`
pub struct DistortionProcessor;

impl ProcessorDefinition for DistortionProcessor {
    const NAME: &'static str = "custom-distortion-processor";
    const DESCRIPTORS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("preGain", 1.0, 0.0, 10.0),
        ParamDescriptor::new("mix", 1.0, 0.0, 1.0),
        ParamDescriptor::new("algoType", 0.0, 0.0, 2.0),
        ParamDescriptor::new("character", 0.5, 0.01, 5.0),
    ];

    fn create(_sample_rate: f32) -> Self {
        Self
    }
}

impl AudioProcessor for DistortionProcessor {
    fn process(&mut self, input: Option<&[f32]>, output: &mut [f32], params: &ParamBlock) -> bool {
        for (i, out) in output.iter_mut().enumerate() {
            let dry = input.and_then(|buf| buf.get(i)).copied().unwrap_or(0.0);

            let gained = dry * params.value(PRE_GAIN, i);
            let algorithm = DistortionAlgorithm::from_index(params.value(ALGO_TYPE, i));
            let wet = distort(gained, algorithm, params.value(CHARACTER, i));

            *out = limit(blend_dry_wet(dry, wet, params.value(MIX, i)));
        }
        true
    }
}
