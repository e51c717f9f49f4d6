use crate::processor::{AudioProcessor, ParamBlock, ParamDescriptor, ProcessorDefinition};

const GAIN: usize = 0;

pub struct GainProcessor;

impl ProcessorDefinition for GainProcessor {
    const NAME: &'static str = "gain-processor";
    const DESCRIPTORS: &'static [ParamDescriptor] = &[ParamDescriptor::new("gain", 1.0, 0.0, 2.0)];

    fn create(_sample_rate: f32) -> Self {
        Self
    }
}

impl AudioProcessor for GainProcessor {
    fn process(&mut self, input: Option<&[f32]>, output: &mut [f32], params: &ParamBlock) -> bool {
        match input {
            Some(input) => {
                for (i, out) in output.iter_mut().enumerate() {
                    *out = input.get(i).copied().unwrap_or(0.0) * params.value(GAIN, i);
                }
            }
            None => output.fill(0.0),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ParamValues;

    #[test]
    fn scales_input() {
        let params = ParamBlock::new(GainProcessor::DESCRIPTORS).with("gain", ParamValues::Constant(0.5));
        let mut out = [0.0; 3];
        GainProcessor.process(Some(&[1.0, -1.0, 0.5]), &mut out, &params);
        assert_eq!(out, [0.5, -0.5, 0.25]);
    }

    #[test]
    fn gain_is_clamped_to_two() {
        let params = ParamBlock::new(GainProcessor::DESCRIPTORS).with("gain", ParamValues::Constant(8.0));
        let mut out = [0.0; 1];
        GainProcessor.process(Some(&[0.25]), &mut out, &params);
        assert_eq!(out, [0.5]);
    }

    #[test]
    fn no_input_writes_silence() {
        let params = ParamBlock::new(GainProcessor::DESCRIPTORS);
        let mut out = [1.0; 4];
        assert!(GainProcessor.process(None, &mut out, &params));
        assert_eq!(out, [0.0; 4]);
    }
}
