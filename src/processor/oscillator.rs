use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::Oscillator;
use crate::processor::{AudioProcessor, ParamBlock, ParamDescriptor, ProcessorDefinition};

const FREQUENCY: usize = 0;
const AMPLITUDE: usize = 1;
const ATTACK: usize = 2;
const DECAY: usize = 3;
const SUSTAIN: usize = 4;
const RELEASE: usize = 5;
const GATE: usize = 6;

/// Sine oscillator shaped by a gated ADSR envelope.
///
/// Envelope times, sustain and gate are read once per block; frequency and
/// amplitude may be automated per sample. A gate above 0.5 is high.
pub struct GatedOscillatorProcessor {
    sample_rate: f32,
    oscillator: Oscillator,
    envelope: Envelope,
}

impl ProcessorDefinition for GatedOscillatorProcessor {
    const NAME: &'static str = "oscillator-processor";
    const DESCRIPTORS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("frequency", 440.0, 20.0, 20_000.0),
        ParamDescriptor::new("amplitude", 0.5, 0.0, 1.0),
        ParamDescriptor::new("attack", 0.1, 0.001, 2.0),
        ParamDescriptor::new("decay", 0.2, 0.001, 2.0),
        ParamDescriptor::new("sustain", 0.7, 0.0, 1.0),
        ParamDescriptor::new("release", 0.5, 0.001, 5.0),
        ParamDescriptor::new("gate", 0.0, 0.0, 1.0),
    ];

    fn create(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            oscillator: Oscillator::sine(),
            envelope: Envelope::new(sample_rate),
        }
    }
}

impl GatedOscillatorProcessor {
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl AudioProcessor for GatedOscillatorProcessor {
    fn process(&mut self, _input: Option<&[f32]>, output: &mut [f32], params: &ParamBlock) -> bool {
        self.envelope.set_params(
            params.first(ATTACK),
            params.first(DECAY),
            params.first(SUSTAIN),
            params.first(RELEASE),
        );
        self.envelope.set_gate(params.first(GATE) > 0.5);

        for (i, out) in output.iter_mut().enumerate() {
            let env = self.envelope.next_sample();
            let tone = self.oscillator.next_sample(params.value(FREQUENCY, i), self.sample_rate);
            *out = tone * env * params.value(AMPLITUDE, i);
        }
        true
    }
}
