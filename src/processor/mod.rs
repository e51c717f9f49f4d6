//! Block processors and the host registration interface.
//!
//! A processor is a self-contained unit a host can instantiate by name and
//! run once per block: it receives an optional input buffer, writes an
//! output buffer, and reads named parameters that may be constant for the
//! block or automated per sample. Each processor declares its parameters in
//! a static descriptor table (name, default, min, max).
//!
//! `KickEngine::initialize` registers every processor in this module with a
//! [`ProcessorHost`]; [`ProcessorRegistry`] is the in-crate host.

use std::collections::HashMap;

use thiserror::Error;

/// Algorithmic distortion with per-sample automation.
pub mod distortion;
/// Per-sample gain.
pub mod gain;
/// Gated sine oscillator with an ADSR envelope.
pub mod oscillator;

pub use distortion::DistortionProcessor;
pub use gain::GainProcessor;
pub use oscillator::GatedOscillatorProcessor;

/// Most parameters a processor may declare.
pub const MAX_PARAMS: usize = 8;

/// A named parameter with its default and valid range.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl ParamDescriptor {
    pub const fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }

    /// Clamp into range. Non-finite values fall back to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && self.default.is_finite()
            && self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.default
            && self.default <= self.max
    }
}

/// Values of one parameter for one block.
#[derive(Debug, Clone, Copy)]
pub enum ParamValues<'a> {
    Constant(f32),
    /// One value per frame. Frames past the end reuse the last value.
    PerSample(&'a [f32]),
}

impl ParamValues<'_> {
    #[inline]
    fn at(&self, frame: usize) -> Option<f32> {
        match self {
            ParamValues::Constant(v) => Some(*v),
            ParamValues::PerSample(values) => values.get(frame).or(values.last()).copied(),
        }
    }
}

/// Parameter values handed to a processor for one block.
///
/// Lives on the stack; building one does not allocate.
pub struct ParamBlock<'a> {
    descriptors: &'static [ParamDescriptor],
    values: [Option<ParamValues<'a>>; MAX_PARAMS],
}

impl<'a> ParamBlock<'a> {
    /// Every parameter at its default.
    pub fn new(descriptors: &'static [ParamDescriptor]) -> Self {
        Self {
            descriptors,
            values: [None; MAX_PARAMS],
        }
    }

    /// Set a parameter by name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, values: ParamValues<'a>) -> bool {
        match self.descriptors.iter().position(|d| d.name == name) {
            Some(index) if index < MAX_PARAMS => {
                self.values[index] = Some(values);
                true
            }
            _ => false,
        }
    }

    pub fn with(mut self, name: &str, values: ParamValues<'a>) -> Self {
        self.set(name, values);
        self
    }

    /// Clamped value of parameter `index` at `frame`.
    #[inline]
    pub fn value(&self, index: usize, frame: usize) -> f32 {
        let Some(descriptor) = self.descriptors.get(index) else {
            return 0.0;
        };
        match self.values.get(index).copied().flatten().and_then(|v| v.at(frame)) {
            Some(v) => descriptor.clamp(v),
            None => descriptor.default,
        }
    }

    /// Clamped value of parameter `index` at the start of the block.
    #[inline]
    pub fn first(&self, index: usize) -> f32 {
        self.value(index, 0)
    }
}

pub trait AudioProcessor: Send {
    /// Render one block into `output`. A missing input reads as silence.
    ///
    /// Returns whether the processor wants to keep running.
    fn process(&mut self, input: Option<&[f32]>, output: &mut [f32], params: &ParamBlock) -> bool;
}

/// A processor type the host can register and construct.
pub trait ProcessorDefinition: AudioProcessor + Sized + 'static {
    const NAME: &'static str;
    const DESCRIPTORS: &'static [ParamDescriptor];

    fn create(sample_rate: f32) -> Self;
}

fn construct<P: ProcessorDefinition>(sample_rate: f32) -> Box<dyn AudioProcessor> {
    Box::new(P::create(sample_rate))
}

/// Everything a host needs to know about one processor.
#[derive(Clone, Copy)]
pub struct Registration {
    pub name: &'static str,
    pub descriptors: &'static [ParamDescriptor],
    factory: fn(f32) -> Box<dyn AudioProcessor>,
}

impl Registration {
    pub fn of<P: ProcessorDefinition>() -> Self {
        Self {
            name: P::NAME,
            descriptors: P::DESCRIPTORS,
            factory: construct::<P>,
        }
    }

    pub fn instantiate(&self, sample_rate: f32) -> Box<dyn AudioProcessor> {
        (self.factory)(sample_rate)
    }

    /// Check the descriptor table: valid ranges, unique names, and no more
    /// than [`MAX_PARAMS`] entries.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let invalid = |param: &str| RegistrationError::InvalidDescriptor {
            processor: self.name.to_string(),
            param: param.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid(""));
        }
        if self.descriptors.len() > MAX_PARAMS {
            return Err(invalid(self.descriptors[MAX_PARAMS].name));
        }
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            if !descriptor.is_valid() {
                return Err(invalid(descriptor.name));
            }
            if self.descriptors[..i].iter().any(|d| d.name == descriptor.name) {
                return Err(invalid(descriptor.name));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("processor '{0}' is already registered")]
    DuplicateName(String),
    #[error("processor '{processor}' has an invalid descriptor for '{param}'")]
    InvalidDescriptor { processor: String, param: String },
    #[error("host rejected processor: {0}")]
    HostRejected(String),
}

/// Something processors can be registered with.
pub trait ProcessorHost {
    fn register(&mut self, registration: Registration) -> Result<(), RegistrationError>;
}

/// Register every processor this crate provides.
pub fn register_all(host: &mut dyn ProcessorHost) -> Result<(), RegistrationError> {
    host.register(Registration::of::<DistortionProcessor>())?;
    host.register(Registration::of::<GatedOscillatorProcessor>())?;
    host.register(Registration::of::<GainProcessor>())?;
    Ok(())
}

/// In-crate processor host.
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    entries: HashMap<&'static str, Registration>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn descriptors(&self, name: &str) -> Option<&'static [ParamDescriptor]> {
        self.entries.get(name).map(|r| r.descriptors)
    }

    pub fn instantiate(&self, name: &str, sample_rate: f32) -> Option<Box<dyn AudioProcessor>> {
        self.entries.get(name).map(|r| r.instantiate(sample_rate))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProcessorHost for ProcessorRegistry {
    fn register(&mut self, registration: Registration) -> Result<(), RegistrationError> {
        registration.validate()?;
        if self.entries.contains_key(registration.name) {
            return Err(RegistrationError::DuplicateName(registration.name.to_string()));
        }
        self.entries.insert(registration.name, registration);
        Ok(())
    }
}
