use crate::processor::RegistrationError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The audio context was closed before or during the call
    #[error("audio context is closed")]
    ContextClosed,

    /// Sample rate must be finite and positive
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f32),

    /// The render-module processors could not be registered
    #[error("processor registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// `initialize` has not completed successfully
    #[error("engine is not initialized")]
    NotReady,

    /// The destination was created by a different audio context
    #[error("destination belongs to another audio context")]
    ForeignDestination,

    /// Port number out of range
    #[error("invalid destination port {0} (must be below {max})", max = crate::engine::context::MAX_PORTS)]
    InvalidDestination(u8),
}
