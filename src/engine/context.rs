use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::EngineError;

/// Number of downstream ports a context exposes. Port 0 is the host output.
pub const MAX_PORTS: u8 = 8;

static NEXT_CONTEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Sample-accurate audio clock shared between the two domains.
///
/// Only the renderer advances it; the control domain reads it to resolve
/// "now" and to run the safety-net sweep.
#[derive(Debug)]
pub struct AudioClock {
    frames: AtomicU64,
    sample_rate: f32,
}

impl AudioClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Current time in seconds.
    pub fn time(&self) -> f64 {
        self.frame() as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Move the clock forward by `frames` rendered frames.
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
    }
}

/// A downstream consumer of the engine's master output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    context: u32,
    port: u8,
}

impl Destination {
    pub fn context_id(&self) -> u32 {
        self.context
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub(crate) fn mask(&self) -> u8 {
        1 << self.port
    }
}

/// The audio-processing context engines are created against.
#[derive(Debug, Clone)]
pub struct AudioContext {
    id: u32,
    sample_rate: f32,
    clock: Arc<AudioClock>,
    closed: Arc<AtomicBool>,
}

impl AudioContext {
    pub fn new(sample_rate: f32) -> Result<Self, EngineError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            sample_rate,
            clock: Arc::new(AudioClock::new(sample_rate)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn clock(&self) -> &Arc<AudioClock> {
        &self.clock
    }

    pub fn current_time(&self) -> f64 {
        self.clock.time()
    }

    /// The host output (port 0).
    pub fn destination(&self) -> Destination {
        Destination {
            context: self.id,
            port: 0,
        }
    }

    /// An additional downstream port.
    pub fn bus(&self, port: u8) -> Result<Destination, EngineError> {
        if port >= MAX_PORTS {
            return Err(EngineError::InvalidDestination(port));
        }
        Ok(Destination {
            context: self.id,
            port,
        })
    }

    /// Close the context. Engines created from it stop accepting work.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_sample_rates() {
        assert_eq!(
            AudioContext::new(0.0).unwrap_err(),
            EngineError::InvalidSampleRate(0.0)
        );
        assert!(AudioContext::new(f32::NAN).is_err());
        assert!(AudioContext::new(48_000.0).is_ok());
    }

    #[test]
    fn contexts_have_distinct_ids() {
        let a = AudioContext::new(48_000.0).unwrap();
        let b = AudioContext::new(48_000.0).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.destination(), b.destination());
    }

    #[test]
    fn clock_reports_seconds() {
        let ctx = AudioContext::new(1_000.0).unwrap();
        ctx.clock().advance(1_500);
        assert_eq!(ctx.clock().frame(), 1_500);
        assert_eq!(ctx.current_time(), 1.5);
    }

    #[test]
    fn bus_ports_are_bounded() {
        let ctx = AudioContext::new(48_000.0).unwrap();
        assert_eq!(ctx.bus(3).unwrap().port(), 3);
        assert_eq!(ctx.bus(8).unwrap_err(), EngineError::InvalidDestination(8));
    }

    #[test]
    fn close_is_shared_between_clones() {
        let ctx = AudioContext::new(48_000.0).unwrap();
        let other = ctx.clone();
        ctx.close();
        assert!(other.is_closed());
    }
}
