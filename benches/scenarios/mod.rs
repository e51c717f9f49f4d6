//! Real-world scenario benchmarks.
//!
//! These drive the engine and renderer the way a host does: triggers on the
//! control side, fixed-size blocks on the render side.

mod voices;

pub use voices::bench_voices;
