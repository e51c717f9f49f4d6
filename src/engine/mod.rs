//! The kick engine: a control-domain [`KickEngine`] paired with a
//! render-domain [`KickRenderer`].
//!
//! ```ignore
//! let context = AudioContext::new(48_000.0)?;
//! let (mut engine, mut renderer) = KickEngine::new(&context, EngineConfig::default())?;
//! engine.initialize(&mut ProcessorRegistry::new())?;
//!
//! // control thread
//! engine.update_params(&ParamsUpdate { tune: Some(45.0), ..Default::default() });
//! engine.trigger(None);
//!
//! // audio thread
//! renderer.render(&mut block);
//!
//! // control thread, regularly
//! engine.poll();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rtrb::RingBuffer;

use crate::dsp::curve::LookupTable;
use crate::dsp::noise::{NoiseBuffer, NoiseGenerator, NoiseKind};
use crate::graph::{Voice, VoiceResources};
use crate::processor::{self, ProcessorHost};

pub mod active;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod params;
pub mod renderer;

pub use self::active::{ActiveVoice, ActiveVoices};
pub use self::config::EngineConfig;
pub use self::context::{AudioClock, AudioContext, Destination};
pub use self::error::EngineError;
pub use self::message::{EndReason, LiveParams};
pub use self::params::{KickParams, ParamChanges, ParamsUpdate};
pub use self::renderer::KickRenderer;
pub use crate::graph::VoiceId;

use self::message::{RenderCommand, RenderEvent};

/*
Control / Render Split
======================

    control thread                          audio thread
    ──────────────                          ────────────
    KickEngine                              KickRenderer
      params, curve, noise                    voices (preallocated)
      ActiveVoices (bookkeeping)              live param smoothers
         │                                          │
         │ ── commands (rtrb) ──────────────────►  │  Start / Release / Live / Routes
         │ ◄───────────────────── events (rtrb) ── │  Ended { voice, reason }
         │                                          │
         └──────── AudioClock (atomic frames) ◄─────┘  advanced per block

Voices are built here, where allocation is fine, and boxed across. The
renderer only computes samples. When a voice finishes, the box comes back
up the event queue and is dropped on this side.

Every voice scheduled by `trigger` gets an entry in ActiveVoices with a
deadline a little past its natural end. `poll()` first drains completion
events, then sweeps for entries whose deadline the clock has passed and
releases those explicitly. Both paths remove the entry from the set, and only
the removal that finds it counts; the renderer ignores releases for voices it
no longer holds. Whichever path wins, the voice is cleaned up exactly once.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The voice was handed to the renderer.
    Scheduled(VoiceId),
    /// `initialize` has not succeeded, or the context is closed.
    NotReady,
    /// The renderer is not draining commands.
    QueueFull,
}

impl TriggerOutcome {
    pub fn voice(&self) -> Option<VoiceId> {
        match self {
            TriggerOutcome::Scheduled(id) => Some(*id),
            _ => None,
        }
    }
}

/// Voice lifecycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceStats {
    pub triggered: u64,
    /// Finished on their own.
    pub completed: u64,
    /// Released by the safety net, a disconnect, or voice stealing.
    pub forced: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Uninitialized,
    Ready,
    Failed,
}

/// Precomputed noise, one buffer per color.
struct NoiseBank {
    white: Arc<NoiseBuffer>,
    pink: Arc<NoiseBuffer>,
}

impl NoiseBank {
    fn generate(generator: &mut NoiseGenerator<StdRng>, duration: f32, sample_rate: f32) -> Self {
        Self {
            white: Arc::new(generator.generate(NoiseKind::White, duration, sample_rate)),
            pink: Arc::new(generator.generate(NoiseKind::Pink, duration, sample_rate)),
        }
    }

    fn get(&self, kind: NoiseKind) -> &Arc<NoiseBuffer> {
        match kind {
            NoiseKind::White => &self.white,
            NoiseKind::Pink => &self.pink,
        }
    }
}

/// Commands that could not be queued yet.
#[derive(Default)]
struct Pending {
    release_all: bool,
    releases: Vec<VoiceId>,
    routes: Option<u8>,
    live: Option<LiveParams>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        !self.release_all && self.releases.is_empty() && self.routes.is_none() && self.live.is_none()
    }
}

pub struct KickEngine {
    context_id: u32,
    sample_rate: f32,
    clock: Arc<AudioClock>,
    closed: Arc<AtomicBool>,
    config: EngineConfig,
    state: EngineState,

    params: KickParams,
    curve: Arc<LookupTable>,
    noise: NoiseBank,
    noise_generator: NoiseGenerator<StdRng>,

    active: ActiveVoices,
    routes: u8,
    next_id: u64,
    stats: VoiceStats,

    commands: rtrb::Producer<RenderCommand>,
    events: rtrb::Consumer<RenderEvent>,
    pending: Pending,
}

impl KickEngine {
    /// Create an engine and its renderer. The renderer belongs on the audio
    /// thread; the engine stays on the control thread.
    ///
    /// The master output starts connected to the context's destination.
    pub fn new(context: &AudioContext, config: EngineConfig) -> Result<(Self, KickRenderer), EngineError> {
        if context.is_closed() {
            return Err(EngineError::ContextClosed);
        }

        let config = config.sanitized();
        let sample_rate = context.sample_rate();
        let params = KickParams::default();

        let rng = match config.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut noise_generator = NoiseGenerator::new(rng);
        let noise = NoiseBank::generate(&mut noise_generator, config.noise_duration, sample_rate);

        let curve = Arc::new(LookupTable::build(
            params.shape_character,
            params.distortion_amount,
            config.curve_table_size,
        ));

        // Room for every voice the renderer might hand back on top of the
        // command backlog
        let (commands, command_rx) = RingBuffer::new(config.queue_capacity);
        let (event_tx, events) = RingBuffer::new(config.queue_capacity + config.max_voices * 2);

        let routes = context.destination().mask();
        let renderer = KickRenderer::new(
            sample_rate,
            Arc::clone(context.clock()),
            command_rx,
            event_tx,
            config.max_voices,
            params.live(),
            config.smoothing_time,
            routes,
        );

        let engine = Self {
            context_id: context.id(),
            sample_rate,
            clock: Arc::clone(context.clock()),
            closed: context.closed_flag(),
            config,
            state: EngineState::Uninitialized,
            params,
            curve,
            noise,
            noise_generator,
            active: ActiveVoices::new(),
            routes,
            next_id: 1,
            stats: VoiceStats::default(),
            commands,
            events,
            pending: Pending::default(),
        };

        Ok((engine, renderer))
    }

    /// Register the render module's processors with `host`.
    ///
    /// Until this succeeds `trigger` is a no-op. If it fails the engine stays
    /// unusable; calling it again returns [`EngineError::NotReady`].
    pub fn initialize(&mut self, host: &mut dyn ProcessorHost) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => return Ok(()),
            EngineState::Failed => return Err(EngineError::NotReady),
            EngineState::Uninitialized => {}
        }

        if self.is_closed() {
            error!("cannot initialize kick engine: audio context is closed");
            self.state = EngineState::Failed;
            return Err(EngineError::ContextClosed);
        }

        match processor::register_all(host) {
            Ok(()) => {
                self.state = EngineState::Ready;
                info!(
                    "kick engine ready ({} Hz, {} voices max)",
                    self.sample_rate, self.config.max_voices
                );
                Ok(())
            }
            Err(err) => {
                error!("failed to register kick processors: {err}");
                self.state = EngineState::Failed;
                Err(err.into())
            }
        }
    }

    /// Merge a partial parameter write.
    ///
    /// Shape changes rebuild the distortion curve for voices triggered from
    /// now on. Live values are sent to the renderer, which glides to them.
    /// Everything else is picked up by the next trigger.
    pub fn update_params(&mut self, update: &ParamsUpdate) -> ParamChanges {
        let changes = self.params.apply(update);

        if changes.curve {
            self.curve = Arc::new(LookupTable::build(
                self.params.shape_character,
                self.params.distortion_amount,
                self.config.curve_table_size,
            ));
            debug!(
                "rebuilt distortion curve (character {:.2}, amount {:.2})",
                self.params.shape_character, self.params.distortion_amount
            );
        }

        if changes.live {
            self.pending.live = Some(self.params.live());
            self.flush_pending();
        }

        changes
    }

    /// Schedule one kick at `time` seconds on the audio clock, or now.
    /// Times in the past play immediately.
    pub fn trigger(&mut self, time: Option<f64>) -> TriggerOutcome {
        if self.state != EngineState::Ready {
            warn!("kick trigger ignored: engine is not initialized");
            return TriggerOutcome::NotReady;
        }
        if self.is_closed() {
            warn!("kick trigger ignored: audio context is closed");
            return TriggerOutcome::NotReady;
        }

        // Anything still waiting must reach the renderer before a new voice
        if !self.flush_pending() {
            warn!("kick trigger dropped: render queue is full");
            return TriggerOutcome::QueueFull;
        }

        let now = self.clock.time();
        let start = match time {
            Some(t) if t.is_finite() && t > now => t,
            _ => now,
        };

        let id = VoiceId(self.next_id);
        let settings = self.params.voice_settings();
        let resources = VoiceResources {
            curve: Arc::clone(&self.curve),
            noise: Arc::clone(self.noise.get(self.params.click_noise_type)),
        };
        let voice = Box::new(Voice::new(id, &settings, resources, start, self.sample_rate));

        // Tracked before it is sent; the safety net starts after the voice's own stop time
        self.active.insert(ActiveVoice {
            id,
            start,
            deadline: start + settings.lifetime() + self.config.safety_margin,
        });
        if self.commands.push(RenderCommand::Start(voice)).is_err() {
            self.active.remove(id);
            warn!("kick trigger dropped: render queue is full");
            return TriggerOutcome::QueueFull;
        }

        self.next_id += 1;
        self.stats.triggered += 1;
        debug!("{id} scheduled at {start:.4}s (now {now:.4}s)");

        TriggerOutcome::Scheduled(id)
    }

    /// Route the master output to `destination` as well.
    pub fn connect(&mut self, destination: Destination) -> Result<(), EngineError> {
        self.check_destination(destination, "connect")?;
        self.routes |= destination.mask();
        self.pending.routes = Some(self.routes);
        self.flush_pending();
        Ok(())
    }

    /// Stop feeding `destination`, or everything when `None`.
    ///
    /// Disconnecting everything also releases every active voice.
    pub fn disconnect(&mut self, destination: Option<Destination>) -> Result<(), EngineError> {
        match destination {
            Some(destination) => {
                self.check_destination(destination, "disconnect")?;
                self.routes &= !destination.mask();
                self.pending.routes = Some(self.routes);
            }
            None => {
                self.routes = 0;
                self.pending.routes = Some(0);
                self.release_all();
            }
        }
        self.flush_pending();
        Ok(())
    }

    /// Collect finished voices, force overdue ones, and retry anything that
    /// could not be queued earlier. Call regularly from the control thread.
    ///
    /// Returns how many voices left the active set.
    pub fn poll(&mut self) -> usize {
        let mut finished = 0;

        while let Ok(RenderEvent::Ended { voice, reason }) = self.events.pop() {
            let id = voice.id();
            if self.active.remove(id).is_some() {
                finished += 1;
                match reason {
                    EndReason::Completed => {
                        self.stats.completed += 1;
                        debug!("{id} completed");
                    }
                    EndReason::Released | EndReason::Stolen => {
                        self.stats.forced += 1;
                        debug!("{id} ended early ({reason:?})");
                    }
                }
            }
            drop(voice);
        }

        let now = self.clock.time();
        for overdue in self.active.expire(now) {
            finished += 1;
            self.stats.forced += 1;
            debug!(
                "{} overdue (deadline {:.4}s, now {now:.4}s), forcing release",
                overdue.id, overdue.deadline
            );
            self.pending.releases.push(overdue.id);
        }

        self.flush_pending();
        finished
    }

    /// Rebuild both noise buffers. Voices already playing keep the buffer
    /// they started with.
    pub fn regenerate_noise(&mut self) {
        self.noise = NoiseBank::generate(&mut self.noise_generator, self.config.noise_duration, self.sample_rate);
        info!(
            "regenerated click noise ({} samples per buffer)",
            self.noise.white.len()
        );
    }

    pub fn params(&self) -> &KickParams {
        &self.params
    }

    pub fn stats(&self) -> VoiceStats {
        self.stats
    }

    /// Voices scheduled and not yet finished.
    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    pub fn is_voice_active(&self, id: VoiceId) -> bool {
        self.active.contains(id)
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready && !self.is_closed()
    }

    pub fn is_connected(&self, destination: Destination) -> bool {
        destination.context_id() == self.context_id && self.routes & destination.mask() != 0
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn current_time(&self) -> f64 {
        self.clock.time()
    }

    pub fn curve(&self) -> &Arc<LookupTable> {
        &self.curve
    }

    pub fn noise(&self, kind: NoiseKind) -> &Arc<NoiseBuffer> {
        self.noise.get(kind)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_destination(&self, destination: Destination, operation: &str) -> Result<(), EngineError> {
        if self.is_closed() {
            warn!("{operation} skipped: audio context is closed");
            return Err(EngineError::ContextClosed);
        }
        if destination.context_id() != self.context_id {
            warn!(
                "{operation} skipped: destination belongs to context {} (engine uses {})",
                destination.context_id(),
                self.context_id
            );
            return Err(EngineError::ForeignDestination);
        }
        Ok(())
    }

    fn release_all(&mut self) {
        let released = self.active.drain();
        if !released.is_empty() {
            debug!("releasing {} active voices", released.len());
        }
        self.stats.forced += released.len() as u64;

        // A blanket release supersedes individual ones
        self.pending.releases.clear();
        self.pending.release_all = true;
    }

    /// Push queued control state to the renderer. Returns `true` once
    /// nothing is left waiting.
    fn flush_pending(&mut self) -> bool {
        if self.pending.release_all {
            if self.commands.push(RenderCommand::ReleaseAll).is_err() {
                return self.queue_full();
            }
            self.pending.release_all = false;
        }

        while let Some(&id) = self.pending.releases.first() {
            if self.commands.push(RenderCommand::Release(id)).is_err() {
                return self.queue_full();
            }
            self.pending.releases.remove(0);
        }

        if let Some(routes) = self.pending.routes {
            if self.commands.push(RenderCommand::Routes(routes)).is_err() {
                return self.queue_full();
            }
            self.pending.routes = None;
        }

        if let Some(live) = self.pending.live {
            if self.commands.push(RenderCommand::Live(live)).is_err() {
                return self.queue_full();
            }
            self.pending.live = None;
        }

        self.pending.is_empty()
    }

    fn queue_full(&self) -> bool {
        warn!("render command queue is full; will retry on next poll");
        false
    }
}
