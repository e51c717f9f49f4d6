use std::collections::HashMap;

use crate::graph::VoiceId;

/// Control-side bookkeeping for one scheduled voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveVoice {
    pub id: VoiceId,
    /// Audio-clock start, seconds.
    pub start: f64,
    /// Audio-clock time after which cleanup is forced, seconds.
    pub deadline: f64,
}

/// Voices the engine has scheduled and not yet seen finish.
///
/// Owned by the control domain only; the renderer never touches it. Removal
/// returns the entry at most once, so whichever of the completion path or
/// the safety-net sweep gets there first does the accounting.
#[derive(Debug, Default)]
pub struct ActiveVoices {
    voices: HashMap<VoiceId, ActiveVoice>,
}

impl ActiveVoices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, voice: ActiveVoice) {
        self.voices.insert(voice.id, voice);
    }

    pub fn remove(&mut self, id: VoiceId) -> Option<ActiveVoice> {
        self.voices.remove(&id)
    }

    pub fn contains(&self, id: VoiceId) -> bool {
        self.voices.contains_key(&id)
    }

    /// Remove and return every voice whose deadline is before `now`,
    /// oldest first.
    pub fn expire(&mut self, now: f64) -> Vec<ActiveVoice> {
        let mut expired: Vec<ActiveVoice> = self
            .voices
            .values()
            .filter(|v| v.deadline < now)
            .copied()
            .collect();
        expired.sort_by(|a, b| a.start.total_cmp(&b.start));

        for voice in &expired {
            self.voices.remove(&voice.id);
        }
        expired
    }

    /// Remove and return everything.
    pub fn drain(&mut self) -> Vec<ActiveVoice> {
        self.voices.drain().map(|(_, v)| v).collect()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
