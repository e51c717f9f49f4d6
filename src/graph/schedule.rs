use std::ops::Range;

use crate::graph::node::seconds_to_frames;

/*
Source Scheduling
=================

Every time-bounded source in a voice (the body oscillator, the click noise)
has an absolute start and stop on the audio clock, in frames:

   block:      |---------|---------|---------|---------|
   source:            [start ============== stop)
   rendered:          ^^^^^^^^^^^^^^^^^^^^^^^^

For each block the source renders only the slice of indices that overlaps
[start, stop). Before the start it is silent; at the stop it is finished.

Stops are set at the natural decay time plus a fixed margin, so a source is
guaranteed to end even if floating-point rounding lands the envelope's floor
a sample or two late.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSchedule {
    start_frame: u64,
    stop_frame: u64,
}

impl SourceSchedule {
    pub fn new(start_frame: u64, stop_frame: u64) -> Self {
        Self {
            start_frame,
            stop_frame: stop_frame.max(start_frame),
        }
    }

    /// Start at `start` seconds and stop `duration + margin` seconds later.
    pub fn from_seconds(start: f64, duration: f64, margin: f64, sample_rate: f32) -> Self {
        let start_frame = seconds_to_frames(start, sample_rate);
        let length = seconds_to_frames(duration.max(0.0) + margin.max(0.0), sample_rate);
        Self::new(start_frame, start_frame + length)
    }

    /// Indices of a block starting at `block_start` that this source plays.
    pub fn active_range(&self, block_start: u64, len: usize) -> Option<Range<usize>> {
        let block_end = block_start + len as u64;
        let from = self.start_frame.max(block_start);
        let to = self.stop_frame.min(block_end);
        if from >= to {
            return None;
        }
        Some((from - block_start) as usize..(to - block_start) as usize)
    }

    /// Seconds since the start for absolute `frame`.
    #[inline]
    pub fn elapsed(&self, frame: u64, sample_rate: f32) -> f32 {
        frame.saturating_sub(self.start_frame) as f32 / sample_rate
    }

    /// True once a block ending at `block_end` has played past the stop.
    pub fn is_finished(&self, block_end: u64) -> bool {
        block_end >= self.stop_frame
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }
}
