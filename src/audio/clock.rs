// Playback clock
// Elapsed time is the seek offset plus the frames rendered from the current segment

use std::sync::atomic::{AtomicU64, Ordering};

/// Duration reported when nothing usable is loaded. Consumers treat it as unknown.
pub const UNKNOWN_DURATION: f64 = 1.0;

const FRAME_BITS: u32 = 48;
const FRAME_MASK: u64 = (1 << FRAME_BITS) - 1;

/// Render-time counter shared with the render callback.
///
/// Packs the segment epoch (upper 16 bits) with the number of frames rendered
/// from that segment (lower 48 bits), so a single load always yields a
/// position that belongs to a known segment. Epoch 0 means nothing scheduled.
#[derive(Debug, Default)]
pub struct RenderCounter {
    word: AtomicU64,
}

impl RenderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, epoch: u16, frames: u64) {
        let word = ((epoch as u64) << FRAME_BITS) | (frames & FRAME_MASK);
        self.word.store(word, Ordering::Release);
    }

    pub fn unschedule(&self) {
        self.word.store(0, Ordering::Release);
    }

    /// `(epoch, frames)`
    pub fn load(&self) -> (u16, u64) {
        let word = self.word.load(Ordering::Acquire);
        ((word >> FRAME_BITS) as u16, word & FRAME_MASK)
    }
}

/// Epochs cycle through 1..=u16::MAX; 0 is reserved for "unscheduled"
pub fn next_epoch(epoch: u16) -> u16 {
    epoch.checked_add(1).unwrap_or(1)
}

/// Clock parameters for the loaded track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    pub seek_offset: f64,
    pub sample_rate: u32,
    pub duration: f64,
    /// Epoch of the segment scheduled at `seek_offset`, 0 if none
    pub epoch: u16,
}

impl PlaybackClock {
    /// Clock for an empty session
    pub fn idle() -> Self {
        Self {
            seek_offset: 0.0,
            sample_rate: 0,
            duration: UNKNOWN_DURATION,
            epoch: 0,
        }
    }

    /// Current time for a counter reading.
    ///
    /// A reading from a different epoch than the one scheduled at
    /// `seek_offset` is ignored and the clock falls back to the offset.
    pub fn current_time(&self, reading: (u16, u64)) -> f64 {
        let (epoch, frames) = reading;
        let elapsed = if self.epoch != 0 && epoch == self.epoch && self.sample_rate > 0 {
            frames as f64 / self.sample_rate as f64
        } else {
            0.0
        };
        (self.seek_offset + elapsed).min(self.duration).max(0.0)
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::idle()
    }
}
