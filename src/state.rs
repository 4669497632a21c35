// Published playback state
// Cloneable read handle for pollers on any thread
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::clock::{PlaybackClock, RenderCounter, UNKNOWN_DURATION};
use crate::audio::waveform::WaveformSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// Everything the controller publishes on each transition
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Published {
    pub state: PlayerState,
    pub clock: PlaybackClock,
    pub volume: f32,
    pub title: Option<String>,
}

impl Published {
    pub fn idle(volume: f32) -> Self {
        Self {
            state: PlayerState::Stopped,
            clock: PlaybackClock::idle(),
            volume,
            title: None,
        }
    }
}

struct StatusInner {
    published: RwLock<Published>,
    counter: RenderCounter,
    waveform: WaveformSlot,
    finished: AtomicBool,
}

/// Read-only view of a [`Player`](crate::Player).
///
/// Reads never wait on a controller operation: the published record is
/// swapped under a short write lock, and the render counter and waveform
/// slot are written by the render callback without blocking.
#[derive(Clone)]
pub struct PlaybackStatus {
    inner: Arc<StatusInner>,
}

impl PlaybackStatus {
    pub(crate) fn new(waveform_points: usize, volume: f32) -> Self {
        Self {
            inner: Arc::new(StatusInner {
                published: RwLock::new(Published::idle(volume)),
                counter: RenderCounter::new(),
                waveform: WaveformSlot::new(waveform_points),
                finished: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn publish(&self, published: Published) {
        *self.inner.published.write() = published;
    }

    pub(crate) fn counter(&self) -> &RenderCounter {
        &self.inner.counter
    }

    pub(crate) fn waveform(&self) -> &WaveformSlot {
        &self.inner.waveform
    }

    pub(crate) fn set_finished(&self, finished: bool) {
        self.inner.finished.store(finished, Ordering::Release);
    }

    pub fn state(&self) -> PlayerState {
        self.inner.published.read().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Seconds into the track, never past `duration()`
    pub fn current_time(&self) -> f64 {
        let clock = self.inner.published.read().clock;
        clock.current_time(self.inner.counter.load())
    }

    /// Track duration in seconds, or [`UNKNOWN_DURATION`] with nothing loaded
    pub fn duration(&self) -> f64 {
        self.inner.published.read().clock.duration
    }

    pub fn seek_offset(&self) -> f64 {
        self.inner.published.read().clock.seek_offset
    }

    pub fn volume(&self) -> f32 {
        self.inner.published.read().volume
    }

    pub fn title(&self) -> Option<String> {
        self.inner.published.read().title.clone()
    }

    /// Latest waveform magnitudes; all zeros when stopped
    pub fn waveform_snapshot(&self) -> Vec<f32> {
        self.inner.waveform.snapshot()
    }

    /// Bumped whenever the waveform snapshot changes
    pub fn waveform_generation(&self) -> u64 {
        self.inner.waveform.generation()
    }

    /// No frames are left to render for the loaded track
    pub fn has_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    pub fn has_known_duration(&self) -> bool {
        self.inner.published.read().clock.sample_rate > 0
    }
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self::new(crate::audio::waveform::DEFAULT_WAVEFORM_POINTS, 1.0)
    }
}

impl std::fmt::Debug for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStatus")
            .field("published", &*self.inner.published.read())
            .field("counter", &self.inner.counter.load())
            .finish()
    }
}
