// Decoded sources and tracks
// A source is fully decoded interleaved f32 PCM that can be read from any frame offset

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// PCM that can be read from an arbitrary frame offset.
///
/// `frames` is called from the render callback, so implementations must not
/// block or allocate.
pub trait DecodedSource: Send + Sync {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> usize;
    fn total_frames(&self) -> u64;

    /// Interleaved samples for up to `max_frames` frames starting at `start_frame`.
    /// Returns an empty slice at or past the end.
    fn frames(&self, start_frame: u64, max_frames: usize) -> &[f32];
}

/// Opens a media location into a [`Track`]
pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Track>;
}

/// In-memory interleaved PCM
pub struct PcmSource {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl PcmSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }
}

impl DecodedSource for PcmSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn total_frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        (self.samples.len() / self.channels) as u64
    }

    fn frames(&self, start_frame: u64, max_frames: usize) -> &[f32] {
        let total = self.total_frames();
        if start_frame >= total {
            return &[];
        }
        let count = (total - start_frame).min(max_frames as u64) as usize;
        let start = start_frame as usize * self.channels;
        &self.samples[start..start + count * self.channels]
    }
}

struct TrackInner {
    title: String,
    path: Option<PathBuf>,
    source: Arc<dyn DecodedSource>,
}

/// A loaded track. Immutable; cloning shares the decoded source.
#[derive(Clone)]
pub struct Track {
    inner: Arc<TrackInner>,
}

impl Track {
    /// Wrap a decoded source. Rejects sources with no playable frames.
    pub fn new(
        title: impl Into<String>,
        path: Option<PathBuf>,
        source: Arc<dyn DecodedSource>,
    ) -> Result<Self> {
        let location = path.clone().unwrap_or_default();
        if source.sample_rate() == 0 {
            return Err(EngineError::open_failed(location, "sample rate is zero"));
        }
        if source.channels() == 0 {
            return Err(EngineError::open_failed(location, "no audio channels"));
        }
        if source.total_frames() == 0 {
            return Err(EngineError::open_failed(location, "no audio frames"));
        }

        Ok(Self {
            inner: Arc::new(TrackInner {
                title: title.into(),
                path,
                source,
            }),
        })
    }

    /// Convenience constructor for in-memory PCM
    pub fn from_pcm(
        title: impl Into<String>,
        samples: Vec<f32>,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Self> {
        let source = Arc::new(PcmSource::new(samples, sample_rate, channels));
        Self::new(title, None, source)
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn source(&self) -> &Arc<dyn DecodedSource> {
        &self.inner.source
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.source.sample_rate()
    }

    pub fn channels(&self) -> usize {
        self.inner.source.channels()
    }

    pub fn total_frames(&self) -> u64 {
        self.inner.source.total_frames()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.total_frames() as f64 / self.sample_rate() as f64
    }

    /// Frame index for a time in seconds, clamped to the track
    pub fn frame_at(&self, seconds: f64) -> u64 {
        let frame = (seconds.max(0.0) * self.sample_rate() as f64).floor() as u64;
        frame.min(self.total_frames())
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("title", &self.title())
            .field("path", &self.path())
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.channels())
            .field("total_frames", &self.total_frames())
            .finish()
    }
}
