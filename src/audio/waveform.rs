// Live waveform analysis
// Reduces each rendered buffer to RMS magnitudes and hands them to the UI side

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of waveform points
pub const DEFAULT_WAVEFORM_POINTS: usize = 60;

/// Per-buffer RMS reducer. Owned by the render callback.
pub struct WaveformAnalyzer {
    points: usize,
    magnitudes: Vec<f32>,
}

impl WaveformAnalyzer {
    pub fn new(points: usize) -> Self {
        let points = points.max(1);
        Self {
            points,
            // ceil(L / max(L / N, 1)) never exceeds 2N
            magnitudes: Vec::with_capacity(points * 2),
        }
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// Analyze an interleaved buffer, using the first channel only.
    ///
    /// Returns `None` when the buffer carries no channel data; the caller
    /// keeps whatever snapshot it already published.
    pub fn analyze(&mut self, interleaved: &[f32], channels: usize) -> Option<&[f32]> {
        if channels == 0 {
            return None;
        }
        let frame_length = interleaved.len() / channels;
        if frame_length == 0 {
            return None;
        }

        let step = (frame_length / self.points).max(1);
        self.magnitudes.clear();

        let mut start = 0;
        while start < frame_length {
            let end = (start + step).min(frame_length);
            let mut sum = 0.0f32;
            for frame in start..end {
                let sample = interleaved[frame * channels];
                sum += sample * sample;
            }
            self.magnitudes.push((sum / (end - start) as f32).sqrt());
            start = end;
        }

        Some(self.magnitudes.as_slice())
    }
}

/// Single-slot snapshot handoff between the render callback and pollers.
///
/// A publish overwrites whatever is in the slot. The writer never waits: if a
/// reader holds the slot, that publish is skipped and the next buffer wins.
pub struct WaveformSlot {
    points: usize,
    values: Mutex<Vec<f32>>,
    generation: AtomicU64,
}

impl WaveformSlot {
    pub fn new(points: usize) -> Self {
        let points = points.max(1);
        let mut values = Vec::with_capacity(points * 2);
        values.resize(points, 0.0);
        Self {
            points,
            values: Mutex::new(values),
            generation: AtomicU64::new(0),
        }
    }

    /// Called from the render callback
    pub fn try_publish(&self, magnitudes: &[f32]) -> bool {
        let Some(mut values) = self.values.try_lock() else {
            return false;
        };
        values.clear();
        values.extend_from_slice(magnitudes);
        self.generation.fetch_add(1, Ordering::Release);
        true
    }

    /// Reset to `points` zeros
    pub fn clear(&self) {
        let mut values = self.values.lock();
        values.clear();
        values.resize(self.points, 0.0);
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn snapshot(&self) -> Vec<f32> {
        self.values.lock().clone()
    }

    /// Bumped on every publish or clear
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn points(&self) -> usize {
        self.points
    }
}
