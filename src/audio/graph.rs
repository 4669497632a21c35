// Audio graph / transport
// Segment scheduling, gain and the waveform tap on top of an output stream
//
// Seeking never repositions a running cursor: the current segment is dropped
// and a new one covering the remaining frames is scheduled in its place.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use super::output::{OutputDevice, OutputStream, StreamSpec};
use super::resample::resample;
use super::source::{DecodedSource, Track};
use super::waveform::WaveformAnalyzer;
use crate::error::Result;
use crate::state::PlaybackStatus;

/// NaN-safe clamp to `[0, 1]`
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// A contiguous run of frames scheduled for playback
struct Segment {
    source: Arc<dyn DecodedSource>,
    start_frame: u64,
    frame_count: u64,
    rendered: u64,
    epoch: u16,
}

impl Segment {
    /// `None` when nothing remains from `start_frame`
    fn from_frame(source: &Arc<dyn DecodedSource>, start_frame: u64, epoch: u16) -> Option<Self> {
        let remaining = source.total_frames().saturating_sub(start_frame);
        if remaining == 0 {
            return None;
        }
        Some(Self {
            source: Arc::clone(source),
            start_frame,
            frame_count: remaining,
            rendered: 0,
            epoch,
        })
    }
}

/// State shared between the control thread and the render callback
struct RenderShared {
    segment: Mutex<Option<Segment>>,
    playing: AtomicBool,
    volume: AtomicU32,
    status: PlaybackStatus,
}

/// Render-side half of the graph, owned by the output callback
struct RenderTap {
    shared: Arc<RenderShared>,
    analyzer: WaveformAnalyzer,
}

impl RenderTap {
    fn render(&mut self, out: &mut [f32], out_channels: usize) {
        out.fill(0.0);
        if out_channels == 0 || !self.shared.playing.load(Ordering::Acquire) {
            return;
        }

        // Control thread is swapping segments; this period stays silent
        let Some(mut slot) = self.shared.segment.try_lock() else {
            return;
        };
        let Some(segment) = slot.as_mut() else {
            return;
        };

        let remaining = segment.frame_count - segment.rendered;
        if remaining == 0 {
            return;
        }

        let wanted = (out.len() / out_channels) as u64;
        let take = wanted.min(remaining) as usize;
        let src_channels = segment.source.channels();
        let pcm = segment
            .source
            .frames(segment.start_frame + segment.rendered, take);
        let frames = pcm.len() / src_channels;

        // Tap sees the signal before gain
        if let Some(magnitudes) = self.analyzer.analyze(pcm, src_channels) {
            self.shared.status.waveform().try_publish(magnitudes);
        }

        let gain = f32::from_bits(self.shared.volume.load(Ordering::Relaxed));
        for (in_frame, out_frame) in pcm
            .chunks_exact(src_channels)
            .zip(out.chunks_exact_mut(out_channels))
        {
            for (channel, sample) in out_frame.iter_mut().enumerate() {
                *sample = in_frame[channel.min(src_channels - 1)] * gain;
            }
        }

        // Source ran short of what it promised; treat the segment as done
        segment.rendered = if frames == 0 {
            segment.frame_count
        } else {
            segment.rendered + frames as u64
        };
        self.shared.status.counter().store(segment.epoch, segment.rendered);
        if segment.rendered >= segment.frame_count {
            self.shared.status.set_finished(true);
        }
    }
}

/// The real-time signal path for one track: segment -> gain -> output
///
/// Frames handed to and returned from the graph are source frames. When the
/// device runs at another rate the graph renders from a resampled copy and
/// the render counter counts output frames.
pub struct AudioGraph {
    track: Track,
    render: Arc<dyn DecodedSource>,
    shared: Arc<RenderShared>,
    stream: Option<Box<dyn OutputStream>>,
    playing: bool,
}

impl AudioGraph {
    /// Build a fresh graph and start output from `at_frame`.
    ///
    /// On failure nothing is left running and the shared counter is
    /// unscheduled.
    pub fn start(
        device: &dyn OutputDevice,
        track: &Track,
        at_frame: u64,
        epoch: u16,
        volume: f32,
        buffer_frames: Option<u32>,
        status: PlaybackStatus,
    ) -> Result<Self> {
        let requested = StreamSpec {
            sample_rate: track.sample_rate(),
            channels: track.channels().min(u16::MAX as usize) as u16,
            buffer_frames,
        };
        let (spec, render) = match Self::prepare(device, track, requested) {
            Ok(prepared) => prepared,
            Err(e) => {
                status.counter().unschedule();
                return Err(e);
            }
        };

        let start_frame = source_to_render(track, render.as_ref(), at_frame);
        let segment = Segment::from_frame(&render, start_frame, epoch);
        match &segment {
            Some(_) => status.counter().store(epoch, 0),
            None => status.counter().unschedule(),
        }
        status.set_finished(segment.is_none());

        let shared = Arc::new(RenderShared {
            segment: Mutex::new(segment),
            playing: AtomicBool::new(false),
            volume: AtomicU32::new(clamp_volume(volume).to_bits()),
            status,
        });

        let mut tap = RenderTap {
            shared: Arc::clone(&shared),
            analyzer: WaveformAnalyzer::new(shared.status.waveform().points()),
        };

        let stream = device.open(
            spec,
            Box::new(move |out: &mut [f32], channels: usize| tap.render(out, channels)),
        );
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                shared.status.counter().unschedule();
                return Err(e);
            }
        };

        shared.playing.store(true, Ordering::Release);
        if let Err(e) = stream.play() {
            shared.playing.store(false, Ordering::Release);
            drop(stream);
            shared.status.counter().unschedule();
            return Err(e);
        }

        log::debug!(
            "[Graph] Started {:?} from frame {} (epoch {}, {} Hz)",
            track.title(),
            at_frame,
            epoch,
            spec.sample_rate
        );

        Ok(Self {
            track: track.clone(),
            render,
            shared,
            stream: Some(stream),
            playing: true,
        })
    }

    /// Negotiate the stream and get a source at the negotiated rate
    fn prepare(
        device: &dyn OutputDevice,
        track: &Track,
        requested: StreamSpec,
    ) -> Result<(StreamSpec, Arc<dyn DecodedSource>)> {
        let spec = device.negotiate(requested)?;
        if spec.sample_rate == track.sample_rate() {
            return Ok((spec, Arc::clone(track.source())));
        }

        log::info!(
            "[Graph] Resampling {:?} from {} Hz to {} Hz",
            track.title(),
            track.sample_rate(),
            spec.sample_rate
        );
        let converted: Arc<dyn DecodedSource> =
            Arc::new(resample(track.source().as_ref(), spec.sample_rate)?);
        Ok((spec, converted))
    }

    /// Replace the scheduled segment with one starting at `frame_offset`.
    ///
    /// Returns `false` when no frames remain from that offset; the old segment
    /// is still dropped and nothing is scheduled. The play/pause state is
    /// carried across the swap.
    pub fn schedule_from(&mut self, frame_offset: u64, epoch: u16) -> bool {
        let was_playing = self.playing;

        // Holding the slot keeps the render callback out for the whole swap
        let mut slot = self.shared.segment.lock();
        self.shared.playing.store(false, Ordering::Release);
        *slot = None;
        self.shared.status.counter().unschedule();

        let start_frame = source_to_render(&self.track, self.render.as_ref(), frame_offset);
        let scheduled = match Segment::from_frame(&self.render, start_frame, epoch) {
            Some(segment) => {
                *slot = Some(segment);
                self.shared.status.counter().store(epoch, 0);
                true
            }
            None => false,
        };
        self.shared.status.set_finished(!scheduled);

        if was_playing {
            self.shared.playing.store(true, Ordering::Release);
        }
        drop(slot);

        log::debug!(
            "[Graph] Scheduled from frame {} of {} (epoch {}, scheduled: {})",
            frame_offset,
            self.track.total_frames(),
            epoch,
            scheduled
        );
        scheduled
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.shared.playing.store(false, Ordering::Release);
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.pause() {
                // Render is already gated by the flag
                log::warn!("[Graph] Output pause failed: {}", e);
            }
        }
    }

    pub fn resume(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.shared.playing.store(true, Ordering::Release);
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.play() {
                log::warn!("[Graph] Output resume failed: {}", e);
            }
        }
    }

    /// Takes effect on the next rendered buffer
    pub fn set_volume(&self, volume: f32) {
        self.shared
            .volume
            .store(clamp_volume(volume).to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.shared.volume.load(Ordering::Relaxed))
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Rate the output stream runs at, which the render counter counts in
    pub fn output_rate(&self) -> u32 {
        self.render.sample_rate()
    }

    /// Source frame of the playhead, `None` when nothing is scheduled
    pub fn position_frames(&self) -> Option<u64> {
        let slot = self.shared.segment.lock();
        slot.as_ref().map(|s| {
            rescale(
                s.start_frame + s.rendered,
                self.render.sample_rate(),
                self.track.sample_rate(),
            )
        })
    }

    /// Tear the graph down: stop output, release the source, reset the tap
    pub fn stop(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        self.shared.playing.store(false, Ordering::Release);
        // Dropping the stream stops the callback before the tap is reset
        self.stream.take();
        self.shared.segment.lock().take();
        self.shared.status.counter().unschedule();
        self.shared.status.waveform().clear();
        self.shared.status.set_finished(false);
        log::debug!("[Graph] Stopped {:?}", self.track.title());
    }
}

fn rescale(frame: u64, from_rate: u32, to_rate: u32) -> u64 {
    if from_rate == to_rate {
        return frame;
    }
    (frame as u128 * to_rate as u128 / from_rate as u128) as u64
}

/// Map a source frame to the render source; the source end maps to the render end
fn source_to_render(track: &Track, render: &dyn DecodedSource, frame: u64) -> u64 {
    if frame >= track.total_frames() {
        return render.total_frames();
    }
    rescale(frame, track.sample_rate(), render.sample_rate()).min(render.total_frames())
}

impl Drop for AudioGraph {
    fn drop(&mut self) {
        self.teardown();
    }
}
