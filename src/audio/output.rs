// Audio output devices
// cpal for hardware, plus a manually clocked device for headless runs and tests

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfigRange};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Render callback installed on an output stream.
///
/// Receives a zeroed interleaved buffer and the stream's channel count.
/// Runs on the real-time thread.
pub type RenderCallback = Box<dyn FnMut(&mut [f32], usize) + Send + 'static>;

/// What the graph asks of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_frames: Option<u32>,
}

/// A running output stream. Dropping it stops the callback.
pub trait OutputStream {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
}

pub trait OutputDevice {
    /// The spec the device would run for `requested`. The rate and channel
    /// count may differ from what was asked for.
    fn negotiate(&self, requested: StreamSpec) -> Result<StreamSpec>;

    fn open(&self, spec: StreamSpec, callback: RenderCallback) -> Result<Box<dyn OutputStream>>;
}

fn format_rank(format: SampleFormat) -> Option<u8> {
    match format {
        SampleFormat::F32 => Some(0),
        SampleFormat::I16 => Some(1),
        SampleFormat::U16 => Some(2),
        _ => None,
    }
}

/// Default output device of the default cpal host
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalDevice;

impl CpalDevice {
    pub fn new() -> Self {
        Self
    }

    fn default_device() -> Result<(cpal::Device, Vec<SupportedStreamConfigRange>)> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::start_failed("no output device available"))?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| {
                EngineError::start_failed(format!("failed to query output configs: {}", e))
            })?
            .collect();

        Ok((device, supported))
    }

    /// The requested rate when some usable config offers it, otherwise the
    /// closest rate any usable config can run at
    fn pick_rate(supported: &[SupportedStreamConfigRange], requested: u32) -> Option<u32> {
        supported
            .iter()
            .filter(|c| format_rank(c.sample_format()).is_some())
            .map(|c| requested.clamp(c.min_sample_rate().0, c.max_sample_rate().0))
            .min_by_key(|rate| (rate.abs_diff(requested), u32::MAX - rate))
    }

    /// Pick a config that runs at the spec's rate, preferring its channel
    /// count and then f32 > i16 > u16
    fn choose_config(
        supported: &[SupportedStreamConfigRange],
        spec: &StreamSpec,
    ) -> Option<SupportedStreamConfigRange> {
        let rate = SampleRate(spec.sample_rate);

        supported
            .iter()
            .filter(|c| c.min_sample_rate() <= rate && rate <= c.max_sample_rate())
            .filter_map(|c| {
                let rank = format_rank(c.sample_format())?;
                let channel_miss = if c.channels() == spec.channels { 0 } else { 1 };
                Some(((channel_miss, rank), c))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, c)| c.clone())
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut callback: RenderCallback,
    ) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let mut scratch: Vec<f32> = Vec::new();

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0.0);
                    }
                    let buffer = &mut scratch[..data.len()];
                    buffer.fill(0.0);
                    callback(buffer, channels);

                    for (out, sample) in data.iter_mut().zip(buffer.iter()) {
                        *out = T::from_sample(*sample);
                    }
                },
                move |err| {
                    log::error!("[Output] Stream error: {}", err);
                },
                None,
            )
            .map_err(|e| EngineError::start_failed(format!("failed to build output stream: {}", e)))
    }
}

impl OutputDevice for CpalDevice {
    fn negotiate(&self, requested: StreamSpec) -> Result<StreamSpec> {
        let (_, supported) = Self::default_device()?;
        let rate = Self::pick_rate(&supported, requested.sample_rate).ok_or_else(|| {
            EngineError::start_failed("no output config with a usable sample format")
        })?;
        if rate != requested.sample_rate {
            log::info!(
                "[Output] Device does not offer {} Hz, running at {} Hz",
                requested.sample_rate,
                rate
            );
        }
        Ok(StreamSpec {
            sample_rate: rate,
            ..requested
        })
    }

    fn open(&self, spec: StreamSpec, callback: RenderCallback) -> Result<Box<dyn OutputStream>> {
        let (device, supported) = Self::default_device()?;

        let chosen = Self::choose_config(&supported, &spec).ok_or_else(|| {
            EngineError::start_failed(format!(
                "no output config supports {} Hz with a usable sample format",
                spec.sample_rate
            ))
        })?;

        let config = chosen.with_sample_rate(SampleRate(spec.sample_rate));
        let sample_format = config.sample_format();
        let mut stream_config: StreamConfig = config.into();
        if let Some(frames) = spec.buffer_frames {
            stream_config.buffer_size = BufferSize::Fixed(frames);
        }

        log::info!(
            "[Output] Opening {:?} stream: {} Hz, {} ch (source {} ch)",
            sample_format,
            stream_config.sample_rate.0,
            stream_config.channels,
            spec.channels
        );

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &stream_config, callback)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &stream_config, callback)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &stream_config, callback)?,
            format => {
                return Err(EngineError::start_failed(format!(
                    "unsupported sample format: {:?}",
                    format
                )))
            }
        };

        Ok(Box::new(CpalStream { stream }))
    }
}

struct CpalStream {
    stream: Stream,
}

impl OutputStream for CpalStream {
    fn play(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| EngineError::start_failed(format!("failed to start stream: {}", e)))
    }

    fn pause(&mut self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| EngineError::start_failed(format!("failed to pause stream: {}", e)))
    }
}

#[derive(Default)]
struct ManualState {
    callback: Option<RenderCallback>,
    spec: Option<StreamSpec>,
    playing: bool,
    streams_opened: usize,
    fail_next_open: Option<String>,
    channels_override: Option<u16>,
    rate_override: Option<u32>,
}

/// Output device whose render callback is driven by the caller.
///
/// `render(frames)` stands in for one hardware period. Clones share the same
/// device, so a test can keep a handle while the player owns another.
#[derive(Clone, Default)]
pub struct ManualDevice {
    state: Arc<Mutex<ManualState>>,
}

impl ManualDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present a fixed channel count regardless of the requested one
    pub fn with_channels(channels: u16) -> Self {
        let device = Self::new();
        device.state.lock().channels_override = Some(channels);
        device
    }

    /// Run at a fixed rate regardless of the requested one
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        let device = Self::new();
        device.state.lock().rate_override = Some(sample_rate);
        device
    }

    /// Make the next `open` fail, as if the device refused the format
    pub fn fail_next_open(&self, reason: impl Into<String>) {
        self.state.lock().fail_next_open = Some(reason.into());
    }

    /// Run one hardware period of `frames` frames and return what was rendered.
    /// A paused or closed stream yields silence without invoking the callback.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut state = self.state.lock();
        let channels = state.spec.map(|s| s.channels as usize).unwrap_or(0);
        let mut buffer = vec![0.0; frames * channels];
        if state.playing {
            if let Some(callback) = state.callback.as_mut() {
                callback(&mut buffer, channels);
            }
        }
        buffer
    }

    /// Render `total_frames` in periods of `period` frames
    pub fn advance(&self, total_frames: usize, period: usize) {
        let period = period.max(1);
        let mut done = 0;
        while done < total_frames {
            let frames = period.min(total_frames - done);
            self.render(frames);
            done += frames;
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().callback.is_some()
    }

    pub fn is_running(&self) -> bool {
        let state = self.state.lock();
        state.callback.is_some() && state.playing
    }

    pub fn streams_opened(&self) -> usize {
        self.state.lock().streams_opened
    }

    /// Spec of the currently open stream
    pub fn spec(&self) -> Option<StreamSpec> {
        self.state.lock().spec
    }
}

impl OutputDevice for ManualDevice {
    fn negotiate(&self, requested: StreamSpec) -> Result<StreamSpec> {
        let state = self.state.lock();
        Ok(StreamSpec {
            sample_rate: state.rate_override.unwrap_or(requested.sample_rate),
            channels: state.channels_override.unwrap_or(requested.channels),
            ..requested
        })
    }

    fn open(&self, spec: StreamSpec, callback: RenderCallback) -> Result<Box<dyn OutputStream>> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next_open.take() {
            return Err(EngineError::start_failed(reason));
        }

        state.spec = Some(StreamSpec {
            sample_rate: state.rate_override.unwrap_or(spec.sample_rate),
            channels: state.channels_override.unwrap_or(spec.channels),
            ..spec
        });
        state.callback = Some(callback);
        state.playing = false;
        state.streams_opened += 1;

        Ok(Box::new(ManualStream {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ManualStream {
    state: Arc<Mutex<ManualState>>,
}

impl OutputStream for ManualStream {
    fn play(&mut self) -> Result<()> {
        self.state.lock().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.state.lock().playing = false;
        Ok(())
    }
}

impl Drop for ManualStream {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.callback = None;
        state.spec = None;
        state.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(channels: u16) -> StreamSpec {
        StreamSpec {
            sample_rate: 44100,
            channels,
            buffer_frames: None,
        }
    }

    #[test]
    fn test_manual_device_runs_callback_only_while_playing() {
        let device = ManualDevice::new();
        let mut stream = device
            .open(spec(2), Box::new(|out: &mut [f32], _: usize| out.fill(0.25)))
            .unwrap();

        // Opened but not started
        assert_eq!(device.render(4), vec![0.0; 8]);

        stream.play().unwrap();
        assert_eq!(device.render(4), vec![0.25; 8]);

        stream.pause().unwrap();
        assert_eq!(device.render(2), vec![0.0; 4]);
    }

    #[test]
    fn test_dropping_stream_closes_device() {
        let device = ManualDevice::new();
        let mut stream = device.open(spec(1), Box::new(|_: &mut [f32], _: usize| {})).unwrap();
        stream.play().unwrap();
        assert!(device.is_running());

        drop(stream);
        assert!(!device.is_open());
        assert!(device.render(16).is_empty());
    }

    #[test]
    fn test_channel_override_reaches_callback() {
        let device = ManualDevice::with_channels(2);
        let mut stream = device
            .open(
                spec(1),
                Box::new(|out: &mut [f32], channels: usize| {
                    assert_eq!(channels, 2);
                    out.fill(1.0);
                }),
            )
            .unwrap();
        stream.play().unwrap();
        assert_eq!(device.render(3).len(), 6);
        assert_eq!(device.spec().map(|s| s.channels), Some(2));
    }

    fn range(min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            2,
            SampleRate(min),
            SampleRate(max),
            cpal::SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn test_pick_rate_keeps_offered_rate() {
        let supported = [range(8000, 192000, SampleFormat::F32)];
        assert_eq!(CpalDevice::pick_rate(&supported, 44100), Some(44100));
    }

    #[test]
    fn test_pick_rate_falls_back_to_closest_offered_rate() {
        // Shared-mode devices often expose only the mix format
        let supported = [range(48000, 48000, SampleFormat::F32)];
        assert_eq!(CpalDevice::pick_rate(&supported, 44100), Some(48000));

        let supported = [
            range(96000, 96000, SampleFormat::F32),
            range(32000, 32000, SampleFormat::I16),
            range(44100, 44100, SampleFormat::I32),
        ];
        assert_eq!(CpalDevice::pick_rate(&supported, 44100), Some(32000));
        assert_eq!(CpalDevice::pick_rate(&[], 44100), None);
    }

    #[test]
    fn test_choose_config_prefers_channels_then_format() {
        let mono_f32 = SupportedStreamConfigRange::new(
            1,
            SampleRate(44100),
            SampleRate(48000),
            cpal::SupportedBufferSize::Unknown,
            SampleFormat::F32,
        );
        let stereo_i16 = range(44100, 48000, SampleFormat::I16);
        let stereo_f32 = range(48000, 48000, SampleFormat::F32);
        let supported = [mono_f32, stereo_i16, stereo_f32];

        let chosen = CpalDevice::choose_config(&supported, &spec(2)).unwrap();
        assert_eq!(chosen.channels(), 2);
        assert_eq!(chosen.sample_format(), SampleFormat::I16);
    }

    #[test]
    fn test_manual_device_rate_override() {
        let device = ManualDevice::with_sample_rate(48000);
        let negotiated = device.negotiate(spec(2)).unwrap();
        assert_eq!(negotiated.sample_rate, 48000);
        assert_eq!(negotiated.channels, 2);

        let _stream = device.open(spec(2), Box::new(|_: &mut [f32], _: usize| {})).unwrap();
        assert_eq!(device.spec().map(|s| s.sample_rate), Some(48000));
    }

    #[test]
    fn test_fail_next_open() {
        let device = ManualDevice::new();
        device.fail_next_open("format mismatch");
        let result = device.open(spec(2), Box::new(|_: &mut [f32], _: usize| {}));
        assert!(matches!(result, Err(EngineError::EngineStartFailed(_))));

        // Only the next open fails
        assert!(device.open(spec(2), Box::new(|_: &mut [f32], _: usize| {})).is_ok());
    }
}
