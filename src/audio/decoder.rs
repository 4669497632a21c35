// Audio decoder using Symphonia
// Decodes a whole file to interleaved f32 PCM at open time

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use super::source::{PcmSource, SourceOpener, Track};
use crate::error::{EngineError, Result};

/// Default cap on decoded PCM held in memory
pub const DEFAULT_MAX_DECODED_BYTES: u64 = 1024 * 1024 * 1024;

/// Opens files through Symphonia's default probe and codec registry.
///
/// Tracks are decoded whole; files whose PCM would exceed the memory cap
/// fail to open instead of exhausting RAM.
#[derive(Debug, Clone, Copy)]
pub struct SymphoniaOpener {
    max_samples: usize,
}

impl Default for SymphoniaOpener {
    fn default() -> Self {
        Self::with_max_bytes(DEFAULT_MAX_DECODED_BYTES)
    }
}

impl SymphoniaOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap decoded PCM at `bytes` of f32 samples
    pub fn with_max_bytes(bytes: u64) -> Self {
        let samples = bytes / std::mem::size_of::<f32>() as u64;
        Self {
            max_samples: usize::try_from(samples).unwrap_or(usize::MAX).max(1),
        }
    }
}

impl SourceOpener for SymphoniaOpener {
    fn open(&self, path: &Path) -> Result<Track> {
        let decoded = AudioDecoder::open(path, self.max_samples)?.decode_all()?;
        log::info!(
            "[Decoder] Opened {:?}: {} Hz, {} ch, {} frames",
            path,
            decoded.sample_rate,
            decoded.channels,
            decoded.samples.len() / decoded.channels.max(1)
        );

        let source = Arc::new(PcmSource::new(
            decoded.samples,
            decoded.sample_rate,
            decoded.channels,
        ));
        Track::new(decoded.title, Some(path.to_path_buf()), source)
    }
}

struct DecodedFile {
    title: String,
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

struct AudioDecoder<'a> {
    path: &'a Path,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    title: Option<String>,
    expected_samples: Option<usize>,
    max_samples: usize,
}

impl<'a> AudioDecoder<'a> {
    /// Probe the file and prepare a decoder for its first audio track
    fn open(path: &'a Path, max_samples: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| EngineError::open_failed(path, e))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| EngineError::open_failed(path, format!("unrecognised format: {}", e)))?;

        let mut title = None;
        if let Some(mut metadata) = probed.metadata.get() {
            if let Some(rev) = metadata.skip_to_latest() {
                title = title_tag(rev);
            }
        }

        let mut format = probed.format;
        if title.is_none() {
            if let Some(rev) = format.metadata().skip_to_latest() {
                title = title_tag(rev);
            }
        }

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| EngineError::open_failed(path, "no audio track found"))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let expected_samples = track.codec_params.n_frames.map(|frames| {
            usize::try_from(frames.saturating_mul(channels as u64)).unwrap_or(usize::MAX)
        });
        if let Some(expected) = expected_samples {
            if expected > max_samples {
                return Err(EngineError::open_failed(
                    path,
                    format!("{} samples exceed the {} sample decode limit", expected, max_samples),
                ));
            }
        }

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| EngineError::open_failed(path, format!("unsupported codec: {}", e)))?;

        Ok(Self {
            path,
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            title,
            expected_samples,
            max_samples,
        })
    }

    /// Decode every packet of the track into one interleaved buffer
    fn decode_all(mut self) -> Result<DecodedFile> {
        let mut samples = Vec::with_capacity(self.expected_samples.unwrap_or(0));
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break; // End of stream
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(EngineError::open_failed(
                        self.path,
                        format!("failed to read packet: {}", e),
                    ))
                }
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("[Decoder] Decode error in {:?} (skipping): {}", self.path, e);
                    continue;
                }
                Err(e) => {
                    return Err(EngineError::open_failed(self.path, format!("decode failed: {}", e)))
                }
            };

            let spec = *decoded.spec();
            self.sample_rate = spec.rate;
            self.channels = spec.channels.count();

            let needs_realloc = sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < decoded.capacity());
            if needs_realloc {
                sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
            }
            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                if samples.len() + buf.samples().len() > self.max_samples {
                    return Err(EngineError::open_failed(
                        self.path,
                        format!("decoded audio exceeds the {} sample limit", self.max_samples),
                    ));
                }
                samples.extend_from_slice(buf.samples());
            }
        }

        if self.channels == 0 || self.sample_rate == 0 {
            return Err(EngineError::open_failed(self.path, "stream has no audio format"));
        }

        let title = self.title.unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string()
        });

        Ok(DecodedFile {
            title,
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}

fn title_tag(rev: &MetadataRevision) -> Option<String> {
    rev.tags()
        .iter()
        .find(|tag| matches!(tag.std_key, Some(StandardTagKey::TrackTitle)))
        .map(|tag| tag.value.to_string().trim().to_string())
        .filter(|title| !title.is_empty())
}
