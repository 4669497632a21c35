// Sample rate conversion
// Converts a decoded source to the output device rate with rubato's sinc resampler

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::source::{DecodedSource, PcmSource};
use crate::error::{EngineError, Result};

const CHUNK_FRAMES: usize = 1024;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resample `source` to `dst_rate`, returning an interleaved in-memory copy.
///
/// The output holds `round(frames * dst / src)` frames with the filter delay
/// trimmed, so frame `n` of the output lines up with `n / dst_rate` seconds.
pub fn resample(source: &dyn DecodedSource, dst_rate: u32) -> Result<PcmSource> {
    let src_rate = source.sample_rate();
    let channels = source.channels();
    let total = source.total_frames() as usize;
    if dst_rate == 0 || src_rate == 0 || channels == 0 {
        return Err(EngineError::start_failed("cannot resample without a format"));
    }

    let ratio = dst_rate as f64 / src_rate as f64;
    let expected = ((total as f64 * ratio).round() as usize).max(1);

    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_FRAMES, channels)
            .map_err(|e| EngineError::start_failed(format!("resampler setup failed: {}", e)))?;
    let delay = resampler.output_delay();

    let mut planar: Vec<Vec<f32>> = vec![Vec::with_capacity(CHUNK_FRAMES); channels];
    let mut out: Vec<f32> = Vec::with_capacity((expected + delay + CHUNK_FRAMES) * channels);

    let mut position = 0;
    while position < total {
        let needed = resampler.input_frames_next();
        let take = needed.min(total - position);
        let pcm = source.frames(position as u64, take);
        let frames = pcm.len() / channels;
        if frames == 0 {
            break;
        }

        for channel in planar.iter_mut() {
            channel.clear();
        }
        for frame in pcm.chunks_exact(channels) {
            for (channel, sample) in planar.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }

        let chunk = if frames == needed {
            resampler.process(planar.as_slice(), None)
        } else {
            resampler.process_partial(Some(planar.as_slice()), None)
        }
        .map_err(|e| EngineError::start_failed(format!("resample failed: {}", e)))?;
        interleave_into(&chunk, &mut out);
        position += frames;
    }

    // Drain the filter until the delayed tail is out
    while out.len() / channels < delay + expected {
        let chunk = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| EngineError::start_failed(format!("resample failed: {}", e)))?;
        if chunk.first().map_or(true, |c| c.is_empty()) {
            break;
        }
        interleave_into(&chunk, &mut out);
    }

    let start = (delay * channels).min(out.len());
    let mut samples = out.split_off(start);
    samples.resize(expected * channels, 0.0);

    log::debug!(
        "[Resample] {} Hz -> {} Hz: {} -> {} frames",
        src_rate,
        dst_rate,
        total,
        expected
    );

    Ok(PcmSource::new(samples, dst_rate, channels))
}

fn interleave_into(planar: &[Vec<f32>], out: &mut Vec<f32>) {
    let frames = planar.first().map_or(0, Vec::len);
    for frame in 0..frames {
        for channel in planar {
            out.push(channel[frame]);
        }
    }
}
