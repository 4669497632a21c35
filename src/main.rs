// waveplay - play one file on the default output device
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use waveplay::{EngineSettings, NowPlayingUpdate, Player};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const BAR_WIDTH: usize = 24;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        bail!("usage: waveplay <file> [volume]");
    };
    let volume = match args.next() {
        Some(v) => Some(v.parse::<f32>().context("volume must be a number")?),
        None => None,
    };

    let config_dir = std::env::var_os("WAVEPLAY_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let settings = EngineSettings::load(&config_dir)?;

    let mut player = Player::new(settings).with_notifier(|update: NowPlayingUpdate| {
        if let NowPlayingUpdate::Updated(info) = update {
            log::info!(
                "[NowPlaying] {} {:.1}/{:.1}s rate {}",
                info.title,
                info.elapsed,
                info.duration,
                info.rate
            );
        }
    });
    if let Some(volume) = volume {
        player.set_volume(volume);
    }

    player
        .play_file(Path::new(&file))
        .with_context(|| format!("could not play {}", file))?;

    let status = player.status();
    let mut generation = None;
    let mut peak = 0.0f32;
    while !status.has_finished() {
        std::thread::sleep(POLL_INTERVAL);
        let latest = status.waveform_generation();
        if generation != Some(latest) {
            generation = Some(latest);
            peak = status.waveform_snapshot().into_iter().fold(0.0f32, f32::max);
        }
        let filled = ((peak * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
        print!(
            "\r{:>7.2}/{:.2}s [{:<width$}]",
            status.current_time(),
            status.duration(),
            "#".repeat(filled),
            width = BAR_WIDTH
        );
        std::io::stdout().flush()?;
    }
    println!();

    player.stop();
    Ok(())
}
