// Engine settings and persistence
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::decoder::DEFAULT_MAX_DECODED_BYTES;
use crate::audio::waveform::DEFAULT_WAVEFORM_POINTS;

/// Upper bound on waveform points
pub const MAX_WAVEFORM_POINTS: usize = 1024;

const DEFAULT_MAX_DECODED_MIB: u32 = (DEFAULT_MAX_DECODED_BYTES / (1024 * 1024)) as u32;

/// Output device settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Fixed device buffer size in frames; the host default when unset
    pub buffer_frames: Option<u32>,
}

/// Decoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeSettings {
    /// Largest decoded track kept in memory, in MiB of f32 PCM
    pub max_memory_mib: u32,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            max_memory_mib: DEFAULT_MAX_DECODED_MIB,
        }
    }
}

impl DecodeSettings {
    pub fn max_memory_bytes(&self) -> u64 {
        u64::from(self.max_memory_mib) * 1024 * 1024
    }
}

/// Settings read at player construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub version: i32, // Settings schema version for future migrations
    pub waveform_points: usize,
    pub initial_volume: f32,
    pub output: OutputSettings,
    pub decode: DecodeSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: 1,
            waveform_points: DEFAULT_WAVEFORM_POINTS,
            initial_volume: 1.0,
            output: OutputSettings::default(),
            decode: DecodeSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Get the settings file path
    pub fn get_settings_path(dir: &Path) -> PathBuf {
        dir.join("engine.json")
    }

    /// Parse settings from JSON, filling in defaults for missing fields
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: EngineSettings =
            serde_json::from_str(content).context("Failed to parse engine settings")?;
        Ok(settings.sanitized())
    }

    /// Load settings from `dir`, or return defaults if the file doesn't exist
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(dir);

        if !path.exists() {
            log::info!("[Settings] No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        let settings = Self::from_json(&content)?;

        log::info!("[Settings] Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).context("Failed to create settings directory")?;

        let path = Self::get_settings_path(dir);
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write settings file {:?}", path))?;

        log::info!("[Settings] Saved settings to {:?}", path);
        Ok(())
    }

    /// Clamp values into ranges the engine accepts
    pub fn sanitized(mut self) -> Self {
        self.waveform_points = self.waveform_points.clamp(1, MAX_WAVEFORM_POINTS);
        self.initial_volume = crate::audio::graph::clamp_volume(self.initial_volume);
        if self.output.buffer_frames == Some(0) {
            self.output.buffer_frames = None;
        }
        self.decode.max_memory_mib = self.decode.max_memory_mib.max(1);
        self
    }
}
