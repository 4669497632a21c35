// Settings module
mod engine;

pub use engine::{DecodeSettings, EngineSettings, OutputSettings, MAX_WAVEFORM_POINTS};
