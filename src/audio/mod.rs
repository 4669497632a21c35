// Audio playback module
// Uses Symphonia for decoding and cpal for output

pub mod clock;
pub mod decoder;
pub mod graph;
pub mod output;
pub mod player;
pub mod resample;
pub mod source;
pub mod waveform;

pub use player::Player;
pub use source::{DecodedSource, PcmSource, SourceOpener, Track};
