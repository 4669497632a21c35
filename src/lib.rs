// waveplay - playback engine for a desktop music player
// Module declarations
pub mod audio;
pub mod error;
pub mod remote;
pub mod settings;
pub mod state;

pub use audio::clock::UNKNOWN_DURATION;
pub use audio::decoder::SymphoniaOpener;
pub use audio::output::{CpalDevice, ManualDevice, OutputDevice, OutputStream, StreamSpec};
pub use audio::{DecodedSource, PcmSource, Player, SourceOpener, Track};
pub use error::EngineError;
pub use remote::{NowPlayingInfo, NowPlayingNotifier, NowPlayingUpdate, RemoteCommand};
pub use settings::EngineSettings;
pub use state::{PlaybackStatus, PlayerState};
