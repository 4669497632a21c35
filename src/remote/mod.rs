// Now-playing publication and remote-control commands
// The platform integration (media keys, OS overlays) lives in the application;
// the engine only supplies values and accepts commands.

use crate::audio::source::Track;

/// Commands a remote-control surface can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Toggle,
    Stop,
    Next,
    Previous,
}

/// Values for an OS "now playing" display
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingInfo {
    pub title: String,
    /// Seconds
    pub duration: f64,
    /// Seconds
    pub elapsed: f64,
    /// 1.0 while playing, 0.0 otherwise
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NowPlayingUpdate {
    Updated(NowPlayingInfo),
    Cleared,
}

/// Receives now-playing changes. Called on the control thread.
pub trait NowPlayingNotifier: Send + Sync {
    fn now_playing_changed(&self, update: NowPlayingUpdate);
}

impl<F> NowPlayingNotifier for F
where
    F: Fn(NowPlayingUpdate) + Send + Sync,
{
    fn now_playing_changed(&self, update: NowPlayingUpdate) {
        self(update)
    }
}

/// Notifier that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NowPlayingNotifier for NoopNotifier {
    fn now_playing_changed(&self, _update: NowPlayingUpdate) {}
}

/// Hook asked for the track to play on next/previous; `None` leaves playback alone
pub type TrackRequest = Box<dyn FnMut() -> Option<Track> + Send + 'static>;

/// Next/previous hooks installed by the application
#[derive(Default)]
pub(crate) struct RemoteHooks {
    pub on_next_requested: Option<TrackRequest>,
    pub on_previous_requested: Option<TrackRequest>,
}

impl RemoteHooks {
    pub fn request(&mut self, command: RemoteCommand) -> Option<Track> {
        let hook = match command {
            RemoteCommand::Next => self.on_next_requested.as_mut(),
            RemoteCommand::Previous => self.on_previous_requested.as_mut(),
            _ => None,
        };
        let Some(hook) = hook else {
            log::debug!("[Remote] No hook for {:?}", command);
            return None;
        };
        hook()
    }
}
