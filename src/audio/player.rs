// Audio player implementation
// Playback state machine: Stopped -> Loading -> Playing <-> Paused
use std::path::Path;
use std::sync::Arc;

use super::clock::{next_epoch, PlaybackClock, UNKNOWN_DURATION};
use super::decoder::SymphoniaOpener;
use super::graph::{clamp_volume, AudioGraph};
use super::output::{CpalDevice, OutputDevice};
use super::source::{SourceOpener, Track};
use crate::error::Result;
use crate::remote::{
    NoopNotifier, NowPlayingInfo, NowPlayingNotifier, NowPlayingUpdate, RemoteCommand,
    RemoteHooks,
};
use crate::settings::EngineSettings;
use crate::state::{PlaybackStatus, PlayerState, Published};

/// Mutable session state, owned by the player
struct PlaybackSession {
    track: Option<Track>,
    seek_offset: f64,
    volume: f32,
    state: PlayerState,
}

impl PlaybackSession {
    fn new(volume: f32) -> Self {
        Self {
            track: None,
            seek_offset: 0.0,
            volume,
            state: PlayerState::Stopped,
        }
    }

    /// Back to `Stopped`, keeping the volume
    fn reset(&mut self) {
        self.track = None;
        self.seek_offset = 0.0;
        self.state = PlayerState::Stopped;
    }
}

pub struct Player {
    settings: EngineSettings,
    device: Box<dyn OutputDevice>,
    opener: Box<dyn SourceOpener>,
    notifier: Arc<dyn NowPlayingNotifier>,
    hooks: RemoteHooks,
    session: PlaybackSession,
    graph: Option<AudioGraph>,
    epoch: u16,
    status: PlaybackStatus,
}

impl Player {
    /// Player on the default cpal device, decoding with Symphonia
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_device(settings, CpalDevice::new())
    }

    pub fn with_device(settings: EngineSettings, device: impl OutputDevice + 'static) -> Self {
        let settings = settings.sanitized();
        let volume = settings.initial_volume;
        let opener = SymphoniaOpener::with_max_bytes(settings.decode.max_memory_bytes());
        Self {
            status: PlaybackStatus::new(settings.waveform_points, volume),
            settings,
            device: Box::new(device),
            opener: Box::new(opener),
            notifier: Arc::new(NoopNotifier),
            hooks: RemoteHooks::default(),
            session: PlaybackSession::new(volume),
            graph: None,
            epoch: 0,
        }
    }

    pub fn with_opener(mut self, opener: impl SourceOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn with_notifier(mut self, notifier: impl NowPlayingNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Hook asked for a track when a remote surface requests "next"
    pub fn set_on_next_requested<F>(&mut self, hook: F)
    where
        F: FnMut() -> Option<Track> + Send + 'static,
    {
        self.hooks.on_next_requested = Some(Box::new(hook));
    }

    /// Hook asked for a track when a remote surface requests "previous"
    pub fn set_on_previous_requested<F>(&mut self, hook: F)
    where
        F: FnMut() -> Option<Track> + Send + 'static,
    {
        self.hooks.on_previous_requested = Some(Box::new(hook));
    }

    /// Open and decode a track without touching the current session
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Track> {
        let path = path.as_ref();
        self.opener.open(path).map_err(|e| {
            log::warn!("[Player] {}", e);
            e
        })
    }

    /// Open `path` and play it. An open failure stops any current playback.
    pub fn play_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match self.open(path) {
            Ok(track) => self.play(track),
            Err(e) => {
                self.teardown();
                self.publish();
                self.notifier.now_playing_changed(NowPlayingUpdate::Cleared);
                Err(e)
            }
        }
    }

    /// Replace the session with `track` and start playing from the top
    pub fn play(&mut self, track: Track) -> Result<()> {
        self.teardown();

        self.session.state = PlayerState::Loading;
        self.session.track = Some(track.clone());
        self.session.seek_offset = 0.0;
        self.epoch = next_epoch(self.epoch);
        self.publish();

        let started = AudioGraph::start(
            self.device.as_ref(),
            &track,
            0,
            self.epoch,
            self.session.volume,
            self.settings.output.buffer_frames,
            self.status.clone(),
        );

        match started {
            Ok(graph) => {
                self.graph = Some(graph);
                self.session.state = PlayerState::Playing;
                self.publish();
                log::info!(
                    "[Player] Playing {:?} ({:.2}s)",
                    track.title(),
                    track.duration()
                );
                self.notify_now_playing();
                Ok(())
            }
            Err(e) => {
                log::warn!("[Player] Could not start {:?}: {}", track.title(), e);
                self.session.reset();
                self.publish();
                self.notifier.now_playing_changed(NowPlayingUpdate::Cleared);
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.session.state != PlayerState::Playing {
            return;
        }
        if let Some(graph) = self.graph.as_mut() {
            graph.pause();
        }
        self.session.state = PlayerState::Paused;
        self.publish();
        self.notify_now_playing();
    }

    pub fn resume(&mut self) {
        if self.session.state != PlayerState::Paused {
            return;
        }
        if let Some(graph) = self.graph.as_mut() {
            graph.resume();
        }
        self.session.state = PlayerState::Playing;
        self.publish();
        self.notify_now_playing();
    }

    /// Playing <-> Paused; no-op otherwise
    pub fn toggle(&mut self) {
        match self.session.state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => self.resume(),
            PlayerState::Stopped | PlayerState::Loading => {}
        }
    }

    /// Tear everything down and clear the now-playing display
    pub fn stop(&mut self) {
        self.teardown();
        self.publish();
        self.notifier.now_playing_changed(NowPlayingUpdate::Cleared);
    }

    /// Seek to `seconds`, clamped to the track.
    ///
    /// The play/pause state is kept. A target at the very end schedules
    /// nothing: the clock parks at the duration and the state is left alone.
    pub fn seek(&mut self, seconds: f64) {
        let Some(track) = self.session.track.as_ref() else {
            return;
        };
        if self.graph.is_none() || seconds.is_nan() {
            return;
        }

        let target = seconds.clamp(0.0, track.duration());
        let frame = track.frame_at(target);

        self.session.seek_offset = target;
        self.epoch = next_epoch(self.epoch);
        // Publish the new offset first so a reader never pairs it with the old segment
        self.publish();

        let epoch = self.epoch;
        let scheduled = self
            .graph
            .as_mut()
            .is_some_and(|graph| graph.schedule_from(frame, epoch));
        if !scheduled {
            log::debug!(
                "[Player] Seek to {:.3}s leaves no frames; nothing scheduled",
                target
            );
        }
        self.notify_now_playing();
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        self.session.volume = volume;
        if let Some(graph) = self.graph.as_ref() {
            graph.set_volume(volume);
        }
        self.publish();
    }

    /// Dispatch a command from a remote-control surface
    pub fn handle_remote_command(&mut self, command: RemoteCommand) -> Result<()> {
        log::debug!("[Player] Remote command {:?}", command);
        match command {
            RemoteCommand::Play => self.resume(),
            RemoteCommand::Pause => self.pause(),
            RemoteCommand::Toggle => self.toggle(),
            RemoteCommand::Stop => self.stop(),
            RemoteCommand::Next | RemoteCommand::Previous => {
                if let Some(track) = self.hooks.request(command) {
                    return self.play(track);
                }
            }
        }
        Ok(())
    }

    pub fn state(&self) -> PlayerState {
        self.session.state
    }

    pub fn is_playing(&self) -> bool {
        self.session.state == PlayerState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.status.current_time()
    }

    /// Track duration, or [`UNKNOWN_DURATION`] with nothing loaded
    pub fn duration(&self) -> f64 {
        self.session
            .track
            .as_ref()
            .map(Track::duration)
            .unwrap_or(UNKNOWN_DURATION)
    }

    pub fn seek_offset(&self) -> f64 {
        self.session.seek_offset
    }

    pub fn volume(&self) -> f32 {
        self.session.volume
    }

    pub fn waveform_snapshot(&self) -> Vec<f32> {
        self.status.waveform_snapshot()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.track.as_ref()
    }

    /// The loaded track has been rendered to its end
    pub fn has_finished(&self) -> bool {
        self.graph.is_some() && self.status.has_finished()
    }

    /// Read handle for pollers on other threads
    pub fn status(&self) -> PlaybackStatus {
        self.status.clone()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Stop the graph and reset the session without notifying
    fn teardown(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.stop();
        }
        // The waveform also resets when no graph was running
        self.status.waveform().clear();
        self.status.counter().unschedule();
        self.session.reset();
    }

    fn publish(&self) {
        let clock = match self.session.track.as_ref() {
            Some(track) => PlaybackClock {
                seek_offset: self.session.seek_offset,
                // The counter runs in output frames
                sample_rate: self
                    .graph
                    .as_ref()
                    .map_or(track.sample_rate(), AudioGraph::output_rate),
                duration: track.duration(),
                epoch: self.epoch,
            },
            None => PlaybackClock::idle(),
        };
        self.status.publish(Published {
            state: self.session.state,
            clock,
            volume: self.session.volume,
            title: self.session.track.as_ref().map(|t| t.title().to_string()),
        });
    }

    fn notify_now_playing(&self) {
        let Some(track) = self.session.track.as_ref() else {
            return;
        };
        let rate = if self.is_playing() { 1.0 } else { 0.0 };
        self.notifier
            .now_playing_changed(NowPlayingUpdate::Updated(NowPlayingInfo {
                title: track.title().to_string(),
                duration: track.duration(),
                elapsed: self.current_time(),
                rate,
            }));
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::ManualDevice;
    use crate::error::EngineError;
    use approx::assert_abs_diff_eq;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        updates: Arc<Mutex<Vec<NowPlayingUpdate>>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<NowPlayingUpdate> {
            std::mem::take(&mut *self.updates.lock())
        }
    }

    impl NowPlayingNotifier for Recorder {
        fn now_playing_changed(&self, update: NowPlayingUpdate) {
            self.updates.lock().push(update);
        }
    }

    fn settings(points: usize) -> EngineSettings {
        EngineSettings {
            waveform_points: points,
            ..Default::default()
        }
    }

    fn sine(seconds: f64, sample_rate: u32) -> Track {
        let frames = (seconds * sample_rate as f64) as usize;
        let samples = (0..frames)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        Track::from_pcm("sine", samples, sample_rate, 1).unwrap()
    }

    fn player() -> (Player, ManualDevice, Recorder) {
        let device = ManualDevice::new();
        let recorder = Recorder::default();
        let player =
            Player::with_device(settings(60), device.clone()).with_notifier(recorder.clone());
        (player, device, recorder)
    }

    fn write_wav(path: &Path, seconds: u32, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..seconds * sample_rate {
            let value = (((i as f32) * 0.03).sin() * 12000.0) as i16;
            writer.write_sample(value).unwrap();
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_file_clock_follows_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3s_track_44100hz.wav");
        write_wav(&path, 3, 44100);

        let (mut player, device, _) = player();
        let track = player.open(&path).unwrap();
        player.play(track).unwrap();
        assert_abs_diff_eq!(player.current_time(), 0.0, epsilon = 1e-9);

        // One second of hardware periods
        device.advance(44100, 512);
        let buffer_period = 512.0 / 44100.0;
        assert_abs_diff_eq!(player.current_time(), 1.0, epsilon = buffer_period);
        assert_abs_diff_eq!(player.duration(), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_seek_past_duration_clamps_offset() {
        let (mut player, device, _) = player();
        player.play(sine(10.0, 8000)).unwrap();
        device.advance(8000, 256);

        player.seek(15.0);
        assert_eq!(player.seek_offset(), 10.0);
        assert!(player.seek_offset() <= player.duration());
    }

    #[test]
    fn test_seek_past_end_is_dropped_without_stopping() {
        // Documented quirk: nothing is scheduled and no end-of-track stop happens
        let (mut player, device, _) = player();
        player.play(sine(2.0, 8000)).unwrap();
        device.advance(4000, 256);

        player.seek(99.0);
        assert_eq!(player.state(), PlayerState::Playing);
        assert!(player.is_playing());
        assert_eq!(player.current_time(), 2.0);
        assert!(player.has_finished());

        // Rendering does not move the clock past the end
        device.advance(4000, 256);
        assert_eq!(player.current_time(), 2.0);
    }

    #[test]
    fn test_negative_seek_clamps_to_start() {
        let (mut player, device, _) = player();
        player.play(sine(4.0, 8000)).unwrap();
        device.advance(16000, 400);

        player.seek(-3.0);
        assert_eq!(player.seek_offset(), 0.0);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_seek_keeps_paused_state() {
        let (mut player, device, _) = player();
        player.play(sine(5.0, 8000)).unwrap();
        player.pause();

        player.seek(2.0);
        assert!(!player.is_playing());
        assert_eq!(player.state(), PlayerState::Paused);
        assert_abs_diff_eq!(player.current_time(), 2.0, epsilon = 1e-9);

        // Paused output does not advance the clock
        device.advance(8000, 256);
        assert_abs_diff_eq!(player.current_time(), 2.0, epsilon = 1e-9);

        player.resume();
        device.advance(4000, 400);
        assert_abs_diff_eq!(player.current_time(), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_seek_while_playing_jumps_then_advances() {
        let (mut player, device, _) = player();
        player.play(sine(10.0, 8000)).unwrap();
        device.advance(8000, 400);

        player.seek(6.0);
        assert!(player.is_playing());
        assert_abs_diff_eq!(player.current_time(), 6.0, epsilon = 1e-9);

        device.advance(800, 400);
        assert_abs_diff_eq!(player.current_time(), 6.1, epsilon = 1e-6);
    }

    #[test]
    fn test_stop_resets_time_waveform_and_now_playing() {
        let (mut player, device, recorder) = player();
        player.play(sine(3.0, 8000)).unwrap();
        device.advance(2048, 512);
        assert!(player.waveform_snapshot().iter().any(|v| *v > 0.0));

        player.stop();
        assert_eq!(player.state(), PlayerState::Stopped);
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.seek_offset(), 0.0);
        assert_eq!(player.waveform_snapshot(), vec![0.0; 60]);
        assert_eq!(recorder.take().last(), Some(&NowPlayingUpdate::Cleared));
        assert!(!device.is_open());
    }

    #[test]
    fn test_missing_file_fails_to_open_and_stays_stopped() {
        let (mut player, _, recorder) = player();
        let err = player.play_file("nonexistent.wav").unwrap_err();
        assert!(matches!(err, EngineError::OpenFailed { .. }));
        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(player.current_track().is_none());
        assert_eq!(recorder.take(), vec![NowPlayingUpdate::Cleared]);

        assert!(matches!(
            player.open("nonexistent.wav"),
            Err(EngineError::OpenFailed { .. })
        ));
    }

    #[test]
    fn test_failed_open_clears_previous_session() {
        let (mut player, device, _) = player();
        player.play(sine(3.0, 8000)).unwrap();
        assert!(device.is_open());

        assert!(player.play_file("nonexistent.wav").is_err());
        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(!device.is_open());
        assert_eq!(player.duration(), UNKNOWN_DURATION);
    }

    #[test]
    fn test_engine_start_failure_leaves_player_stopped() {
        let (mut player, device, recorder) = player();
        device.fail_next_open("format mismatch");

        let err = player.play(sine(1.0, 8000)).unwrap_err();
        assert!(matches!(err, EngineError::EngineStartFailed(_)));
        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(player.current_track().is_none());
        assert_eq!(player.duration(), UNKNOWN_DURATION);
        assert_eq!(recorder.take(), vec![NowPlayingUpdate::Cleared]);

        // The next attempt goes through
        player.play(sine(1.0, 8000)).unwrap();
        assert!(player.is_playing());
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let (mut player, device, recorder) = player();
        player.play(sine(3.0, 8000)).unwrap();
        device.advance(800, 400);
        recorder.take();

        player.pause();
        let after_one = (player.state(), player.current_time());
        player.pause();
        assert_eq!((player.state(), player.current_time()), after_one);
        assert_eq!(recorder.take().len(), 1);

        player.resume();
        player.resume();
        assert_eq!(player.state(), PlayerState::Playing);
        assert_eq!(recorder.take().len(), 1);
    }

    #[test]
    fn test_toggle_flips_and_ignores_stopped() {
        let (mut player, _, recorder) = player();
        player.toggle();
        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(recorder.take().is_empty());

        player.play(sine(1.0, 8000)).unwrap();
        player.toggle();
        assert_eq!(player.state(), PlayerState::Paused);
        player.toggle();
        assert_eq!(player.state(), PlayerState::Playing);
    }

    #[test]
    fn test_now_playing_rate_tracks_state() {
        let (mut player, _, recorder) = player();
        player.play(sine(2.0, 8000)).unwrap();
        player.pause();
        player.resume();

        let rates: Vec<f64> = recorder
            .take()
            .into_iter()
            .filter_map(|u| match u {
                NowPlayingUpdate::Updated(info) => {
                    assert_eq!(info.title, "sine");
                    assert_abs_diff_eq!(info.duration, 2.0, epsilon = 1e-9);
                    Some(info.rate)
                }
                NowPlayingUpdate::Cleared => None,
            })
            .collect();
        assert_eq!(rates, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_volume_clamping() {
        let (mut player, _, _) = player();
        for (input, expected) in [(0.5, 0.5), (1.5, 1.0), (-0.2, 0.0), (f32::NAN, 0.0)] {
            player.set_volume(input);
            assert_eq!(player.volume(), expected);
            assert_eq!(player.status().volume(), expected);
        }

        // Volume carries into the next graph
        player.set_volume(0.25);
        player.play(sine(1.0, 8000)).unwrap();
        assert_eq!(player.volume(), 0.25);
    }

    #[test]
    fn test_current_time_is_monotonic_while_playing() {
        let (mut player, device, _) = player();
        player.play(sine(3.0, 8000)).unwrap();

        let mut last = player.current_time();
        for _ in 0..100 {
            device.render(333);
            let now = player.current_time();
            assert!(now >= last);
            assert!(now <= player.duration());
            last = now;
        }
        // 100 * 333 frames runs past the 3s track
        assert_eq!(last, 3.0);
        assert!(player.has_finished());
    }

    #[test]
    fn test_waveform_snapshot_shape() {
        let (mut player, device, _) = player();
        player.play(sine(2.0, 8000)).unwrap();

        for frames in [30, 60, 90, 512, 1000] {
            device.render(frames);
            let snapshot = player.waveform_snapshot();
            let step = (frames / 60).max(1);
            assert_eq!(snapshot.len(), frames.div_ceil(step));
            assert!(snapshot.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn test_play_replaces_current_track() {
        let (mut player, device, _) = player();
        player.play(sine(3.0, 8000)).unwrap();
        device.advance(8000, 400);
        player.seek(2.0);

        player.play(sine(1.0, 16000)).unwrap();
        assert_eq!(player.seek_offset(), 0.0);
        assert_eq!(player.current_time(), 0.0);
        assert_abs_diff_eq!(player.duration(), 1.0, epsilon = 1e-9);
        assert_eq!(device.streams_opened(), 2);
        assert_eq!(device.spec().map(|s| s.sample_rate), Some(16000));
    }

    #[test]
    fn test_remote_next_plays_requested_track() {
        let (mut player, _, _) = player();
        let queued = sine(1.0, 8000);
        let mut handed_out = false;
        player.set_on_next_requested(move || {
            if handed_out {
                return None;
            }
            handed_out = true;
            Some(queued.clone())
        });

        player.handle_remote_command(RemoteCommand::Next).unwrap();
        assert!(player.is_playing());

        // Hook declines: playback continues untouched
        player.handle_remote_command(RemoteCommand::Next).unwrap();
        assert!(player.is_playing());

        // No previous hook installed
        player.handle_remote_command(RemoteCommand::Previous).unwrap();
        assert!(player.is_playing());

        player.handle_remote_command(RemoteCommand::Pause).unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        player.handle_remote_command(RemoteCommand::Play).unwrap();
        assert_eq!(player.state(), PlayerState::Playing);
        player.handle_remote_command(RemoteCommand::Stop).unwrap();
        assert_eq!(player.state(), PlayerState::Stopped);
    }

    #[test]
    fn test_status_handle_reads_from_another_thread() {
        let (mut player, device, _) = player();
        player.play(sine(2.0, 8000)).unwrap();
        device.advance(4000, 500);

        let status = player.status();
        let reader = std::thread::spawn(move || (status.is_playing(), status.current_time()));
        let (playing, time) = reader.join().unwrap();
        assert!(playing);
        assert_abs_diff_eq!(time, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_clock_stays_in_seconds_on_a_fixed_rate_device() {
        let device = ManualDevice::with_sample_rate(48000);
        let mut player = Player::with_device(settings(60), device.clone());
        player.play(sine(3.0, 44100)).unwrap();
        assert_eq!(device.spec().map(|s| s.sample_rate), Some(48000));
        assert_abs_diff_eq!(player.duration(), 3.0, epsilon = 1e-9);

        device.advance(48000, 480);
        assert_abs_diff_eq!(player.current_time(), 1.0, epsilon = 1e-9);

        player.seek(2.0);
        assert_abs_diff_eq!(player.current_time(), 2.0, epsilon = 1e-9);
        device.advance(24000, 480);
        assert_abs_diff_eq!(player.current_time(), 2.5, epsilon = 1e-9);

        device.advance(48000, 480);
        assert_abs_diff_eq!(player.current_time(), 3.0, epsilon = 1e-9);
        assert!(player.has_finished());
    }

    #[test]
    fn test_settings_are_sanitized_on_construction() {
        let raw = EngineSettings {
            waveform_points: 0,
            initial_volume: 3.0,
            ..Default::default()
        };
        let player = Player::with_device(raw, ManualDevice::new());
        assert_eq!(player.settings().waveform_points, 1);
        assert_eq!(player.settings().initial_volume, 1.0);
        assert_eq!(player.volume(), 1.0);
        assert_eq!(player.waveform_snapshot(), vec![0.0]);
    }

    #[test]
    fn test_seek_with_nothing_loaded_is_ignored() {
        let (mut player, _, recorder) = player();
        player.seek(3.0);
        assert_eq!(player.seek_offset(), 0.0);
        assert_eq!(player.duration(), UNKNOWN_DURATION);
        assert!(recorder.take().is_empty());
    }
}
