use std::{fmt::Display, path::Path, sync::Arc, time::Duration};

use log::{error, info};
use parking_lot::Mutex;

use crate::{
    capture::{Capturer, ObservedKey},
    error::{FileError, SessionError},
    host::KeyboardHost,
    persistence,
    player::{PlaybackControl, PlaybackOutcome, Player},
    utils::NotifierOption,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Recording => write!(f, "recording"),
            Status::Playing => write!(f, "playing"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Notification {
    StatusChanged(Status),
    PlaybackFinished(PlaybackOutcome),
}

pub type Notifier = smol::channel::Sender<Notification>;

#[derive(Default)]
struct Inner {
    status: Status,
    capturer: Capturer,
}

/// Recording, capture and playback state of one macro.
///
/// Capture and playback exclude each other: every transition starts from
/// [`Status::Idle`] or returns to it.
pub struct Session {
    inner: Arc<Mutex<Inner>>,
    control: Arc<PlaybackControl>,
    host: Arc<dyn KeyboardHost>,
    notifier: Arc<Mutex<Option<Notifier>>>,
    loop_pause: Duration,
}

impl Session {
    pub fn new(host: Arc<dyn KeyboardHost>, loop_enabled: bool, loop_pause: Duration) -> Self {
        Self {
            inner: Default::default(),
            control: Arc::new(PlaybackControl::new(loop_enabled)),
            host,
            notifier: Default::default(),
            loop_pause,
        }
    }

    pub fn set_notifier(&self, notifier: Notifier) {
        *self.notifier.lock() = Some(notifier);
    }

    pub fn status(&self) -> Status {
        self.inner.lock().status
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().capturer.recording().len()
    }

    pub fn loop_enabled(&self) -> bool {
        self.control.loop_enabled()
    }

    pub fn set_loop(&self, enabled: bool) {
        self.control.set_loop_enabled(enabled);
        info!("Loop playback {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn toggle_loop(&self) -> bool {
        let enabled = self.control.toggle_loop();
        info!("Loop playback {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub fn start_recording(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        match inner.status {
            Status::Idle => {}
            Status::Recording => return Err(SessionError::AlreadyRecording),
            Status::Playing => return Err(SessionError::Busy(Status::Playing)),
        }
        inner.capturer.begin();
        inner.status = Status::Recording;
        drop(inner);

        info!("Recording started");
        self.notify(Notification::StatusChanged(Status::Recording));
        Ok(())
    }

    /// Returns the number of captured events.
    pub fn stop_recording(&self) -> Result<usize, SessionError> {
        let mut inner = self.inner.lock();
        if inner.status != Status::Recording {
            return Err(SessionError::NotRecording);
        }
        inner.status = Status::Idle;
        let count = inner.capturer.recording().len();
        drop(inner);

        info!("Recording stopped with {count} events");
        self.notify(Notification::StatusChanged(Status::Idle));
        Ok(count)
    }

    /// Appends a hook notification while recording, returns the new count.
    pub fn capture(&self, observed: ObservedKey) -> Option<usize> {
        let mut inner = self.inner.lock();
        (inner.status == Status::Recording).then(|| inner.capturer.observe(observed))
    }

    /// Starts playback on a background thread. The receiver resolves once
    /// the session is idle again.
    pub fn play(&self) -> Result<oneshot::Receiver<PlaybackOutcome>, SessionError> {
        let mut inner = self.inner.lock();
        match inner.status {
            Status::Idle => {}
            Status::Playing => return Err(SessionError::AlreadyPlaying),
            Status::Recording => return Err(SessionError::Busy(Status::Recording)),
        }
        if inner.capturer.recording().is_empty() {
            return Err(SessionError::NothingToPlay);
        }

        let events = inner.capturer.recording().snapshot();
        self.control.reset_cancel();
        inner.status = Status::Playing;

        let (done_tx, done_rx) = oneshot::channel();
        let finish = {
            let inner = self.inner.clone();
            let control = self.control.clone();
            let notifier = self.notifier.clone();
            move |outcome: PlaybackOutcome| {
                {
                    let mut inner = inner.lock();
                    control.reset_cancel();
                    inner.status = Status::Idle;
                }
                let notifier = notifier.lock();
                notifier.notify(Notification::PlaybackFinished(outcome.clone()));
                notifier.notify(Notification::StatusChanged(Status::Idle));
                let _ = done_tx.send(outcome);
            }
        };

        self.notify(Notification::StatusChanged(Status::Playing));
        let player = Player::new(self.control.clone(), self.host.clone(), self.loop_pause);
        if let Err(e) = player.spawn(events, finish) {
            error!("Could not start playback thread: {e}");
            inner.status = Status::Idle;
            drop(inner);
            self.notify(Notification::StatusChanged(Status::Idle));
            return Err(SessionError::Spawn(e.to_string()));
        }

        info!("Playback started");
        Ok(done_rx)
    }

    pub fn cancel_playback(&self) -> Result<(), SessionError> {
        if self.status() != Status::Playing {
            return Err(SessionError::NotPlaying);
        }
        info!("Playback cancel requested");
        self.control.cancel();
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<usize, FileError> {
        let inner = self.inner.lock();
        let recording = inner.capturer.recording();
        if recording.is_empty() {
            return Err(SessionError::NothingToSave.into());
        }
        persistence::save(recording, path)?;
        Ok(recording.len())
    }

    /// Replaces the recording with the file's contents. On error the
    /// current recording is kept.
    pub fn load(&self, path: &Path) -> Result<usize, FileError> {
        if let status @ (Status::Recording | Status::Playing) = self.status() {
            return Err(SessionError::Busy(status).into());
        }
        let recording = persistence::load(path)?;

        let mut inner = self.inner.lock();
        if inner.status != Status::Idle {
            return Err(SessionError::Busy(inner.status).into());
        }
        let count = recording.len();
        inner.capturer.replace(recording);
        Ok(count)
    }

    #[cfg(test)]
    pub fn recording(&self) -> crate::recording::Recording {
        self.inner.lock().capturer.recording().clone()
    }

    fn notify(&self, notification: Notification) {
        self.notifier.lock().notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;
    use crate::{
        codec::KeyToken,
        error::PersistError,
        player::tests::RecordingHost,
        recording::Action,
    };

    fn session() -> (Session, Arc<RecordingHost>) {
        session_with(RecordingHost::default())
    }

    fn session_with(host: RecordingHost) -> (Session, Arc<RecordingHost>) {
        let host = Arc::new(host);
        let session = Session::new(host.clone(), false, Duration::from_millis(10));
        (session, host)
    }

    fn key(seconds: f64, action: Action, character: char) -> ObservedKey {
        ObservedKey::new(
            UNIX_EPOCH + Duration::from_secs_f64(seconds),
            action,
            KeyToken::Character(character),
        )
    }

    fn record(session: &Session, keys: &[ObservedKey]) {
        session.start_recording().unwrap();
        for observed in keys {
            session.capture(*observed);
        }
        session.stop_recording().unwrap();
    }

    #[test]
    fn capture_only_while_recording() {
        let (session, _) = session();
        assert_eq!(session.capture(key(0.0, Action::Press, 'a')), None);

        session.start_recording().unwrap();
        assert_eq!(session.status(), Status::Recording);
        assert_eq!(session.capture(key(0.0, Action::Press, 'a')), Some(1));
        assert_eq!(session.capture(key(0.1, Action::Release, 'a')), Some(2));
        assert_eq!(session.stop_recording(), Ok(2));

        assert_eq!(session.capture(key(0.2, Action::Press, 'b')), None);
        assert_eq!(session.event_count(), 2);
    }

    #[test]
    fn start_and_stop_are_guarded() {
        let (session, _) = session();
        assert_eq!(session.stop_recording(), Err(SessionError::NotRecording));

        record(&session, &[key(0.0, Action::Press, 'a')]);
        assert_eq!(session.stop_recording(), Err(SessionError::NotRecording));
        assert_eq!(session.event_count(), 1);

        session.start_recording().unwrap();
        session.capture(key(1.0, Action::Press, 'b'));
        assert_eq!(
            session.start_recording(),
            Err(SessionError::AlreadyRecording)
        );
        assert_eq!(session.event_count(), 1);
        assert_eq!(session.recording().events()[0].timestamp, 1.0);
    }

    #[test]
    fn empty_recording_is_not_played_or_saved() {
        let (session, host) = session();
        assert_eq!(session.play().err(), Some(SessionError::NothingToPlay));
        assert!(host.keys().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        assert!(matches!(
            session.save(&path),
            Err(FileError::State(SessionError::NothingToSave))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn play_while_recording_is_refused() {
        let (session, _) = session();
        record(&session, &[key(0.0, Action::Press, 'a')]);
        session.start_recording().unwrap();
        session.capture(key(0.0, Action::Press, 'a'));
        assert_eq!(
            session.play().err(),
            Some(SessionError::Busy(Status::Recording))
        );
    }

    #[test]
    fn playback_returns_to_idle() {
        let (session, host) = session();
        let (tx, rx) = smol::channel::unbounded();
        session.set_notifier(tx);
        record(
            &session,
            &[key(0.0, Action::Press, 'a'), key(0.05, Action::Release, 'a')],
        );

        let done = session.play().unwrap();
        assert_eq!(session.play().err(), Some(SessionError::AlreadyPlaying));
        assert_eq!(
            session.start_recording(),
            Err(SessionError::Busy(Status::Playing))
        );

        let outcome = done.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(outcome, PlaybackOutcome::Completed { passes: 1 });
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(
            host.keys(),
            [
                (Action::Press, rdev::Key::KeyA),
                (Action::Release, rdev::Key::KeyA)
            ]
        );

        let statuses: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|notification| match notification {
                Notification::StatusChanged(status) => Some(status),
                Notification::PlaybackFinished(_) => None,
            })
            .collect();
        assert_eq!(
            statuses,
            [Status::Recording, Status::Idle, Status::Playing, Status::Idle]
        );
    }

    #[test]
    fn cancelled_loop_returns_to_idle() {
        let (session, _) = session();
        session.set_loop(true);
        record(
            &session,
            &[key(0.0, Action::Press, 'a'), key(0.02, Action::Release, 'a')],
        );
        assert_eq!(session.cancel_playback(), Err(SessionError::NotPlaying));

        let done = session.play().unwrap();
        std::thread::sleep(Duration::from_millis(50));
        session.cancel_playback().unwrap();

        let outcome = done.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(outcome, PlaybackOutcome::Cancelled { .. }));
        assert_eq!(session.status(), Status::Idle);

        // The cancel flag does not leak into the next run.
        session.set_loop(false);
        let done = session.play().unwrap();
        assert_eq!(
            done.recv_timeout(Duration::from_secs(2)).unwrap(),
            PlaybackOutcome::Completed { passes: 1 }
        );
    }

    fn assert_recovers_from_failure(session: &Session) {
        record(
            session,
            &[key(0.0, Action::Press, 'a'), key(0.01, Action::Release, 'a')],
        );

        let done = session.play().unwrap();
        let outcome = done.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(outcome, PlaybackOutcome::Failed(_)), "{outcome:?}");
        assert_eq!(session.status(), Status::Idle);
        assert!(!session.control.cancel_requested());

        let done = session.play().unwrap();
        assert_eq!(
            done.recv_timeout(Duration::from_secs(2)).unwrap(),
            PlaybackOutcome::Completed { passes: 1 }
        );
        assert_eq!(session.status(), Status::Idle);
    }

    #[test]
    fn host_error_returns_to_idle() {
        let (session, _) = session_with(RecordingHost {
            fail_on: Some(1),
            ..Default::default()
        });
        assert_recovers_from_failure(&session);
    }

    #[test]
    fn host_panic_returns_to_idle() {
        let (session, _) = session_with(RecordingHost {
            on_emit: Some(Box::new(|count: usize| {
                if count == 1 {
                    panic!("keyboard went away");
                }
            })),
            ..Default::default()
        });
        assert_recovers_from_failure(&session);
    }

    #[test]
    fn cancel_right_after_idle_reaches_next_run() {
        let (session, _) = session();
        record(
            &session,
            &[key(0.0, Action::Press, 'a'), key(0.05, Action::Release, 'a')],
        );

        for _ in 0..20 {
            let _first = session.play().unwrap();
            while session.status() == Status::Playing {
                std::thread::yield_now();
            }

            let done = session.play().unwrap();
            session.cancel_playback().unwrap();
            assert_eq!(
                done.recv_timeout(Duration::from_secs(2)).unwrap(),
                PlaybackOutcome::Cancelled { passes: 0 }
            );
        }
    }

    #[test]
    fn save_then_load_replaces_recording() {
        let (session, _) = session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");
        record(
            &session,
            &[key(3.0, Action::Press, 'q'), key(3.5, Action::Release, 'q')],
        );
        let saved = session.recording();
        assert_eq!(session.save(&path).unwrap(), 2);

        record(&session, &[key(9.0, Action::Press, 'z')]);
        assert_eq!(session.load(&path).unwrap(), 2);
        assert_eq!(session.recording(), saved);
    }

    #[test]
    fn malformed_load_keeps_recording() {
        let (session, _) = session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"[1, 2, 3]"#).unwrap();
        record(&session, &[key(1.0, Action::Press, 'k')]);
        let before = session.recording();

        assert!(matches!(
            session.load(&path),
            Err(FileError::Persist(PersistError::Parse { .. }))
        ));
        assert_eq!(session.recording(), before);
    }

    #[test]
    fn load_while_recording_is_refused() {
        let (session, _) = session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");
        fs::write(&path, r#"[[0.0, "press", "a"]]"#).unwrap();

        session.start_recording().unwrap();
        assert!(matches!(
            session.load(&path),
            Err(FileError::State(SessionError::Busy(Status::Recording)))
        ));
    }

    #[test]
    fn loop_flag_toggles() {
        let (session, _) = session();
        assert!(!session.loop_enabled());
        assert!(session.toggle_loop());
        assert!(session.loop_enabled());
    }

    #[test]
    fn captured_timestamps_follow_hook_time() {
        let (session, _) = session();
        let now = SystemTime::now();
        session.start_recording().unwrap();
        session.capture(ObservedKey::new(now, Action::Press, KeyToken::Character('x')));
        let events = session.recording();
        assert_eq!(
            events.events()[0].timestamp,
            crate::recording::timestamp_of(now)
        );
    }
}
