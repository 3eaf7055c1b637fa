//! Replays a recording with its original inter-event timing.
//!
//! Cancellation is cooperative: the flag is looked at between events and
//! between passes, never in the middle of a sleep. Flags are read with
//! relaxed ordering, a toggle from the window is seen eventually.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error, info, warn};

use crate::{
    error::HostError,
    host::{KeyboardHost, describe},
    recording::KeyEvent,
};

pub const DEFAULT_LOOP_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct PlaybackControl {
    loop_enabled: AtomicBool,
    cancel_requested: AtomicBool,
}

impl PlaybackControl {
    pub fn new(loop_enabled: bool) -> Self {
        Self {
            loop_enabled: AtomicBool::new(loop_enabled),
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled.load(Ordering::Relaxed)
    }

    pub fn set_loop_enabled(&self, enabled: bool) {
        self.loop_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Flips the loop flag and returns the new value.
    pub fn toggle_loop(&self) -> bool {
        !self.loop_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::Relaxed);
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Relaxed)
    }

    pub fn reset_cancel(&self) {
        self.cancel_requested.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed { passes: usize },
    Cancelled { passes: usize },
    Failed(HostError),
}

enum Pass {
    Finished,
    Cancelled,
}

pub struct Player {
    control: Arc<PlaybackControl>,
    host: Arc<dyn KeyboardHost>,
    loop_pause: Duration,
}

impl Player {
    pub fn new(
        control: Arc<PlaybackControl>,
        host: Arc<dyn KeyboardHost>,
        loop_pause: Duration,
    ) -> Self {
        Self {
            control,
            host,
            loop_pause,
        }
    }

    /// Plays passes until the loop flag is off or a cancel is observed.
    pub fn run(&self, events: &[KeyEvent]) -> PlaybackOutcome {
        if events.is_empty() {
            return PlaybackOutcome::Completed { passes: 0 };
        }

        let mut passes = 0;
        loop {
            match self.play_pass(events) {
                Ok(Pass::Finished) => passes += 1,
                Ok(Pass::Cancelled) => return PlaybackOutcome::Cancelled { passes },
                Err(e) => return PlaybackOutcome::Failed(e),
            }
            debug!("Player: pass {passes} done");

            if self.control.cancel_requested() {
                return PlaybackOutcome::Cancelled { passes };
            }
            if !self.control.loop_enabled() {
                return PlaybackOutcome::Completed { passes };
            }

            thread::sleep(self.loop_pause);

            if self.control.cancel_requested() {
                return PlaybackOutcome::Cancelled { passes };
            }
            if !self.control.loop_enabled() {
                return PlaybackOutcome::Completed { passes };
            }
        }
    }

    fn play_pass(&self, events: &[KeyEvent]) -> Result<Pass, HostError> {
        let Some(first) = events.first() else {
            return Ok(Pass::Finished);
        };
        let mut base_time = first.timestamp;

        for (index, event) in events.iter().enumerate() {
            if self.control.cancel_requested() {
                return Ok(Pass::Cancelled);
            }

            let delay = event.timestamp - base_time;
            if delay > 0.0 {
                match Duration::try_from_secs_f64(delay) {
                    Ok(delay) => thread::sleep(delay),
                    Err(e) => warn!("Player: not sleeping {delay}s before event {index}: {e}"),
                }
            }
            base_time = event.timestamp;

            if self.control.cancel_requested() {
                return Ok(Pass::Cancelled);
            }

            let key = event
                .key
                .resolve()
                .and_then(|token| token.to_rdev().map(|key| (token, key)));
            match key {
                Ok((token, key)) => {
                    debug!("Player: {} (event {index})", describe(event.action, &token));
                    self.host.emit(event.action, key)?;
                }
                Err(e) => {
                    warn!("Player: skipping event {index}: {e}");
                }
            }
        }

        Ok(Pass::Finished)
    }

    /// Runs playback on its own thread. `on_finish` is called exactly once
    /// when the run ends, including when the host panics.
    pub fn spawn<F>(self, events: Arc<[KeyEvent]>, on_finish: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnOnce(PlaybackOutcome) + Send + 'static,
    {
        thread::Builder::new()
            .name("playback".into())
            .spawn(move || {
                let mut guard = FinishGuard {
                    outcome: None,
                    on_finish: Some(on_finish),
                };
                info!("Player: playing {} events", events.len());
                let outcome = self.run(&events);
                info!("Player: playback ended with {outcome:?}");
                guard.outcome = Some(outcome);
            })
    }
}

struct FinishGuard<F: FnOnce(PlaybackOutcome)> {
    outcome: Option<PlaybackOutcome>,
    on_finish: Option<F>,
}

impl<F: FnOnce(PlaybackOutcome)> Drop for FinishGuard<F> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| {
            error!("Player: playback thread panicked");
            PlaybackOutcome::Failed(HostError::Simulate("playback aborted".into()))
        });
        if let Some(on_finish) = self.on_finish.take() {
            on_finish(outcome);
        }
    }
}
