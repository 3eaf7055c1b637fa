use log::trace;
use rdev::EventType;

use crate::{codec::KeyToken, error::HostError, recording::Action};

/// Synthetic keyboard input issued during playback.
pub trait KeyboardHost: Send + Sync {
    fn emit(&self, action: Action, key: rdev::Key) -> Result<(), HostError>;
}

/// Issues input through the OS with `rdev::simulate`.
#[derive(Debug, Default)]
pub struct RdevHost;

impl KeyboardHost for RdevHost {
    fn emit(&self, action: Action, key: rdev::Key) -> Result<(), HostError> {
        let event_type = match action {
            Action::Press => EventType::KeyPress(key),
            Action::Release => EventType::KeyRelease(key),
        };
        trace!("Host: simulating {event_type:?}");
        rdev::simulate(&event_type).map_err(|_| HostError::Simulate(format!("{event_type:?}")))
    }
}

/// Display helper for log lines mixing tokens and actions.
pub fn describe(action: Action, token: &KeyToken) -> String {
    match action {
        Action::Press => format!("Press {token}"),
        Action::Release => format!("Release {token}"),
    }
}
