use std::time::SystemTime;

use log::trace;

use crate::{
    codec::KeyToken,
    recording::{Action, KeyEvent, Recording, timestamp_of},
};

/// A key notification delivered by the global hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedKey {
    pub time: SystemTime,
    pub action: Action,
    pub token: KeyToken,
}

impl ObservedKey {
    pub fn new(time: SystemTime, action: Action, token: KeyToken) -> Self {
        Self {
            time,
            action,
            token,
        }
    }

    /// Translates a hook event, `None` for mouse events and keys with no identity.
    pub fn from_rdev(event: &rdev::Event) -> Option<Self> {
        Self::from_event_type(event.time, &event.event_type)
    }

    fn from_event_type(time: SystemTime, event_type: &rdev::EventType) -> Option<Self> {
        let (action, key) = match *event_type {
            rdev::EventType::KeyPress(key) => (Action::Press, key),
            rdev::EventType::KeyRelease(key) => (Action::Release, key),
            _ => return None,
        };
        let Some(token) = KeyToken::from_rdev(key) else {
            trace!("Hook: ignoring {key:?}, no key identity");
            return None;
        };
        Some(Self::new(time, action, token))
    }

    pub fn to_event(self) -> KeyEvent {
        KeyEvent::new(timestamp_of(self.time), self.action, self.token)
    }
}

/// Appends observed keys to the recording while a capture is running.
#[derive(Debug, Default)]
pub struct Capturer {
    recording: Recording,
}

impl Capturer {
    pub fn begin(&mut self) {
        self.recording.clear();
    }

    pub fn observe(&mut self, observed: ObservedKey) -> usize {
        self.recording.push(observed.to_event());
        self.recording.len()
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn replace(&mut self, recording: Recording) {
        self.recording = recording;
    }
}
