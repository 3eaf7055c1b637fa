use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, KeyToken},
    error::DecodeError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Press,
    Release,
}

/// Key of a recorded event.
///
/// Captured keys are kept as tokens. Keys read back from a file stay in
/// their textual form until playback resolves them, so a file with a key the
/// vocabulary does not know still loads.
#[derive(Debug, Clone)]
pub enum StoredKey {
    Token(KeyToken),
    Encoded(String),
}

impl StoredKey {
    pub fn resolve(&self) -> Result<KeyToken, DecodeError> {
        match self {
            StoredKey::Token(token) => Ok(*token),
            StoredKey::Encoded(encoded) => codec::decode(encoded),
        }
    }

    pub fn encoded(&self) -> String {
        match self {
            StoredKey::Token(token) => codec::encode(token),
            StoredKey::Encoded(encoded) => encoded.clone(),
        }
    }
}

impl PartialEq for StoredKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StoredKey::Token(a), StoredKey::Token(b)) => a == b,
            _ => self.encoded() == other.encoded(),
        }
    }
}

impl From<KeyToken> for StoredKey {
    fn from(token: KeyToken) -> Self {
        StoredKey::Token(token)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub action: Action,
    pub key: StoredKey,
}

impl KeyEvent {
    pub fn new(timestamp: f64, action: Action, key: impl Into<StoredKey>) -> Self {
        Self {
            timestamp,
            action,
            key: key.into(),
        }
    }
}

pub fn timestamp_of(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// Events of one capture session, in the order the hook delivered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    events: Vec<KeyEvent>,
}

impl Recording {
    pub fn push(&mut self, event: KeyEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    /// Immutable copy for a playback run.
    pub fn snapshot(&self) -> Arc<[KeyEvent]> {
        self.events.as_slice().into()
    }
}

impl From<Vec<KeyEvent>> for Recording {
    fn from(events: Vec<KeyEvent>) -> Self {
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::codec::NamedKey;

    #[test]
    fn loaded_and_captured_keys_compare_by_text() {
        let captured = StoredKey::Token(KeyToken::Named(NamedKey::Enter));
        let loaded = StoredKey::Encoded("Key.enter".into());
        assert_eq!(captured, loaded);
        assert_ne!(captured, StoredKey::Encoded("Key.esc".into()));
    }

    #[test]
    fn loaded_keys_resolve_lazily() {
        let key = StoredKey::Encoded("Key.nonsense".into());
        assert!(key.resolve().is_err());
        assert_eq!(key.encoded(), "Key.nonsense");
    }

    #[test]
    fn timestamps_are_seconds_since_epoch() {
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(timestamp_of(time), 1.5);
        assert_eq!(timestamp_of(UNIX_EPOCH - Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn snapshot_is_detached_from_later_capture() {
        let mut recording = Recording::default();
        recording.push(KeyEvent::new(0.0, Action::Press, KeyToken::Character('a')));
        let snapshot = recording.snapshot();
        recording.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(recording.is_empty());
    }
}
