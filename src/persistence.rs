//! Recordings on disk: a JSON array of `[timestamp, "press"|"release", key]`.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError,
    recording::{Action, KeyEvent, Recording, StoredKey},
};

#[derive(Serialize, Deserialize)]
struct StoredEvent(f64, Action, String);

impl From<&KeyEvent> for StoredEvent {
    fn from(event: &KeyEvent) -> Self {
        StoredEvent(event.timestamp, event.action, event.key.encoded())
    }
}

impl From<StoredEvent> for KeyEvent {
    fn from(StoredEvent(timestamp, action, key): StoredEvent) -> Self {
        KeyEvent::new(timestamp, action, StoredKey::Encoded(key))
    }
}

pub fn save(recording: &Recording, path: &Path) -> Result<(), PersistError> {
    let io_error = |source| PersistError::Io {
        path: path.to_owned(),
        source,
    };

    let stored: Vec<StoredEvent> = recording.events().iter().map(StoredEvent::from).collect();
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer(&mut writer, &stored).map_err(|e| io_error(e.into()))?;
    writer.flush().map_err(io_error)?;

    info!("Saved {} events to {}", recording.len(), path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Recording, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.to_owned(),
        source,
    })?;
    let stored: Vec<StoredEvent> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                PersistError::Io {
                    path: path.to_owned(),
                    source: source.into(),
                }
            } else {
                PersistError::Parse {
                    path: path.to_owned(),
                    source,
                }
            }
        })?;

    info!("Loaded {} events from {}", stored.len(), path.display());
    Ok(stored.into_iter().map(KeyEvent::from).collect::<Vec<_>>().into())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::codec::{KeyToken, NamedKey};

    fn sample() -> Recording {
        vec![
            KeyEvent::new(10.0, Action::Press, KeyToken::Named(NamedKey::ShiftR)),
            KeyEvent::new(10.125, Action::Press, KeyToken::Character('a')),
            KeyEvent::new(10.25, Action::Release, KeyToken::Character('a')),
            KeyEvent::new(10.5, Action::Release, KeyToken::Named(NamedKey::ShiftR)),
            KeyEvent::new(11.0, Action::Press, KeyToken::Code(65)),
        ]
        .into()
    }

    #[test]
    fn save_then_load_keeps_every_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");
        let recording = sample();

        save(&recording, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, recording);
        assert!(
            loaded
                .events()
                .iter()
                .all(|event| matches!(event.key, StoredKey::Encoded(_)))
        );
    }

    #[test]
    fn file_is_an_array_of_triples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");

        save(&sample(), &path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value[0], serde_json::json!([10.0, "press", "Key.shift_r"]));
        assert_eq!(value[2], serde_json::json!([10.25, "release", "a"]));
        assert_eq!(value[4], serde_json::json!([11.0, "press", "<65>"]));
    }

    #[test]
    fn reads_hand_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"[[1700000000.5, "press", "Key.ctrl_l"], [1700000000.625, "release", "v"]]"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.events()[0].key.resolve(),
            Ok(KeyToken::Named(NamedKey::CtrlL))
        );
        assert_eq!(loaded.events()[1].action, Action::Release);
    }

    #[test]
    fn wrong_shapes_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in [
            ("garbage", "not json"),
            ("object", r#"{"events": []}"#),
            ("pairs", r#"[[1.0, "press"]]"#),
            ("quads", r#"[[1.0, "press", "a", 4]]"#),
            ("action", r#"[[1.0, "tap", "a"]]"#),
            ("timestamp", r#"[["now", "press", "a"]]"#),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, contents).unwrap();
            assert!(
                matches!(load(&path), Err(PersistError::Parse { .. })),
                "{name} should not parse"
            );
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("absent.json")),
            Err(PersistError::Io { .. })
        ));
    }
}
