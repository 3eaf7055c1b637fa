use std::path::PathBuf;

use thiserror::Error;

use crate::session::Status;

/// Operation rejected because of the session's current state. Never changes state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Already recording!")]
    AlreadyRecording,
    #[error("Not currently recording!")]
    NotRecording,
    #[error("No keys recorded!")]
    NothingToPlay,
    #[error("Playback already in progress!")]
    AlreadyPlaying,
    #[error("No playback in progress!")]
    NotPlaying,
    #[error("No keys recorded to save!")]
    NothingToSave,
    #[error("Cannot do that while {0}")]
    Busy(Status),
    #[error("Could not start playback: {0}")]
    Spawn(String),
}

/// Failure of a save or load request.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    State(#[from] SessionError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown named key tag \"{0}\"")]
    UnknownNamedKey(String),
    #[error("\"{0}\" is neither a named key tag nor a single character")]
    NotACharacter(String),
    #[error("no key produces the character {0:?}")]
    Unsynthesizable(char),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid recording: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("could not simulate {0}")]
    Simulate(String),
    #[error("could not install keyboard hook: {0}")]
    Listen(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid hotkey \"{0}\"")]
    InvalidHotkey(String),
}
