use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, hotkey::HotkeyBindings, player::DEFAULT_LOOP_PAUSE};

/// Names the JSON settings file.
pub const CONFIG_ENV: &str = "KEYREPLAY_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub loop_pause_ms: u64,
    pub loop_enabled: bool,
    pub hotkeys: HotkeyBindings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loop_pause_ms: DEFAULT_LOOP_PAUSE.as_millis() as u64,
            loop_enabled: false,
            hotkeys: HotkeyBindings::default(),
        }
    }
}

impl Settings {
    pub fn loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_ms)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        settings.hotkeys.parse()?;
        Ok(settings)
    }

    /// Settings from the file named by `KEYREPLAY_CONFIG`, defaults otherwise.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(settings) => {
                info!("Settings loaded from {}", path.display());
                settings
            }
            Err(e) => {
                error!("{e}, using defaults");
                Self::default()
            }
        }
    }
}
