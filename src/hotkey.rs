//! Global shortcuts written as `<ctrl>+<shift>+s`.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    capture::ObservedKey,
    codec::{KeyToken, NamedKey},
    error::ConfigError,
    recording::Action,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    StartRecording,
    StopRecording,
    Play,
    Save,
    Load,
    ToggleLoop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub cmd: bool,
}

impl Modifiers {
    fn slot(&mut self, key: NamedKey) -> Option<&mut bool> {
        if key.is_ctrl() {
            Some(&mut self.ctrl)
        } else if key.is_shift() {
            Some(&mut self.shift)
        } else if key.is_alt() {
            Some(&mut self.alt)
        } else if key.is_cmd() {
            Some(&mut self.cmd)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: KeyToken,
}

impl Hotkey {
    pub fn parse(combo: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidHotkey(combo.to_owned());
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in combo.split('+') {
            let token = match part.strip_prefix('<').and_then(|p| p.strip_suffix('>')) {
                Some(name) => KeyToken::Named(NamedKey::from_name(name).ok_or_else(invalid)?),
                None => part
                    .chars()
                    .exactly_one()
                    .map(|c| KeyToken::Character(c.to_ascii_lowercase()))
                    .map_err(|_| invalid())?,
            };
            match token {
                KeyToken::Named(named) if named.is_modifier() => {
                    let slot = modifiers.slot(named).ok_or_else(invalid)?;
                    *slot = true;
                }
                _ if key.is_some() => return Err(invalid()),
                _ => key = Some(token),
            }
        }

        Ok(Self {
            modifiers,
            key: key.ok_or_else(invalid)?,
        })
    }
}

impl FromStr for Hotkey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Modifiers {
            ctrl,
            shift,
            alt,
            cmd,
        } = self.modifiers;
        let modifiers = [(ctrl, "<ctrl>"), (shift, "<shift>"), (alt, "<alt>"), (cmd, "<cmd>")]
            .into_iter()
            .filter(|(held, _)| *held)
            .map(|(_, name)| name.to_owned());
        let key = match self.key {
            KeyToken::Named(named) => format!("<{}>", named.name()),
            other => other.to_string(),
        };
        write!(f, "{}", modifiers.chain([key]).join("+"))
    }
}

impl Hotkey {
    /// Label shown next to a button, e.g. `Ctrl+Shift+S`.
    pub fn label(&self) -> String {
        let Modifiers {
            ctrl,
            shift,
            alt,
            cmd,
        } = self.modifiers;
        let key = match self.key {
            KeyToken::Character(c) => c.to_ascii_uppercase().to_string(),
            KeyToken::Named(named) => named.name().to_owned(),
            other => other.to_string(),
        };
        [(ctrl, "Ctrl"), (shift, "Shift"), (alt, "Alt"), (cmd, "Cmd")]
            .into_iter()
            .filter(|(held, _)| *held)
            .map(|(_, name)| name.to_owned())
            .chain([key])
            .join("+")
    }
}

/// Combos as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBindings {
    pub start_recording: String,
    pub stop_recording: String,
    pub play: String,
    pub save: String,
    pub load: String,
    pub toggle_loop: String,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start_recording: "<ctrl>+r".into(),
            stop_recording: "<ctrl>+s".into(),
            play: "<ctrl>+p".into(),
            save: "<ctrl>+<shift>+s".into(),
            load: "<ctrl>+o".into(),
            toggle_loop: "<ctrl>+l".into(),
        }
    }
}

impl HotkeyBindings {
    pub fn parse(&self) -> Result<Vec<(Hotkey, HotkeyAction)>, ConfigError> {
        [
            (&self.start_recording, HotkeyAction::StartRecording),
            (&self.stop_recording, HotkeyAction::StopRecording),
            (&self.play, HotkeyAction::Play),
            (&self.save, HotkeyAction::Save),
            (&self.load, HotkeyAction::Load),
            (&self.toggle_loop, HotkeyAction::ToggleLoop),
        ]
        .into_iter()
        .map(|(combo, action)| Ok((Hotkey::parse(combo)?, action)))
        .collect()
    }
}

/// Follows held modifiers on the global key stream and reports bound combos.
#[derive(Debug, Clone)]
pub struct HotkeyMatcher {
    bindings: Vec<(Hotkey, HotkeyAction)>,
    held: Modifiers,
}

impl HotkeyMatcher {
    pub fn new(bindings: Vec<(Hotkey, HotkeyAction)>) -> Self {
        Self {
            bindings,
            held: Modifiers::default(),
        }
    }

    pub fn bindings(&self) -> &[(Hotkey, HotkeyAction)] {
        &self.bindings
    }

    pub fn hotkey_for(&self, action: HotkeyAction) -> Option<&Hotkey> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == action)
            .map(|(hotkey, _)| hotkey)
    }

    pub fn observe(&mut self, observed: &ObservedKey) -> Option<HotkeyAction> {
        if let KeyToken::Named(named) = observed.token {
            if let Some(slot) = self.held.slot(named) {
                *slot = observed.action == Action::Press;
                return None;
            }
        }
        if observed.action != Action::Press {
            return None;
        }
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.key == observed.token && hotkey.modifiers == self.held)
            .map(|(_, action)| *action)
    }
}
