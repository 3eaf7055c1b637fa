//! Key identity and its textual form.
//!
//! A key is either a printable character, a symbolic key from a fixed
//! vocabulary, or a raw platform code the host could not name. The textual
//! form is `"a"`, `"Key.shift_r"` or `"<65>"`.

use std::fmt::Display;

use rdev::Key;

use crate::error::DecodeError;

const NAMED_KEY_PREFIX: &str = "Key.";

macro_rules! named_keys {
    ($($variant:ident => $name:literal => $rdev:ident,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NamedKey {
            $($variant,)*
        }

        impl NamedKey {
            #[cfg(test)]
            pub const ALL: &'static [NamedKey] = &[$(NamedKey::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NamedKey::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(NamedKey::$variant),)*
                    _ => None,
                }
            }

            /// Key to synthesize when replaying this symbolic key.
            pub fn to_rdev(self) -> Key {
                match self {
                    $(NamedKey::$variant => Key::$rdev,)*
                }
            }
        }
    };
}

named_keys! {
    Alt => "alt" => Alt,
    AltL => "alt_l" => Alt,
    AltR => "alt_r" => AltGr,
    AltGr => "alt_gr" => AltGr,
    Backspace => "backspace" => Backspace,
    CapsLock => "caps_lock" => CapsLock,
    Cmd => "cmd" => MetaLeft,
    CmdL => "cmd_l" => MetaLeft,
    CmdR => "cmd_r" => MetaRight,
    Ctrl => "ctrl" => ControlLeft,
    CtrlL => "ctrl_l" => ControlLeft,
    CtrlR => "ctrl_r" => ControlRight,
    Delete => "delete" => Delete,
    Down => "down" => DownArrow,
    End => "end" => End,
    Enter => "enter" => Return,
    Esc => "esc" => Escape,
    F1 => "f1" => F1,
    F2 => "f2" => F2,
    F3 => "f3" => F3,
    F4 => "f4" => F4,
    F5 => "f5" => F5,
    F6 => "f6" => F6,
    F7 => "f7" => F7,
    F8 => "f8" => F8,
    F9 => "f9" => F9,
    F10 => "f10" => F10,
    F11 => "f11" => F11,
    F12 => "f12" => F12,
    Home => "home" => Home,
    Insert => "insert" => Insert,
    Left => "left" => LeftArrow,
    NumLock => "num_lock" => NumLock,
    PageDown => "page_down" => PageDown,
    PageUp => "page_up" => PageUp,
    Pause => "pause" => Pause,
    PrintScreen => "print_screen" => PrintScreen,
    Right => "right" => RightArrow,
    ScrollLock => "scroll_lock" => ScrollLock,
    Shift => "shift" => ShiftLeft,
    ShiftL => "shift_l" => ShiftLeft,
    ShiftR => "shift_r" => ShiftRight,
    Space => "space" => Space,
    Tab => "tab" => Tab,
    Up => "up" => UpArrow,
    Function => "fn" => Function,
}

impl NamedKey {
    fn from_rdev(key: Key) -> Option<Self> {
        let named = match key {
            Key::Alt => NamedKey::Alt,
            Key::AltGr => NamedKey::AltGr,
            Key::Backspace => NamedKey::Backspace,
            Key::CapsLock => NamedKey::CapsLock,
            Key::MetaLeft => NamedKey::Cmd,
            Key::MetaRight => NamedKey::CmdR,
            Key::ControlLeft => NamedKey::CtrlL,
            Key::ControlRight => NamedKey::CtrlR,
            Key::Delete | Key::KpDelete => NamedKey::Delete,
            Key::DownArrow => NamedKey::Down,
            Key::End => NamedKey::End,
            Key::Return | Key::KpReturn => NamedKey::Enter,
            Key::Escape => NamedKey::Esc,
            Key::F1 => NamedKey::F1,
            Key::F2 => NamedKey::F2,
            Key::F3 => NamedKey::F3,
            Key::F4 => NamedKey::F4,
            Key::F5 => NamedKey::F5,
            Key::F6 => NamedKey::F6,
            Key::F7 => NamedKey::F7,
            Key::F8 => NamedKey::F8,
            Key::F9 => NamedKey::F9,
            Key::F10 => NamedKey::F10,
            Key::F11 => NamedKey::F11,
            Key::F12 => NamedKey::F12,
            Key::Home => NamedKey::Home,
            Key::Insert => NamedKey::Insert,
            Key::LeftArrow => NamedKey::Left,
            Key::NumLock => NamedKey::NumLock,
            Key::PageDown => NamedKey::PageDown,
            Key::PageUp => NamedKey::PageUp,
            Key::Pause => NamedKey::Pause,
            Key::PrintScreen => NamedKey::PrintScreen,
            Key::RightArrow => NamedKey::Right,
            Key::ScrollLock => NamedKey::ScrollLock,
            Key::ShiftLeft => NamedKey::Shift,
            Key::ShiftRight => NamedKey::ShiftR,
            Key::Space => NamedKey::Space,
            Key::Tab => NamedKey::Tab,
            Key::UpArrow => NamedKey::Up,
            Key::Function => NamedKey::Function,
            _ => return None,
        };
        Some(named)
    }

    pub fn is_ctrl(self) -> bool {
        matches!(self, NamedKey::Ctrl | NamedKey::CtrlL | NamedKey::CtrlR)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, NamedKey::Shift | NamedKey::ShiftL | NamedKey::ShiftR)
    }

    pub fn is_alt(self) -> bool {
        matches!(
            self,
            NamedKey::Alt | NamedKey::AltL | NamedKey::AltR | NamedKey::AltGr
        )
    }

    pub fn is_cmd(self) -> bool {
        matches!(self, NamedKey::Cmd | NamedKey::CmdL | NamedKey::CmdR)
    }

    pub fn is_modifier(self) -> bool {
        self.is_ctrl() || self.is_shift() || self.is_alt() || self.is_cmd()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Character(char),
    Named(NamedKey),
    /// Platform scan code of a key the host has no name for.
    Code(u32),
}

impl KeyToken {
    /// Identity of a key reported by the global hook.
    ///
    /// Characters are the unshifted US-layout character of the physical key;
    /// modifiers are captured as their own events so replaying the base key
    /// reproduces the shifted character. The layout the user types with is
    /// not consulted, so on a non-US layout the stored character can differ
    /// from the one typed (AZERTY `a` is stored as `q`).
    pub fn from_rdev(key: Key) -> Option<Self> {
        if let Some(named) = NamedKey::from_rdev(key) {
            return Some(KeyToken::Named(named));
        }
        if let Some(character) = base_character(key) {
            return Some(KeyToken::Character(character));
        }
        match key {
            Key::Unknown(code) => Some(KeyToken::Code(code)),
            _ => None,
        }
    }

    pub fn to_rdev(&self) -> Result<Key, DecodeError> {
        match self {
            KeyToken::Character(character) => {
                key_for_character(*character).ok_or(DecodeError::Unsynthesizable(*character))
            }
            KeyToken::Named(named) => Ok(named.to_rdev()),
            KeyToken::Code(code) => Ok(Key::Unknown(*code)),
        }
    }
}

impl Display for KeyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(self))
    }
}

pub fn encode(token: &KeyToken) -> String {
    match token {
        KeyToken::Character(character) => character.to_string(),
        KeyToken::Named(named) => format!("{NAMED_KEY_PREFIX}{}", named.name()),
        KeyToken::Code(code) => format!("<{code}>"),
    }
}

pub fn decode(encoded: &str) -> Result<KeyToken, DecodeError> {
    if let Some(name) = encoded.strip_prefix(NAMED_KEY_PREFIX) {
        return NamedKey::from_name(name)
            .map(KeyToken::Named)
            .ok_or_else(|| DecodeError::UnknownNamedKey(encoded.to_owned()));
    }

    if let Some(code) = encoded
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    {
        return code
            .parse()
            .map(KeyToken::Code)
            .map_err(|_| DecodeError::NotACharacter(encoded.to_owned()));
    }

    let mut chars = encoded.chars();
    match (chars.next(), chars.next()) {
        (Some(character), None) => Ok(KeyToken::Character(character)),
        _ => Err(DecodeError::NotACharacter(encoded.to_owned())),
    }
}

/// (physical key, unshifted character, shifted character)
const CHARACTER_KEYS: &[(Key, char, char)] = &[
    (Key::KeyA, 'a', 'A'),
    (Key::KeyB, 'b', 'B'),
    (Key::KeyC, 'c', 'C'),
    (Key::KeyD, 'd', 'D'),
    (Key::KeyE, 'e', 'E'),
    (Key::KeyF, 'f', 'F'),
    (Key::KeyG, 'g', 'G'),
    (Key::KeyH, 'h', 'H'),
    (Key::KeyI, 'i', 'I'),
    (Key::KeyJ, 'j', 'J'),
    (Key::KeyK, 'k', 'K'),
    (Key::KeyL, 'l', 'L'),
    (Key::KeyM, 'm', 'M'),
    (Key::KeyN, 'n', 'N'),
    (Key::KeyO, 'o', 'O'),
    (Key::KeyP, 'p', 'P'),
    (Key::KeyQ, 'q', 'Q'),
    (Key::KeyR, 'r', 'R'),
    (Key::KeyS, 's', 'S'),
    (Key::KeyT, 't', 'T'),
    (Key::KeyU, 'u', 'U'),
    (Key::KeyV, 'v', 'V'),
    (Key::KeyW, 'w', 'W'),
    (Key::KeyX, 'x', 'X'),
    (Key::KeyY, 'y', 'Y'),
    (Key::KeyZ, 'z', 'Z'),
    (Key::Num1, '1', '!'),
    (Key::Num2, '2', '@'),
    (Key::Num3, '3', '#'),
    (Key::Num4, '4', '$'),
    (Key::Num5, '5', '%'),
    (Key::Num6, '6', '^'),
    (Key::Num7, '7', '&'),
    (Key::Num8, '8', '*'),
    (Key::Num9, '9', '('),
    (Key::Num0, '0', ')'),
    (Key::BackQuote, '`', '~'),
    (Key::Minus, '-', '_'),
    (Key::Equal, '=', '+'),
    (Key::LeftBracket, '[', '{'),
    (Key::RightBracket, ']', '}'),
    (Key::SemiColon, ';', ':'),
    (Key::Quote, '\'', '"'),
    (Key::BackSlash, '\\', '|'),
    (Key::Comma, ',', '<'),
    (Key::Dot, '.', '>'),
    (Key::Slash, '/', '?'),
];

const KEYPAD_KEYS: &[(Key, char)] = &[
    (Key::Kp0, '0'),
    (Key::Kp1, '1'),
    (Key::Kp2, '2'),
    (Key::Kp3, '3'),
    (Key::Kp4, '4'),
    (Key::Kp5, '5'),
    (Key::Kp6, '6'),
    (Key::Kp7, '7'),
    (Key::Kp8, '8'),
    (Key::Kp9, '9'),
    (Key::KpMinus, '-'),
    (Key::KpPlus, '+'),
    (Key::KpMultiply, '*'),
    (Key::KpDivide, '/'),
    (Key::IntlBackslash, '\\'),
];

fn base_character(key: Key) -> Option<char> {
    CHARACTER_KEYS
        .iter()
        .find(|(candidate, ..)| *candidate == key)
        .map(|(_, base, _)| *base)
        .or_else(|| {
            KEYPAD_KEYS
                .iter()
                .find(|(candidate, _)| *candidate == key)
                .map(|(_, character)| *character)
        })
}

fn key_for_character(character: char) -> Option<Key> {
    if character == ' ' {
        return Some(Key::Space);
    }
    CHARACTER_KEYS
        .iter()
        .find(|(_, base, shifted)| *base == character || *shifted == character)
        .map(|(key, ..)| *key)
}
