use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use thiserror::Error;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("key name must not be empty")]
    Empty,
    #[error("unknown key name '{name}'")]
    Unknown { name: String },
}

macro_rules! define_keys {
    ($($variant:ident => $name:literal, $code:ident;)*) => {
        /// Physical key identifier, independent of any windowing backend.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $($variant,)*
        }

        impl Key {
            pub const ALL: &[Key] = &[$(Key::$variant,)*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name,)*
                }
            }

            pub fn from_key_code(code: KeyCode) -> Option<Key> {
                match code {
                    $(KeyCode::$code => Some(Key::$variant),)*
                    _ => None,
                }
            }

            pub const fn key_code(self) -> KeyCode {
                match self {
                    $(Key::$variant => KeyCode::$code,)*
                }
            }
        }
    };
}

define_keys! {
    A => "A", KeyA;
    B => "B", KeyB;
    C => "C", KeyC;
    D => "D", KeyD;
    E => "E", KeyE;
    F => "F", KeyF;
    G => "G", KeyG;
    H => "H", KeyH;
    I => "I", KeyI;
    J => "J", KeyJ;
    K => "K", KeyK;
    L => "L", KeyL;
    M => "M", KeyM;
    N => "N", KeyN;
    O => "O", KeyO;
    P => "P", KeyP;
    Q => "Q", KeyQ;
    R => "R", KeyR;
    S => "S", KeyS;
    T => "T", KeyT;
    U => "U", KeyU;
    V => "V", KeyV;
    W => "W", KeyW;
    X => "X", KeyX;
    Y => "Y", KeyY;
    Z => "Z", KeyZ;
    Digit0 => "0", Digit0;
    Digit1 => "1", Digit1;
    Digit2 => "2", Digit2;
    Digit3 => "3", Digit3;
    Digit4 => "4", Digit4;
    Digit5 => "5", Digit5;
    Digit6 => "6", Digit6;
    Digit7 => "7", Digit7;
    Digit8 => "8", Digit8;
    Digit9 => "9", Digit9;
    F1 => "F1", F1;
    F2 => "F2", F2;
    F3 => "F3", F3;
    F4 => "F4", F4;
    F5 => "F5", F5;
    F6 => "F6", F6;
    F7 => "F7", F7;
    F8 => "F8", F8;
    F9 => "F9", F9;
    F10 => "F10", F10;
    F11 => "F11", F11;
    F12 => "F12", F12;
    Up => "Up", ArrowUp;
    Down => "Down", ArrowDown;
    Left => "Left", ArrowLeft;
    Right => "Right", ArrowRight;
    Space => "Space", Space;
    Enter => "Enter", Enter;
    Escape => "Escape", Escape;
    Tab => "Tab", Tab;
    Backspace => "Backspace", Backspace;
    Delete => "Delete", Delete;
    Insert => "Insert", Insert;
    Home => "Home", Home;
    End => "End", End;
    PageUp => "PageUp", PageUp;
    PageDown => "PageDown", PageDown;
    Backquote => "Backquote", Backquote;
    Minus => "Minus", Minus;
    Equal => "Equal", Equal;
    LeftBracket => "LeftBracket", BracketLeft;
    RightBracket => "RightBracket", BracketRight;
    Backslash => "Backslash", Backslash;
    Semicolon => "Semicolon", Semicolon;
    Quote => "Quote", Quote;
    Comma => "Comma", Comma;
    Period => "Period", Period;
    Slash => "Slash", Slash;
    LeftShift => "LeftShift", ShiftLeft;
    RightShift => "RightShift", ShiftRight;
    LeftControl => "LeftControl", ControlLeft;
    RightControl => "RightControl", ControlRight;
    LeftAlt => "LeftAlt", AltLeft;
    RightAlt => "RightAlt", AltRight;
    LeftCommand => "LeftCommand", SuperLeft;
    RightCommand => "RightCommand", SuperRight;
}

impl Key {
    pub fn from_name(name: &str) -> Result<Key, KeyParseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KeyParseError::Empty);
        }
        Key::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| KeyParseError::Unknown {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_name(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Cmd,
}

impl Modifier {
    /// Display and canonical text order.
    pub const ALL: [Modifier; 4] = [
        Modifier::Ctrl,
        Modifier::Shift,
        Modifier::Alt,
        Modifier::Cmd,
    ];

    const fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => 1 << 0,
            Modifier::Shift => 1 << 1,
            Modifier::Alt => 1 << 2,
            Modifier::Cmd => 1 << 3,
        }
    }

    /// Left and right physical keys that hold this modifier.
    pub const fn keys(self) -> [Key; 2] {
        match self {
            Modifier::Ctrl => [Key::LeftControl, Key::RightControl],
            Modifier::Shift => [Key::LeftShift, Key::RightShift],
            Modifier::Alt => [Key::LeftAlt, Key::RightAlt],
            Modifier::Cmd => [Key::LeftCommand, Key::RightCommand],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::Cmd => "Cmd",
        }
    }

    pub fn from_name(name: &str) -> Option<Modifier> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "shift" => Some(Modifier::Shift),
            "alt" | "option" => Some(Modifier::Alt),
            "cmd" | "command" | "super" | "meta" | "win" => Some(Modifier::Cmd),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit-set over [`Modifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(Modifier::Ctrl.bit());
    pub const SHIFT: Modifiers = Modifiers(Modifier::Shift.bit());
    pub const ALT: Modifiers = Modifiers(Modifier::Alt.bit());
    pub const CMD: Modifiers = Modifiers(Modifier::Cmd.bit());

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub const fn with(self, modifier: Modifier) -> Modifiers {
        Modifiers(self.0 | modifier.bit())
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(move |modifier| self.contains(*modifier))
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        Modifiers(modifier.bit())
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOr<Modifier> for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifier) -> Modifiers {
        self.with(rhs)
    }
}

impl BitOr for Modifier {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifier) -> Modifiers {
        Modifiers::from(self).with(rhs)
    }
}
