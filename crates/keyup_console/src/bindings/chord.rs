use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{InputState, Key, KeyParseError, Modifier, Modifiers};

const CHORD_SEPARATOR: char = '+';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    #[error("chord must not be empty")]
    Empty,
    #[error("chord '{chord}' contains an empty segment")]
    EmptySegment { chord: String },
    #[error("chord '{chord}' repeats modifier {modifier}")]
    DuplicateModifier { chord: String, modifier: Modifier },
    #[error("chord '{chord}' has no key")]
    MissingKey { chord: String },
    #[error("chord '{chord}' names more than one key")]
    MultipleKeys { chord: String },
    #[error("chord '{chord}': {source}")]
    Key {
        chord: String,
        #[source]
        source: KeyParseError,
    },
}

/// A key plus the exact set of modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord {
    modifiers: Modifiers,
    key: Key,
}

impl Chord {
    pub const fn new(key: Key) -> Self {
        Self {
            modifiers: Modifiers::NONE,
            key,
        }
    }

    pub const fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { modifiers, key }
    }

    pub const fn with(self, modifier: Modifier) -> Self {
        Self {
            modifiers: self.modifiers.with(modifier),
            key: self.key,
        }
    }

    /// Exact-set match: modifiers outside the chord must not be held.
    pub fn modifiers_match<I: InputState + ?Sized>(&self, input: &I) -> bool {
        Modifier::ALL.into_iter().all(|modifier| {
            self.modifiers.contains(modifier) == input.is_modifier_held(modifier)
        })
    }

    pub fn released_in<I: InputState + ?Sized>(&self, input: &I) -> bool {
        input.released_this_tick(self.key) && self.modifiers_match(input)
    }
}

impl From<Key> for Chord {
    fn from(key: Key) -> Self {
        Chord::new(key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in self.modifiers.iter() {
            write!(f, "{modifier}{CHORD_SEPARATOR}")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key = None;
        for segment in raw.split(CHORD_SEPARATOR) {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(ChordParseError::EmptySegment {
                    chord: raw.to_string(),
                });
            }
            if let Some(modifier) = Modifier::from_name(segment) {
                if modifiers.contains(modifier) {
                    return Err(ChordParseError::DuplicateModifier {
                        chord: raw.to_string(),
                        modifier,
                    });
                }
                modifiers.insert(modifier);
                continue;
            }
            let parsed = Key::from_name(segment).map_err(|source| ChordParseError::Key {
                chord: raw.to_string(),
                source,
            })?;
            if key.replace(parsed).is_some() {
                return Err(ChordParseError::MultipleKeys {
                    chord: raw.to_string(),
                });
            }
        }

        let key = key.ok_or_else(|| ChordParseError::MissingKey {
            chord: raw.to_string(),
        })?;
        Ok(Chord::with_modifiers(key, modifiers))
    }
}

impl TryFrom<String> for Chord {
    type Error = ChordParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyboardState;

    #[test]
    fn display_uses_canonical_modifier_order() {
        let chord = Chord::new(Key::B)
            .with(Modifier::Shift)
            .with(Modifier::Ctrl);
        assert_eq!(chord.to_string(), "Ctrl+Shift+B");
        assert_eq!(Chord::new(Key::F5).to_string(), "F5");
    }

    #[test]
    fn parse_accepts_any_order_case_and_aliases() {
        let expected = Chord::with_modifiers(Key::B, Modifier::Ctrl | Modifier::Shift);
        for raw in ["Ctrl+Shift+B", "shift + control + b", "B+SHIFT+ctrl"] {
            assert_eq!(raw.parse::<Chord>(), Ok(expected), "raw={raw}");
        }
    }

    #[test]
    fn parse_rejects_malformed_chords() {
        assert_eq!("".parse::<Chord>(), Err(ChordParseError::Empty));
        assert!(matches!(
            "Ctrl++B".parse::<Chord>(),
            Err(ChordParseError::EmptySegment { .. })
        ));
        assert!(matches!(
            "Shift+Shift+B".parse::<Chord>(),
            Err(ChordParseError::DuplicateModifier {
                modifier: Modifier::Shift,
                ..
            })
        ));
        assert!(matches!(
            "Ctrl+Alt".parse::<Chord>(),
            Err(ChordParseError::MissingKey { .. })
        ));
        assert!(matches!(
            "A+B".parse::<Chord>(),
            Err(ChordParseError::MultipleKeys { .. })
        ));
        assert!(matches!(
            "Ctrl+Nope".parse::<Chord>(),
            Err(ChordParseError::Key { .. })
        ));
    }

    #[test]
    fn serde_uses_text_form() {
        let chord = Chord::new(Key::S).with(Modifier::Shift);
        let json = serde_json::to_string(&chord).expect("encode");
        assert_eq!(json, "\"Shift+S\"");
        let decoded: Chord = serde_json::from_str("\"shift+s\"").expect("decode");
        assert_eq!(decoded, chord);
        assert!(serde_json::from_str::<Chord>("\"Shift+\"").is_err());
    }

    #[test]
    fn modifiers_match_is_exact_not_subset() {
        let mut keyboard = KeyboardState::new();
        keyboard.press(Key::LeftShift);
        keyboard.press(Key::LeftControl);

        assert!(!Chord::new(Key::S).with(Modifier::Shift).modifiers_match(&keyboard));
        assert!(Chord::new(Key::S)
            .with(Modifier::Shift)
            .with(Modifier::Ctrl)
            .modifiers_match(&keyboard));
        assert!(!Chord::new(Key::S).modifiers_match(&keyboard));
    }
}
