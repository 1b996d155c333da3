use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::bindings::{Callback, Chord, KeyUpBindings};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("option path must not be empty")]
    EmptyPath,
    #[error("duplicate option entry: {path}")]
    DuplicateEntry { path: String },
    #[error("unknown option entry: {path}")]
    UnknownEntry { path: String },
}

/// A labeled options-menu button, optionally bound to a chord.
pub struct OptionButton {
    pub path: String,
    pub action: Callback,
    pub auto_close_overlay: bool,
    pub key_binding: Option<Chord>,
}

impl OptionButton {
    pub fn new(path: impl Into<String>, action: Callback) -> Self {
        Self {
            path: path.into(),
            action,
            auto_close_overlay: false,
            key_binding: None,
        }
    }

    pub fn auto_close_overlay(mut self) -> Self {
        self.auto_close_overlay = true;
        self
    }

    pub fn bind_to_keyboard(mut self, chord: Option<Chord>) -> Self {
        self.key_binding = chord;
        self
    }
}

impl fmt::Debug for OptionButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionButton")
            .field("path", &self.path)
            .field("auto_close_overlay", &self.auto_close_overlay)
            .field("key_binding", &self.key_binding)
            .finish()
    }
}

/// What a console options menu must offer to extensions that add entries.
pub trait OptionsCatalog {
    fn add_button(&mut self, button: OptionButton) -> Result<(), OptionsError>;
}

/// In-memory options menu whose key bindings go through [`KeyUpBindings`].
#[derive(Debug)]
pub struct ConsoleOptions {
    bindings: KeyUpBindings,
    entries: Vec<OptionButton>,
    lookup_by_lower_path: HashMap<String, usize>,
}

impl ConsoleOptions {
    pub fn new(bindings: KeyUpBindings) -> Self {
        Self {
            bindings,
            entries: Vec::new(),
            lookup_by_lower_path: HashMap::new(),
        }
    }

    pub fn bindings(&self) -> &KeyUpBindings {
        &self.bindings
    }

    pub fn lookup(&self, path: &str) -> Option<&OptionButton> {
        let index = self.lookup_by_lower_path.get(&path.to_ascii_lowercase())?;
        self.entries.get(*index)
    }

    /// Registration order.
    pub fn entries(&self) -> impl Iterator<Item = &OptionButton> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs an entry's action as a menu click. Returns whether the overlay
    /// should close afterwards.
    pub fn press(&self, path: &str) -> Result<bool, OptionsError> {
        let entry = self
            .lookup(path)
            .ok_or_else(|| OptionsError::UnknownEntry {
                path: path.to_string(),
            })?;
        debug!(path = %entry.path, "option_pressed");
        (entry.action)();
        Ok(entry.auto_close_overlay)
    }

    /// Drops an entry. Its chord is only unbound if it still runs this entry's
    /// action.
    pub fn remove(&mut self, path: &str) -> Result<OptionButton, OptionsError> {
        let lower = path.to_ascii_lowercase();
        let index = self
            .lookup_by_lower_path
            .remove(&lower)
            .ok_or_else(|| OptionsError::UnknownEntry {
                path: path.to_string(),
            })?;
        let entry = self.entries.remove(index);
        for slot in self.lookup_by_lower_path.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        if let Some(chord) = entry.key_binding {
            self.bindings.unbind(chord, Some(&entry.action));
        }
        Ok(entry)
    }
}

impl OptionsCatalog for ConsoleOptions {
    fn add_button(&mut self, button: OptionButton) -> Result<(), OptionsError> {
        if button.path.trim().is_empty() {
            return Err(OptionsError::EmptyPath);
        }
        let lower = button.path.to_ascii_lowercase();
        if self.lookup_by_lower_path.contains_key(&lower) {
            return Err(OptionsError::DuplicateEntry { path: button.path });
        }

        if let Some(chord) = button.key_binding {
            if self.bindings.is_bound(chord, None) {
                warn!(chord = %chord, path = %button.path, "option_chord_rebound");
            }
            self.bindings.bind(chord, Rc::clone(&button.action));
        }
        debug!(
            path = %button.path,
            key_binding = ?button.key_binding.map(|chord| chord.to_string()),
            "option_added"
        );
        self.entries.push(button);
        self.lookup_by_lower_path.insert(lower, self.entries.len() - 1);
        Ok(())
    }
}
