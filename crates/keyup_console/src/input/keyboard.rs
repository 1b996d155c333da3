use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

use super::key::{Key, Modifier, Modifiers};

/// Per-tick keyboard query consumed by the binding registry.
pub trait InputState {
    fn is_held(&self, key: Key) -> bool;

    /// True only on the tick the key went from held to not held.
    fn released_this_tick(&self, key: Key) -> bool;

    fn any_key_held(&self) -> bool;

    /// Providers that cannot answer keep the default, which disables the
    /// registry's idle skip rather than risk missing a tap.
    fn any_key_released(&self) -> bool {
        true
    }

    fn is_modifier_held(&self, modifier: Modifier) -> bool {
        let [left, right] = modifier.keys();
        self.is_held(left) || self.is_held(right)
    }

    fn held_modifiers(&self) -> Modifiers {
        Modifier::ALL
            .into_iter()
            .filter(|modifier| self.is_modifier_held(*modifier))
            .fold(Modifiers::NONE, Modifiers::with)
    }
}

/// Keyboard state assembled from discrete key events between ticks.
#[derive(Debug, Default)]
pub struct KeyboardState {
    held: HashSet<Key>,
    released: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key_event(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state, key_event.repeat);
    }

    /// Applies one window key event by its parts. Repeats and keys without a
    /// [`Key`] mapping are ignored.
    pub fn handle_physical_key(
        &mut self,
        physical_key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) {
        if repeat {
            return;
        }
        let PhysicalKey::Code(code) = physical_key else {
            return;
        };
        let Some(key) = Key::from_key_code(code) else {
            return;
        };
        match state {
            ElementState::Pressed => self.press(key),
            ElementState::Released => self.release(key),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.released.insert(key);
        }
    }

    /// Releases every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.released.extend(self.held.drain());
    }

    /// Clears this tick's release edges. Call once after every tick.
    pub fn end_tick(&mut self) {
        self.released.clear();
    }
}

impl InputState for KeyboardState {
    fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn released_this_tick(&self, key: Key) -> bool {
        self.released.contains(&key)
    }

    fn any_key_held(&self) -> bool {
        !self.held.is_empty()
    }

    fn any_key_released(&self) -> bool {
        !self.released.is_empty()
    }
}
