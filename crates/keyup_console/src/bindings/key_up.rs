use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::input::InputState;

use super::{Callback, Chord, KeyChordRegistry};

/// Where key bindings are allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingPolicy {
    pub is_editor: bool,
    pub in_player_key_bindings: bool,
}

impl Default for BindingPolicy {
    fn default() -> Self {
        Self {
            is_editor: false,
            in_player_key_bindings: true,
        }
    }
}

impl BindingPolicy {
    pub fn can_start(&self) -> bool {
        self.is_editor || self.in_player_key_bindings
    }
}

#[derive(Debug)]
struct KeyUpState {
    registry: KeyChordRegistry,
    is_editor: bool,
    disabled: bool,
    access_locked: bool,
}

/// Key-up bindings owned by one console session.
///
/// Clones share the same registry, so callbacks can hold a handle and rebind
/// chords from inside a tick; such changes apply from the next tick.
#[derive(Debug, Clone)]
pub struct KeyUpBindings {
    inner: Rc<RefCell<KeyUpState>>,
}

impl KeyUpBindings {
    pub fn new(policy: BindingPolicy) -> Self {
        let disabled = !policy.can_start();
        if disabled {
            info!(
                is_editor = policy.is_editor,
                in_player_key_bindings = policy.in_player_key_bindings,
                "key_up_bindings_disabled"
            );
        }
        Self {
            inner: Rc::new(RefCell::new(KeyUpState {
                registry: KeyChordRegistry::new(),
                is_editor: policy.is_editor,
                disabled,
                access_locked: false,
            })),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.inner.borrow().disabled
    }

    /// Permanently disables this instance. Existing bindings stay in place but
    /// never fire again.
    pub fn disable(&self) {
        let mut state = self.inner.borrow_mut();
        if !state.disabled {
            state.disabled = true;
            info!(bound = state.registry.len(), "key_up_bindings_disabled");
        }
    }

    /// Host-reported pending access challenge; outside the editor, ticks are
    /// skipped while it is set.
    pub fn set_access_locked(&self, locked: bool) {
        self.inner.borrow_mut().access_locked = locked;
    }

    /// Ignored while disabled.
    pub fn bind(&self, chord: Chord, callback: Callback) {
        let mut state = self.inner.borrow_mut();
        if state.disabled {
            debug!(chord = %chord, "key_up_bind_ignored");
            return;
        }
        state.registry.bind(chord, callback);
        debug!(chord = %chord, "key_up_bound");
    }

    /// Binds a closure and returns the callback so the caller can later unbind
    /// by identity.
    pub fn bind_fn<F>(&self, chord: Chord, action: F) -> Callback
    where
        F: Fn() + 'static,
    {
        let callback: Callback = Rc::new(action);
        self.bind(chord, Rc::clone(&callback));
        callback
    }

    pub fn unbind(&self, chord: Chord, required: Option<&Callback>) -> bool {
        let removed = self.inner.borrow_mut().registry.unbind(chord, required);
        if removed {
            debug!(chord = %chord, "key_up_unbound");
        }
        removed
    }

    pub fn is_bound(&self, chord: Chord, required: Option<&Callback>) -> bool {
        let state = self.inner.borrow();
        !state.disabled && state.registry.is_bound(chord, required)
    }

    pub fn bound_chords(&self) -> Vec<Chord> {
        self.inner.borrow().registry.chords()
    }

    /// Drives one tick. Callbacks run after the registry borrow is released.
    pub fn tick<I: InputState + ?Sized>(&self, input: &I) {
        let fired = {
            let mut state = self.inner.borrow_mut();
            if state.disabled || (state.access_locked && !state.is_editor) {
                return;
            }
            state.registry.released_callbacks(input)
        };
        if !fired.is_empty() {
            debug!(count = fired.len(), "key_up_fired");
        }
        for callback in fired {
            callback();
        }
    }
}

impl Default for KeyUpBindings {
    fn default() -> Self {
        Self::new(BindingPolicy::default())
    }
}
