use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::input::InputState;

use super::Chord;

/// Action fired when a bound chord is released. Identity is the `Rc` allocation.
pub type Callback = Rc<dyn Fn()>;

/// Chord to callback map with key-up dispatch.
#[derive(Default)]
pub struct KeyChordRegistry {
    bindings: HashMap<Chord, Callback>,
    had_any_key: bool,
}

impl fmt::Debug for KeyChordRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyChordRegistry")
            .field("chords", &self.chords())
            .field("had_any_key", &self.had_any_key)
            .finish()
    }
}

impl KeyChordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the callback for `chord`.
    pub fn bind(&mut self, chord: Chord, callback: Callback) {
        self.bindings.insert(chord, callback);
    }

    /// Removes the binding for `chord`. With `required`, only removes it while
    /// that exact callback is still the one bound. Returns whether anything was
    /// removed.
    pub fn unbind(&mut self, chord: Chord, required: Option<&Callback>) -> bool {
        if let Some(required) = required {
            let matches = self
                .bindings
                .get(&chord)
                .is_some_and(|existing| Rc::ptr_eq(existing, required));
            if !matches {
                return false;
            }
        }
        self.bindings.remove(&chord).is_some()
    }

    pub fn is_bound(&self, chord: Chord, required: Option<&Callback>) -> bool {
        match (self.bindings.get(&chord), required) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(existing), Some(required)) => Rc::ptr_eq(existing, required),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound chords, sorted for stable diagnostics.
    pub fn chords(&self) -> Vec<Chord> {
        let mut chords = self.bindings.keys().copied().collect::<Vec<_>>();
        chords.sort();
        chords
    }

    /// Scans for chords released this tick with an exact modifier match and
    /// returns their callbacks without invoking them. Callers run them after
    /// releasing their borrow of the registry, see [`KeyUpBindings::tick`].
    ///
    /// [`KeyUpBindings::tick`]: super::KeyUpBindings::tick
    pub fn released_callbacks<I: InputState + ?Sized>(&mut self, input: &I) -> Vec<Callback> {
        let any_key = input.any_key_held();
        if !any_key && !self.had_any_key && !input.any_key_released() {
            return Vec::new();
        }
        self.had_any_key = any_key;

        self.bindings
            .iter()
            .filter(|(chord, _)| chord.released_in(input))
            .map(|(_, callback)| Rc::clone(callback))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::input::{Key, KeyboardState, Modifier};

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        let callback: Callback = Rc::new(move || hits.set(hits.get() + 1));
        (count, callback)
    }

    fn fire<I: InputState + ?Sized>(registry: &mut KeyChordRegistry, input: &I) {
        for callback in registry.released_callbacks(input) {
            callback();
        }
    }

    fn noop() -> Callback {
        Rc::new(|| {})
    }

    fn release_tick(registry: &mut KeyChordRegistry, held: &[Key], released: Key) {
        let mut keyboard = KeyboardState::new();
        keyboard.press(released);
        for key in held {
            keyboard.press(*key);
        }
        keyboard.release(released);
        fire(registry, &keyboard);
    }

    /// Input provider that never reports idle, for checking the idle skip.
    struct NoIdleHint<'a>(&'a KeyboardState);

    impl InputState for NoIdleHint<'_> {
        fn is_held(&self, key: Key) -> bool {
            self.0.is_held(key)
        }

        fn released_this_tick(&self, key: Key) -> bool {
            self.0.released_this_tick(key)
        }

        fn any_key_held(&self) -> bool {
            self.0.any_key_held()
        }
    }

    #[test]
    fn bind_then_unbind_leaves_chord_unbound() {
        let mut registry = KeyChordRegistry::new();
        let chord = Chord::new(Key::A);
        registry.bind(chord, noop());
        assert!(registry.is_bound(chord, None));

        assert!(registry.unbind(chord, None));
        assert!(!registry.is_bound(chord, None));
        assert!(registry.is_empty());
    }

    #[test]
    fn rebinding_replaces_previous_callback() {
        let mut registry = KeyChordRegistry::new();
        let chord = Chord::new(Key::A);
        let first = noop();
        let second = noop();
        registry.bind(chord, Rc::clone(&first));
        registry.bind(chord, Rc::clone(&second));

        assert_eq!(registry.len(), 1);
        assert!(registry.is_bound(chord, Some(&second)));
        assert!(!registry.is_bound(chord, Some(&first)));
    }

    #[test]
    fn guarded_unbind_with_other_callback_is_noop() {
        let mut registry = KeyChordRegistry::new();
        let chord = Chord::new(Key::A).with(Modifier::Ctrl);
        let stale = noop();
        let current = noop();
        registry.bind(chord, Rc::clone(&current));

        assert!(!registry.unbind(chord, Some(&stale)));
        assert!(registry.is_bound(chord, Some(&current)));

        assert!(registry.unbind(chord, Some(&current)));
        assert!(!registry.is_bound(chord, None));
    }

    #[test]
    fn unbinding_unbound_chord_is_noop() {
        let mut registry = KeyChordRegistry::new();
        assert!(!registry.unbind(Chord::new(Key::Z), None));
        assert!(!registry.unbind(Chord::new(Key::Z), Some(&noop())));
        assert!(!registry.is_bound(Chord::new(Key::Z), None));
    }

    #[test]
    fn exact_modifier_match_separates_plain_and_shifted_chords() {
        let mut registry = KeyChordRegistry::new();
        let (plain_hits, plain) = counter();
        let (shift_hits, shifted) = counter();
        registry.bind(Chord::new(Key::K), plain);
        registry.bind(Chord::new(Key::K).with(Modifier::Shift), shifted);

        release_tick(&mut registry, &[Key::LeftShift], Key::K);
        assert_eq!(plain_hits.get(), 0);
        assert_eq!(shift_hits.get(), 1);

        release_tick(&mut registry, &[], Key::K);
        assert_eq!(plain_hits.get(), 1);
        assert_eq!(shift_hits.get(), 1);
    }

    #[test]
    fn extra_modifier_blocks_plain_chord() {
        let mut registry = KeyChordRegistry::new();
        let (hits, callback) = counter();
        registry.bind(Chord::new(Key::K), callback);

        release_tick(&mut registry, &[Key::RightAlt], Key::K);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn held_key_without_release_never_fires() {
        let mut registry = KeyChordRegistry::new();
        let (hits, callback) = counter();
        registry.bind(Chord::new(Key::K), callback);

        let mut keyboard = KeyboardState::new();
        keyboard.press(Key::K);
        for _ in 0..3 {
            fire(&mut registry, &keyboard);
            keyboard.end_tick();
        }
        assert_eq!(hits.get(), 0);

        keyboard.release(Key::K);
        fire(&mut registry, &keyboard);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn self_unbinding_callback_fires_once() {
        let registry = Rc::new(RefCell::new(KeyChordRegistry::new()));
        let chord = Chord::new(Key::Q);
        let hits = Rc::new(Cell::new(0));

        let registry_for_callback = Rc::clone(&registry);
        let hits_for_callback = Rc::clone(&hits);
        let callback: Callback = Rc::new(move || {
            hits_for_callback.set(hits_for_callback.get() + 1);
            registry_for_callback.borrow_mut().unbind(chord, None);
        });
        registry.borrow_mut().bind(chord, callback);

        let mut keyboard = KeyboardState::new();
        keyboard.press(Key::Q);
        keyboard.release(Key::Q);
        let fired = registry.borrow_mut().released_callbacks(&keyboard);
        for callback in fired {
            callback();
        }

        assert_eq!(hits.get(), 1);
        assert!(!registry.borrow().is_bound(chord, None));
    }

    #[test]
    fn chord_bound_during_scan_waits_for_next_tick() {
        let registry = Rc::new(RefCell::new(KeyChordRegistry::new()));
        let (late_hits, late) = counter();

        let registry_for_callback = Rc::clone(&registry);
        let binder: Callback = Rc::new(move || {
            registry_for_callback
                .borrow_mut()
                .bind(Chord::new(Key::W), Rc::clone(&late));
        });
        registry.borrow_mut().bind(Chord::new(Key::Q), binder);

        let mut keyboard = KeyboardState::new();
        keyboard.press(Key::Q);
        keyboard.press(Key::W);
        keyboard.release(Key::Q);
        keyboard.release(Key::W);
        let fired = registry.borrow_mut().released_callbacks(&keyboard);
        assert_eq!(fired.len(), 1);
        for callback in fired {
            callback();
        }
        assert_eq!(late_hits.get(), 0);
        assert!(registry.borrow().is_bound(Chord::new(Key::W), None));

        keyboard.end_tick();
        keyboard.press(Key::W);
        keyboard.release(Key::W);
        let fired = registry.borrow_mut().released_callbacks(&keyboard);
        for callback in fired {
            callback();
        }
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn shifted_and_plain_chords_fire_on_consecutive_ticks() {
        let mut registry = KeyChordRegistry::new();
        let (f_hits, f) = counter();
        let (g_hits, g) = counter();
        registry.bind(Chord::new(Key::A), f);
        registry.bind(Chord::new(Key::A).with(Modifier::Shift), g);

        let mut keyboard = KeyboardState::new();
        keyboard.press(Key::LeftShift);
        keyboard.press(Key::A);
        fire(&mut registry, &keyboard);
        keyboard.end_tick();

        keyboard.release(Key::A);
        fire(&mut registry, &keyboard);
        keyboard.end_tick();
        assert_eq!((f_hits.get(), g_hits.get()), (0, 1));

        keyboard.release(Key::LeftShift);
        keyboard.press(Key::A);
        fire(&mut registry, &keyboard);
        keyboard.end_tick();

        keyboard.release(Key::A);
        fire(&mut registry, &keyboard);
        keyboard.end_tick();
        assert_eq!((f_hits.get(), g_hits.get()), (1, 1));
    }

    #[test]
    fn tap_between_ticks_fires_despite_idle_skip() {
        let mut registry = KeyChordRegistry::new();
        let (hits, callback) = counter();
        registry.bind(Chord::new(Key::T), callback);

        let mut keyboard = KeyboardState::new();
        fire(&mut registry, &keyboard);
        keyboard.press(Key::T);
        keyboard.release(Key::T);
        assert!(!keyboard.any_key_held());
        fire(&mut registry, &keyboard);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn idle_skip_does_not_change_dispatch() {
        let mut hinted = KeyChordRegistry::new();
        let mut unhinted = KeyChordRegistry::new();
        let (hinted_hits, hinted_callback) = counter();
        let (unhinted_hits, unhinted_callback) = counter();
        hinted.bind(Chord::new(Key::E), hinted_callback);
        unhinted.bind(Chord::new(Key::E), unhinted_callback);

        let mut keyboard = KeyboardState::new();
        let script: [(&[Key], &[Key]); 5] = [
            (&[], &[]),
            (&[Key::E], &[]),
            (&[], &[Key::E]),
            (&[Key::E], &[Key::E]),
            (&[Key::LeftShift, Key::E], &[Key::E]),
        ];
        for (presses, releases) in script {
            for key in presses {
                keyboard.press(*key);
            }
            for key in releases {
                keyboard.release(*key);
            }
            fire(&mut hinted, &keyboard);
            fire(&mut unhinted, &NoIdleHint(&keyboard));
            keyboard.end_tick();
            assert_eq!(hinted_hits.get(), unhinted_hits.get());
        }
        assert_eq!(hinted_hits.get(), 2);
    }
}
