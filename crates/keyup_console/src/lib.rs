//! Key-up chord bindings and a time-scale panel for a debug console overlay.
//!
//! ```
//! use keyup_console::{BindingPolicy, Chord, Key, KeyUpBindings, KeyboardState, Modifier};
//!
//! let bindings = KeyUpBindings::new(BindingPolicy::default());
//! bindings.bind_fn(Chord::new(Key::B).with(Modifier::Ctrl).with(Modifier::Shift), || {
//!     println!("ctrl+shift+B up");
//! });
//!
//! let mut keyboard = KeyboardState::new();
//! keyboard.press(Key::LeftControl);
//! keyboard.press(Key::LeftShift);
//! keyboard.press(Key::B);
//! keyboard.release(Key::B);
//! bindings.tick(&keyboard);
//! keyboard.end_tick();
//! ```

pub mod bindings;
pub mod config;
pub mod input;
pub mod options;
pub mod time_scale;

pub use bindings::{
    BindingPolicy, Callback, Chord, ChordParseError, KeyChordRegistry, KeyUpBindings,
};
pub use config::{load_config, parse_config, ConfigError, ExtensionConfig, CONFIG_ENV_VAR};
pub use input::{InputState, Key, KeyParseError, KeyboardState, Modifier, Modifiers};
pub use options::{ConsoleOptions, OptionButton, OptionsCatalog, OptionsError};
pub use time_scale::{SharedTimeScale, TimeScaleConfig, TimeScaleControl, TimeScaleTarget};
