mod key;
mod keyboard;

pub use key::{Key, KeyParseError, Modifier, Modifiers};
pub use keyboard::{InputState, KeyboardState};
