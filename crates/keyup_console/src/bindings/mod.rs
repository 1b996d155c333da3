mod chord;
mod key_up;
mod registry;

pub use chord::{Chord, ChordParseError};
pub use key_up::{BindingPolicy, KeyUpBindings};
pub use registry::{Callback, KeyChordRegistry};
