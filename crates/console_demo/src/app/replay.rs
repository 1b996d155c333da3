use std::fs;
use std::path::Path;

use keyup_console::{InputState, Key, KeyUpBindings, KeyboardState, SharedTimeScale};
use serde::Deserialize;
use tracing::{debug, info};
use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

/// Shift+S, S, Shift+F, F, then D back to normal, with a locked tap in between
/// that must not change anything.
const DEFAULT_SCRIPT_JSON: &str = r#"[
    { "press": ["LeftShift", "S"] },
    { "release": ["S"] },
    { "release": ["LeftShift"] },
    { "press": ["S"], "release": ["S"] },
    { "press": ["RightShift", "F"], "release": ["F"] },
    { "release": ["RightShift"], "access_locked": true },
    { "press": ["F"], "release": ["F"] },
    { "access_locked": false },
    { "press": ["F"], "release": ["F"] },
    { "press": ["D"] },
    { "release": ["D"] }
]"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawScriptTick {
    press: Vec<String>,
    release: Vec<String>,
    access_locked: Option<bool>,
}

/// Key changes applied before one tick. Presses go first, then releases.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ScriptTick {
    pub(crate) press: Vec<Key>,
    pub(crate) release: Vec<Key>,
    pub(crate) access_locked: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ReplaySummary {
    pub(crate) ticks: usize,
    pub(crate) scale_changes: usize,
    pub(crate) final_scale: f32,
}

pub(crate) fn default_script() -> Result<Vec<ScriptTick>, String> {
    parse_script(DEFAULT_SCRIPT_JSON)
}

pub(crate) fn load_script(path: &Path) -> Result<Vec<ScriptTick>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read script '{}': {error}", path.display()))?;
    parse_script(&raw).map_err(|error| format!("{error} (script '{}')", path.display()))
}

fn parse_script(raw: &str) -> Result<Vec<ScriptTick>, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let raw_ticks = match serde_path_to_error::deserialize::<_, Vec<RawScriptTick>>(
        &mut deserializer,
    ) {
        Ok(ticks) => ticks,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            return if path.is_empty() || path == "." {
                Err(format!("parse script json: {source}"))
            } else {
                Err(format!("parse script json at {path}: {source}"))
            };
        }
    };

    raw_ticks
        .into_iter()
        .enumerate()
        .map(|(index, tick)| {
            Ok(ScriptTick {
                press: parse_keys(index, "press", &tick.press)?,
                release: parse_keys(index, "release", &tick.release)?,
                access_locked: tick.access_locked,
            })
        })
        .collect()
}

fn parse_keys(index: usize, field: &str, names: &[String]) -> Result<Vec<Key>, String> {
    names
        .iter()
        .map(|name| {
            Key::from_name(name)
                .map_err(|error| format!("validation failed at [{index}].{field}: {error}"))
        })
        .collect()
}

pub(crate) fn run_script(
    script: &[ScriptTick],
    bindings: &KeyUpBindings,
    keyboard: &mut KeyboardState,
    time_scale: &SharedTimeScale,
) -> ReplaySummary {
    let mut scale_changes = 0usize;
    for (index, tick) in script.iter().enumerate() {
        if let Some(locked) = tick.access_locked {
            bindings.set_access_locked(locked);
        }
        for key in &tick.press {
            keyboard.handle_physical_key(
                PhysicalKey::Code(key.key_code()),
                ElementState::Pressed,
                false,
            );
        }
        for key in &tick.release {
            keyboard.handle_physical_key(
                PhysicalKey::Code(key.key_code()),
                ElementState::Released,
                false,
            );
        }

        let before = time_scale.get();
        bindings.tick(&*keyboard);
        let after = time_scale.get();
        keyboard.end_tick();

        if before != after {
            scale_changes += 1;
            info!(tick = index, from = before, to = after, "time_scale_tick");
        } else {
            debug!(
                tick = index,
                modifiers = ?keyboard.held_modifiers(),
                time_scale = after,
                "tick"
            );
        }
    }

    ReplaySummary {
        ticks: script.len(),
        scale_changes,
        final_scale: time_scale.get(),
    }
}
