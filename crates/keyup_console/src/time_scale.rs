//! Debug-console entries and key bindings that change the game's time scale.
//!
//! Default entries, under `Extensions/TimeScale/`:
//!
//! | Entry      | Scale | Key     |
//! |------------|-------|---------|
//! | Ultra Slow | 0     | Shift+S |
//! | Slow       | 0.15  | S       |
//! | Normal     | 1     | D       |
//! | Fast       | 3     | F       |
//! | Ultra Fast | 20    | Shift+F |
//!
//! Games that use these keys for play should override them in config or set
//! them to `null`.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bindings::{Callback, Chord};
use crate::input::{Key, Modifier};
use crate::options::{OptionButton, OptionsCatalog, OptionsError};

pub const DEFAULT_PARENT_FOLDER: &str = "Extensions/TimeScale/";
pub const NORMAL_SCALE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeScaleConfig {
    /// Menu folder for the entries. They need a folder even when only the key
    /// bindings are used.
    pub parent_folder: String,
    pub ultra_slow_scale: f32,
    pub slow_scale: f32,
    pub fast_scale: f32,
    pub ultra_fast_scale: f32,
    pub ultra_slow_key: Option<Chord>,
    pub slow_key: Option<Chord>,
    pub normal_key: Option<Chord>,
    pub fast_key: Option<Chord>,
    pub ultra_fast_key: Option<Chord>,
}

impl Default for TimeScaleConfig {
    fn default() -> Self {
        Self {
            parent_folder: DEFAULT_PARENT_FOLDER.to_string(),
            ultra_slow_scale: 0.0,
            slow_scale: 0.15,
            fast_scale: 3.0,
            ultra_fast_scale: 20.0,
            ultra_slow_key: Some(Chord::new(Key::S).with(Modifier::Shift)),
            slow_key: Some(Chord::new(Key::S)),
            normal_key: Some(Chord::new(Key::D)),
            fast_key: Some(Chord::new(Key::F)),
            ultra_fast_key: Some(Chord::new(Key::F).with(Modifier::Shift)),
        }
    }
}

impl TimeScaleConfig {
    /// Trimmed folder with exactly the trailing separator the menu expects.
    pub fn normalized_folder(&self) -> String {
        let mut folder = self.parent_folder.trim().to_string();
        if !folder.ends_with('/') {
            folder.push('/');
        }
        folder
    }

    pub(crate) fn scales(&self) -> [(&'static str, f32); 4] {
        [
            ("ultra_slow_scale", self.ultra_slow_scale),
            ("slow_scale", self.slow_scale),
            ("fast_scale", self.fast_scale),
            ("ultra_fast_scale", self.ultra_fast_scale),
        ]
    }
}

/// Receives speed changes. Hosts with their own speed controls implement this
/// instead of using [`SharedTimeScale`].
pub trait TimeScaleTarget {
    fn set_speed(&self, scale: f32);

    fn reset_speed(&self) {
        self.set_speed(NORMAL_SCALE);
    }
}

/// Time scale shared between the console entries and the game loop.
#[derive(Debug, Clone)]
pub struct SharedTimeScale {
    scale: Rc<Cell<f32>>,
}

impl Default for SharedTimeScale {
    fn default() -> Self {
        Self {
            scale: Rc::new(Cell::new(NORMAL_SCALE)),
        }
    }
}

impl SharedTimeScale {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f32 {
        self.scale.get()
    }
}

impl TimeScaleTarget for SharedTimeScale {
    fn set_speed(&self, scale: f32) {
        let previous = self.scale.replace(scale);
        info!(previous, scale, "time_scale_changed");
    }
}

pub struct TimeScaleControl {
    config: TimeScaleConfig,
    target: Rc<dyn TimeScaleTarget>,
}

impl TimeScaleControl {
    pub fn new(config: TimeScaleConfig, target: Rc<dyn TimeScaleTarget>) -> Self {
        Self { config, target }
    }

    /// Adds the speed entries to `catalog`. Speed entries whose scale is
    /// effectively 1 are left out since Normal already covers them. Returns
    /// the number of entries added.
    pub fn install<C: OptionsCatalog + ?Sized>(
        &self,
        catalog: &mut C,
    ) -> Result<usize, OptionsError> {
        let folder = self.config.normalized_folder();
        let mut added = 0;

        added += self.add_speed_button(
            catalog,
            &folder,
            "Ultra Slow",
            self.config.ultra_slow_scale,
            self.config.ultra_slow_key,
        )?;
        added += self.add_speed_button(
            catalog,
            &folder,
            "Slow",
            self.config.slow_scale,
            self.config.slow_key,
        )?;

        let target = Rc::clone(&self.target);
        let reset: Callback = Rc::new(move || target.reset_speed());
        catalog.add_button(
            OptionButton::new(format!("{folder}Normal"), reset)
                .auto_close_overlay()
                .bind_to_keyboard(self.config.normal_key),
        )?;
        added += 1;

        added += self.add_speed_button(
            catalog,
            &folder,
            "Fast",
            self.config.fast_scale,
            self.config.fast_key,
        )?;
        added += self.add_speed_button(
            catalog,
            &folder,
            "Ultra Fast",
            self.config.ultra_fast_scale,
            self.config.ultra_fast_key,
        )?;

        info!(folder = %folder, entries = added, "time_scale_installed");
        Ok(added)
    }

    fn add_speed_button<C: OptionsCatalog + ?Sized>(
        &self,
        catalog: &mut C,
        folder: &str,
        label: &str,
        scale: f32,
        key: Option<Chord>,
    ) -> Result<usize, OptionsError> {
        if approximately(scale, NORMAL_SCALE) {
            return Ok(0);
        }
        let target = Rc::clone(&self.target);
        let action: Callback = Rc::new(move || target.set_speed(scale));
        catalog.add_button(
            OptionButton::new(format!("{folder}{label}"), action)
                .auto_close_overlay()
                .bind_to_keyboard(key),
        )?;
        Ok(1)
    }
}

fn approximately(a: f32, b: f32) -> bool {
    let tolerance = (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0);
    (b - a).abs() < tolerance
}
