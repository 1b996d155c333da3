use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use keyup_console::{
    load_config, ConsoleOptions, ExtensionConfig, KeyUpBindings, SharedTimeScale,
    TimeScaleControl, CONFIG_ENV_VAR,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::replay::{self, ScriptTick};

pub(crate) struct AppWiring {
    pub(crate) bindings: KeyUpBindings,
    pub(crate) options: ConsoleOptions,
    pub(crate) time_scale: SharedTimeScale,
    pub(crate) script: Vec<ScriptTick>,
}

pub(crate) fn build_app() -> Result<AppWiring, String> {
    init_tracing();
    info!("=== KeyUp Console Demo ===");

    let config = resolve_config()?;
    let script = match env::args_os().nth(1) {
        Some(path) => replay::load_script(&PathBuf::from(path))?,
        None => replay::default_script()?,
    };

    let bindings = KeyUpBindings::new(config.key_bindings);
    let mut options = ConsoleOptions::new(bindings.clone());
    let time_scale = SharedTimeScale::new();
    let control = TimeScaleControl::new(config.time_scale, Rc::new(time_scale.clone()));
    let entries = control
        .install(&mut options)
        .map_err(|error| format!("install time scale entries: {error}"))?;

    info!(
        entries,
        bound_chords = bindings.bound_chords().len(),
        bindings_enabled = bindings.is_enabled(),
        script_ticks = script.len(),
        "demo_wired"
    );

    Ok(AppWiring {
        bindings,
        options,
        time_scale,
        script,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_config() -> Result<ExtensionConfig, String> {
    match env::var_os(CONFIG_ENV_VAR) {
        Some(raw) => {
            let path = PathBuf::from(raw);
            let config = load_config(&path).map_err(|error| error.to_string())?;
            info!(path = %path.display(), "config_loaded");
            Ok(config)
        }
        None => {
            info!(env_var = CONFIG_ENV_VAR, "config_defaulted");
            Ok(ExtensionConfig::default())
        }
    }
}
