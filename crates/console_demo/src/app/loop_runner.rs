use std::process::ExitCode;

use keyup_console::KeyboardState;
use tracing::info;

use super::bootstrap::AppWiring;
use super::replay;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let mut keyboard = KeyboardState::new();
    let summary = replay::run_script(&app.script, &app.bindings, &mut keyboard, &app.time_scale);

    for entry in app.options.entries() {
        let key_binding = entry
            .key_binding
            .map(|chord| chord.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(path = %entry.path, key_binding = %key_binding, "option_entry");
    }
    info!(
        ticks = summary.ticks,
        scale_changes = summary.scale_changes,
        final_time_scale = summary.final_scale,
        "replay_finished"
    );

    ExitCode::SUCCESS
}
