//! `settings`: show or update the persisted settings.

use crate::cli::SettingsArgs;
use crate::error::CliError;
use crate::state::AppState;

/// Apply any changes in `args`, save if something changed, and print the
/// resulting settings.
pub fn settings(state: &mut AppState, args: &SettingsArgs) -> Result<String, CliError> {
    let mut changed = false;

    if let Some(group) = &args.default_group {
        let group = group.trim();
        state.settings.default_group = (!group.is_empty()).then(|| group.to_owned());
        changed = true;
    }
    if let Some(view) = &args.default_view {
        state.settings.default_view = view.clone();
        changed = true;
    }

    if changed {
        state.save_settings()?;
        tracing::info!(path = %state.data_dir().display(), "settings saved");
    }

    Ok(format!(
        "default group: {}\ndefault view: {}\ndata directory: {}\n",
        state.settings.default_group.as_deref().unwrap_or("(none)"),
        state.settings.default_view,
        state.data_dir().display()
    ))
}
