//! Turning formatted names into rename commands.
//!
//! Only workspaces whose name actually changes get a command, and all
//! commands for one event go out as a single `;`-joined request so the
//! window manager applies them together.

use crate::formatter::NameFormatter;
use crate::workspace::{Workspace, Workspaces};
use log::debug;

/// Separator between commands in one request.
pub const COMMAND_SEPARATOR: &str = ";";

/// Escape `name` for use inside a double-quoted command argument.
///
/// Backslashes are escaped before quotes.
pub fn escape_name(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The command renaming `ws`, or `None` if its name would not change or
/// there is nothing to name it after.
pub fn rename_command(ws: &Workspace, formatter: &NameFormatter) -> Option<String> {
    let new_name = formatter.format(ws.number, &ws.icons);
    if new_name.is_empty() || new_name == ws.name {
        return None;
    }
    Some(format!(
        "rename workspace \"{}\" to \"{}\"",
        escape_name(&ws.name),
        escape_name(&new_name)
    ))
}

/// All rename commands for one snapshot joined into one request, or
/// `None` if no workspace changes.
pub fn rename_batch(workspaces: &Workspaces, formatter: &NameFormatter) -> Option<String> {
    let commands: Vec<String> = workspaces
        .values()
        .filter_map(|ws| rename_command(ws, formatter))
        .collect();
    if commands.is_empty() {
        return None;
    }
    let batch = commands.join(COMMAND_SEPARATOR);
    debug!("rename request: {}", batch);
    Some(batch)
}
