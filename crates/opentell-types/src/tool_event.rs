use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compact projection of a tool-use event, as buffered by the tool-use
/// hook (spec.md §4.11). Only Bash/Write/Edit are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolEventKind {
    Bash { command: String },
    Write { path: String },
    Edit { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEvent {
    pub ts: DateTime<Utc>,
    pub kind: ToolEventKind,
}

/// Truncate a Bash command to the buffer's 300-char cap (spec.md §4.11).
pub const COMMAND_TRUNCATE_LEN: usize = 300;

pub fn truncate_command(command: &str) -> String {
    if command.chars().count() <= COMMAND_TRUNCATE_LEN {
        return command.to_string();
    }
    let truncated: String = command.chars().take(COMMAND_TRUNCATE_LEN).collect();
    format!("{truncated}…")
}
