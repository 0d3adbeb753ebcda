use anyhow::Result;
use chrono::Utc;
use serde_json::Value;

use opentell_core::StatePaths;
use opentell_store::Store;
use opentell_types::{truncate_command, ToolEvent, ToolEventKind};

fn extract_event(tool_name: &str, tool_input: Option<&Value>) -> Option<ToolEventKind> {
    let input = tool_input?;
    match tool_name {
        "Bash" => {
            let command = input.get("command")?.as_str()?;
            Some(ToolEventKind::Bash { command: truncate_command(command) })
        }
        "Write" => {
            let path = input.get("file_path")?.as_str()?;
            Some(ToolEventKind::Write { path: path.to_string() })
        }
        "Edit" => {
            let path = input.get("file_path")?.as_str()?;
            Some(ToolEventKind::Edit { path: path.to_string() })
        }
        _ => None,
    }
}

/// tool-use (spec.md §4.11): append a compact, bounded projection of
/// Bash/Write/Edit tool calls to the session buffer. Every other tool is
/// ignored — the detectors only reason about commands and file writes.
pub fn run(paths: &StatePaths, session_id: &str, tool_name: &str, tool_input: Option<&Value>) -> Result<()> {
    let Some(kind) = extract_event(tool_name, tool_input) else {
        return Ok(());
    };

    let store = Store::load(paths.clone());
    let mut buffer = store.load_buffer(session_id);
    buffer.push_tool_event(ToolEvent { ts: Utc::now(), kind });
    store.save_buffer(&buffer);
    Ok(())
}
