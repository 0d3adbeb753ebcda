use std::path::Path;

use opentell_core::atomic::write_atomic;
use opentell_types::{LearningDocument, SessionBuffer, WalEntry};

/// Load `learnings.json`. Missing file or parse failure both yield an
/// empty document — data loss is preferred over crashing at a hook
/// boundary (spec.md §4.1 "Failure semantics").
pub fn load_learnings(path: &Path) -> LearningDocument {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "learnings.json is corrupt, starting fresh");
            LearningDocument::default()
        }),
        Err(_) => LearningDocument::default(),
    }
}

/// Write `learnings.json` atomically. Write errors are logged and
/// swallowed — the engine must never block the host on a failed write.
pub fn save_learnings(path: &Path, document: &LearningDocument) {
    let Ok(json) = serde_json::to_string_pretty(document) else {
        tracing::warn!("failed to serialize learnings document");
        return;
    };
    if let Err(err) = write_atomic(path, json.as_bytes()) {
        tracing::warn!(error = %err, "failed to write learnings.json");
    }
}

/// Load `session-buffer.json`. Missing/corrupt file yields a fresh buffer.
pub fn load_session_buffer(path: &Path, session_id: &str) -> SessionBuffer {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .unwrap_or_else(|_| SessionBuffer::new(session_id)),
        Err(_) => SessionBuffer::new(session_id),
    }
}

pub fn save_session_buffer(path: &Path, buffer: &SessionBuffer) {
    let Ok(json) = serde_json::to_string_pretty(buffer) else {
        return;
    };
    if let Err(err) = write_atomic(path, json.as_bytes()) {
        tracing::warn!(error = %err, "failed to write session-buffer.json");
    }
}

pub fn clear_session_buffer(path: &Path, session_id: &str) {
    save_session_buffer(path, &SessionBuffer::new(session_id));
}

/// Read every entry in `wal.jsonl`, skipping malformed lines rather than
/// failing the whole read (the same discipline the transcript reader uses).
pub fn load_wal(path: &Path) -> Vec<WalEntry> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

pub fn save_wal(path: &Path, entries: &[WalEntry]) {
    let mut body = String::new();
    for entry in entries {
        if let Ok(line) = serde_json::to_string(entry) {
            body.push_str(&line);
            body.push('\n');
        }
    }
    if let Err(err) = write_atomic(path, body.as_bytes()) {
        tracing::warn!(error = %err, "failed to write wal.jsonl");
    }
}

pub fn append_wal(path: &Path, entry: &WalEntry) {
    let mut entries = load_wal(path);
    entries.push(entry.clone());
    save_wal(path, &entries);
}
