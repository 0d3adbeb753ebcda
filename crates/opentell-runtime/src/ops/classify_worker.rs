use anyhow::Result;
use chrono::Utc;

use opentell_core::{Config, StatePaths};
use opentell_store::Store;
use opentell_types::Pair;

use crate::stats;

/// `classify-worker --entry <index>` (spec.md §9 "Background worker
/// lifecycle"): the detached subprocess spawned by turn-stop to classify
/// one WAL entry without blocking the hook that queued it. Looks the
/// entry up by its index in the WAL at the time it runs (the WAL may have
/// shifted since the index was captured; a missing index is a no-op, not
/// an error — session-end's drain is the backstop).
pub fn run(paths: &StatePaths, entry_index: usize) -> Result<()> {
    let config = Config::load(paths)?;
    let Some(api_key) = config.anthropic_api_key else {
        return Ok(());
    };

    let mut store = Store::load(paths.clone());
    let entries = store.wal_entries();
    let Some(entry) = entries.get(entry_index).cloned() else {
        return Ok(());
    };

    let client = reqwest::blocking::Client::new();
    let model = config.classifier_model.as_deref().unwrap_or("claude-3-5-haiku-latest");
    let pair = Pair {
        assistant_text: entry.claude_said.clone(),
        developer_text: entry.user_said.clone(),
        assistant_at: entry.written_at,
        developer_at: entry.written_at,
    };

    let outcome = opentell_classifier::classify(
        &client,
        &api_key,
        model,
        &pair,
        entry.error_context.as_deref(),
        entry.tool_context.as_deref(),
    );
    stats::record_call(&paths.stats(), "classify", entry.claude_said.len() + entry.user_said.len(), 0);

    store.remove_from_wal(&entry);
    if let opentell_classifier::ClassifyOutcome::Learning(signal) = outcome {
        // No session id is available to a detached worker; the learning
        // still carries the session ids any later reinforcement adds.
        store.add_candidate(signal, "background", Utc::now());
    }
    store.save();
    Ok(())
}
