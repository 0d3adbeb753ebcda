use anyhow::Result;
use chrono::Utc;

use opentell_core::StatePaths;
use opentell_store::Store;
use opentell_types::{thresholds::TRANSCRIPT_TAIL_PAIRS, Pair, WalEntry};

use crate::error_context;

/// turn-stop (spec.md §4.11): scan the tail of the transcript for
/// unanalyzed pairs, run the pattern/tool-signal/observer detectors over
/// each, and store or queue whatever they find. All errors are logged and
/// swallowed — a hook must always exit cleanly.
pub fn run(paths: &StatePaths, session_id: &str, transcript_path: &str) -> Result<()> {
    let mut store = Store::load(paths.clone());
    let mut buffer = store.load_buffer(session_id);

    let pairs: Vec<Pair> = opentell_transcript::read_last_pairs(
        std::path::Path::new(transcript_path),
        TRANSCRIPT_TAIL_PAIRS,
    )
    .unwrap_or_default();

    for pair in pairs {
        let fingerprint = pair.fingerprint();
        if buffer.is_analyzed(&fingerprint) {
            continue;
        }

        let now = Utc::now();

        // (a) tool-signal detection over events since the last stop.
        let tool_signals = opentell_detect::detect_tool_signals(&buffer);
        for signal in tool_signals {
            store.add_candidate(signal, session_id, now);
        }

        // (b) advance the turn boundary.
        buffer.last_stop_ts = Some(now);

        // (c) error context, used as classifier context if this pair is queued.
        let err_ctx = error_context::extract(&pair.assistant_text);
        let tool_ctx = opentell_detect::format_tool_context(&buffer);

        // (d)/(e) pattern detector, falling back to the WAL + background
        // classifier for ambiguous (non-noise) pairs.
        let result = opentell_detect::detect(&pair);
        if result.detected {
            for signal in result.signals {
                store.add_candidate(signal, session_id, now);
            }
        } else if !result.noise {
            let entry = WalEntry {
                claude_said: pair.assistant_text.clone(),
                user_said: pair.developer_text.clone(),
                error_context: err_ctx,
                tool_context: Some(tool_ctx),
                written_at: now,
            };
            store.append_wal(&entry);
            let entry_index = store.wal_len().saturating_sub(1);
            opentell_classifier::spawn_background_classification(&entry_index.to_string());
        }

        // (f) observer: prefer a validated observation; otherwise fall back
        // to inferred observations from the assistant's own text.
        if let Some(signal) = opentell_detect::detect_validated(&pair) {
            store.add_candidate(signal, session_id, now);
        } else {
            for signal in opentell_detect::detect_observations(&pair.assistant_text) {
                store.add_observation(signal, session_id, now);
            }
        }

        // (g) mark this pair analyzed.
        buffer.mark_analyzed(fingerprint);
    }

    store.save_buffer(&buffer);
    store.save();
    Ok(())
}
