use anyhow::Result;
use chrono::Utc;

use opentell_core::{Config, StatePaths};
use opentell_store::Store;
use opentell_types::{thresholds::WAL_DRAIN_CAP, Pair, Profile};

use crate::stats;

fn load_profile(paths: &StatePaths) -> Option<Profile> {
    let contents = std::fs::read_to_string(paths.profile()).ok()?;
    serde_json::from_str(&contents).ok()
}

fn save_profile(paths: &StatePaths, profile: &Profile) {
    let Ok(json) = serde_json::to_string_pretty(profile) else {
        return;
    };
    if let Err(err) = opentell_core::atomic::write_atomic(&paths.profile(), json.as_bytes()) {
        tracing::warn!(error = %err, "failed to write profile.json");
    }
}

/// session-end (spec.md §4.11): drain the WAL through the classifier,
/// run cross-session analysis, consolidate and/or resynthesize the
/// profile if due, apply passive accumulation and decay, then clear the
/// WAL and session buffer. Every step is best-effort; a failure anywhere
/// is logged and the hook still exits cleanly.
pub fn run(paths: &StatePaths, session_id: &str) -> Result<()> {
    let config = Config::load(paths)?;
    let mut store = Store::load(paths.clone());
    let now = Utc::now();

    if let Some(api_key) = config.anthropic_api_key.as_deref() {
        let client = reqwest::blocking::Client::new();
        let model = config.classifier_model.as_deref().unwrap_or("claude-3-5-haiku-latest");

        let drained = store.drain_wal(WAL_DRAIN_CAP);
        for entry in &drained {
            let pair = Pair {
                assistant_text: entry.claude_said.clone(),
                developer_text: entry.user_said.clone(),
                assistant_at: entry.written_at,
                developer_at: entry.written_at,
            };
            let outcome = opentell_classifier::classify(
                &client,
                api_key,
                model,
                &pair,
                entry.error_context.as_deref(),
                entry.tool_context.as_deref(),
            );
            stats::record_call(
                &paths.stats(),
                "classify",
                entry.claude_said.len() + entry.user_said.len(),
                0,
            );
            if let opentell_classifier::ClassifyOutcome::Learning(signal) = outcome {
                store.add_candidate(signal, session_id, now);
            }
        }

        opentell_engine::analyze_cross_session(store.learnings_mut());

        let total_sessions = store.total_sessions();
        if opentell_engine::should_consolidate(store.get_all(), store.meta(), total_sessions) {
            let clusters = opentell_engine::find_clusters(store.get_all());
            let mut to_apply = Vec::new();
            for cluster in &clusters {
                if let Some(new_learning) =
                    opentell_engine::consolidate_cluster(&client, api_key, model, cluster, now)
                {
                    let member_ids: Vec<_> = cluster.members.iter().map(|l| l.id).collect();
                    to_apply.push((new_learning, member_ids));
                }
            }
            for (new_learning, member_ids) in to_apply {
                let new_id = new_learning.id;
                store.push_learning(new_learning);
                store.mark_consolidated_into(&member_ids, new_id);
            }
            store.mark_consolidation_run(now, total_sessions);
        }

        let synthesis_model = config.synthesis_model.as_deref().unwrap_or(model);
        let profile = load_profile(paths);
        if opentell_engine::profile_needs_update(store.get_all(), profile.as_ref(), total_sessions) {
            if let Some(new_profile) =
                opentell_engine::synthesize_profile(&client, api_key, synthesis_model, store.get_all(), total_sessions, now)
            {
                save_profile(paths, &new_profile);
            }
        }
    } else {
        opentell_engine::analyze_cross_session(store.learnings_mut());
    }

    store.apply_passive_accumulation();
    store.apply_decay(now);
    store.save();
    store.clear_wal();
    store.clear_buffer(session_id);

    Ok(())
}
