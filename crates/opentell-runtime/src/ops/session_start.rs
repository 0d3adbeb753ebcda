use std::process::{Command, Stdio};

use anyhow::Result;
use chrono::Utc;

use opentell_core::{Config, StatePaths};
use opentell_store::Store;
use opentell_types::Profile;

const SELF_UPDATE_INTERVAL_HOURS: i64 = 24;

fn load_profile(paths: &StatePaths) -> Option<Profile> {
    let contents = std::fs::read_to_string(paths.profile()).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Detach a self-update check if more than 24 hours have passed since the
/// last one (spec.md §4.11). The worker is a separate subprocess so a slow
/// or failed update check never delays session-start's output.
fn maybe_spawn_self_update(paths: &StatePaths) {
    let marker = paths.self_update_marker();
    let should_run = match std::fs::read_to_string(&marker) {
        Ok(contents) => match contents.trim().parse::<i64>() {
            Ok(last) => Utc::now().timestamp() - last > SELF_UPDATE_INTERVAL_HOURS * 3600,
            Err(_) => true,
        },
        Err(_) => true,
    };
    if !should_run {
        return;
    }

    let Ok(exe) = std::env::current_exe() else {
        return;
    };
    let spawned = Command::new(exe)
        .arg("self-update")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        Ok(_child) => {
            let _ = std::fs::write(&marker, Utc::now().timestamp().to_string());
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to spawn self-update worker");
        }
    }
}

/// session-start (spec.md §4.11): reset the session buffer, apply decay,
/// bump the session counter, and return the context brief to print on
/// standard output.
pub fn run(paths: &StatePaths, session_id: &str) -> Result<String> {
    let config = Config::load(paths)?;
    let mut store = Store::load(paths.clone());

    store.clear_buffer(session_id);
    store.apply_decay(Utc::now());
    store.increment_session_count();
    store.save();

    let profile = load_profile(paths);
    let active: Vec<opentell_types::Learning> = store.get_active(config.confidence_threshold).into_iter().cloned().collect();
    let context = opentell_engine::build_context(&active, profile.as_ref(), config.confidence_threshold, None);

    maybe_spawn_self_update(paths);

    Ok(context)
}
