use std::process::{Command, Stdio};

/// Re-exec this binary as a detached `classify-worker` subprocess so the
/// turn-stop hook can return immediately without waiting on the network
/// round-trip (spec.md §9 "Background worker lifecycle"). The child's
/// stdio is discarded and it is never `.wait()`-ed; if spawning itself
/// fails, classification for this entry is simply picked up at the next
/// WAL drain instead.
pub fn spawn_background_classification(wal_entry_id: &str) {
    let Ok(exe) = std::env::current_exe() else {
        tracing::warn!("could not resolve current executable for background classification");
        return;
    };

    let result = Command::new(exe)
        .arg("classify-worker")
        .arg("--entry")
        .arg(wal_entry_id)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match result {
        Ok(_child) => {
            // Intentionally not waited on: the child outlives this process.
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to spawn background classification worker");
        }
    }
}
