use anyhow::Result;

/// `self-update` (spec.md §4.11 mentions the check, not a concrete update
/// channel or release source). Until a real distribution channel exists
/// this is intentionally a no-op beyond logging: the marker file that
/// gates how often it runs is written by the caller (session-start),
/// not here.
pub fn run() -> Result<()> {
    tracing::info!("self-update: no update channel configured, skipping");
    Ok(())
}
