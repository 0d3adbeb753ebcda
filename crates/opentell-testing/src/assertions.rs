//! Custom assertions for opentell-specific validation.

use anyhow::{Context, Result};

use opentell_store::Store;
use opentell_types::Classification;

/// Assert the store holds exactly `expected` learnings in total.
pub fn assert_learning_count(store: &Store, expected: usize) -> Result<()> {
    let actual = store.get_all().len();
    if actual != expected {
        anyhow::bail!("expected {expected} learnings, got {actual}");
    }
    Ok(())
}

/// Assert at least one learning with the given classification and
/// matching text substring exists and is active.
pub fn assert_has_active_learning(store: &Store, threshold: f64, text_contains: &str) -> Result<()> {
    let found = store.get_active(threshold).into_iter().any(|l| l.text.contains(text_contains));
    if !found {
        anyhow::bail!("no active learning containing {text_contains:?}");
    }
    Ok(())
}

/// Assert a learning with the given classification exists anywhere in
/// the store (active, inferred, or archived).
pub fn assert_has_classification(store: &Store, classification: Classification) -> Result<()> {
    let found = store.get_all().iter().any(|l| l.classification == classification);
    if !found {
        anyhow::bail!("no learning with classification {classification:?}");
    }
    Ok(())
}

/// Assert a JSON value (e.g. `doctor --format json` output) reports the
/// given count for a lifecycle state.
pub fn assert_state_count(json: &serde_json::Value, state: &str, expected: usize) -> Result<()> {
    let actual = json["state_counts"][state]
        .as_u64()
        .with_context(|| format!("missing state_counts.{state}"))?;
    if actual as usize != expected {
        anyhow::bail!("expected {expected} {state} learnings, got {actual}");
    }
    Ok(())
}
