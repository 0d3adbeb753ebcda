use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use opentell_core::atomic::write_atomic;

/// Per `(call_kind, month)` aggregate (spec.md §6 `stats.json`). Token and
/// cost totals are approximated from message length rather than the
/// API's own usage field, since the classifier client keeps its response
/// model to just the fields spec.md §6 names (`content[].text`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallStats {
    pub count: u64,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub estimated_cost_usd: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub by_kind_and_month: HashMap<String, CallStats>,
}

/// Rough cost model: Claude-family pricing is on the order of a few
/// dollars per million tokens; $3/$15 per million input/output tokens is
/// used as a representative estimate.
const INPUT_COST_PER_TOKEN: f64 = 3.0 / 1_000_000.0;
const OUTPUT_COST_PER_TOKEN: f64 = 15.0 / 1_000_000.0;
const CHARS_PER_TOKEN: usize = 4;

pub fn load(path: &Path) -> Stats {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
        Err(_) => Stats::default(),
    }
}

pub fn save(path: &Path, stats: &Stats) {
    let Ok(json) = serde_json::to_string_pretty(stats) else {
        return;
    };
    if let Err(err) = write_atomic(path, json.as_bytes()) {
        tracing::warn!(error = %err, "failed to write stats.json");
    }
}

/// Record one classifier/synthesis call under the current month, keyed by
/// `kind` (e.g. "classify", "consolidate", "profile").
pub fn record_call(path: &Path, kind: &str, input_chars: usize, output_chars: usize) {
    let mut stats = load(path);
    let month = Utc::now().format("%Y-%m").to_string();
    let key = format!("{kind}:{month}");
    let entry = stats.by_kind_and_month.entry(key).or_default();

    let input_tokens = (input_chars / CHARS_PER_TOKEN) as u64;
    let output_tokens = (output_chars / CHARS_PER_TOKEN) as u64;
    entry.count += 1;
    entry.estimated_input_tokens += input_tokens;
    entry.estimated_output_tokens += output_tokens;
    entry.estimated_cost_usd +=
        input_tokens as f64 * INPUT_COST_PER_TOKEN + output_tokens as f64 * OUTPUT_COST_PER_TOKEN;

    save(path, &stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_accumulate_within_the_same_month() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        record_call(&path, "classify", 400, 100);
        record_call(&path, "classify", 400, 100);
        let stats = load(&path);
        let month = Utc::now().format("%Y-%m").to_string();
        let entry = stats.by_kind_and_month.get(&format!("classify:{month}")).unwrap();
        assert_eq!(entry.count, 2);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let stats = load(&dir.path().join("missing.json"));
        assert!(stats.by_kind_and_month.is_empty());
    }
}
