use std::collections::HashMap;

use opentell_core::StatePaths;
use opentell_store::Store;
use opentell_types::LearningState;

/// Health of one state file opentell depends on.
#[derive(Debug, Clone)]
pub enum CheckStatus {
    Ok,
    Missing,
    Unparseable(String),
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
}

/// Full `doctor` report (spec.md §10): per-file integrity plus a count of
/// learnings in each lifecycle state.
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub state_counts: HashMap<&'static str, usize>,
    pub total_sessions: u32,
}

fn check_json_file(name: &'static str, path: &std::path::Path) -> CheckResult {
    if !path.exists() {
        return CheckResult { name, status: CheckStatus::Missing };
    }
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => CheckResult { name, status: CheckStatus::Ok },
        Ok(contents) => match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(_) => CheckResult { name, status: CheckStatus::Ok },
            Err(err) => CheckResult { name, status: CheckStatus::Unparseable(err.to_string()) },
        },
        Err(err) => CheckResult { name, status: CheckStatus::Unparseable(err.to_string()) },
    }
}

fn check_wal_file(path: &std::path::Path) -> CheckResult {
    if !path.exists() {
        return CheckResult { name: "wal.jsonl", status: CheckStatus::Missing };
    }
    let Ok(contents) = std::fs::read_to_string(path) else {
        return CheckResult { name: "wal.jsonl", status: CheckStatus::Unparseable("unreadable".to_string()) };
    };
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        if let Err(err) = serde_json::from_str::<opentell_types::WalEntry>(line) {
            return CheckResult { name: "wal.jsonl", status: CheckStatus::Unparseable(err.to_string()) };
        }
    }
    CheckResult { name: "wal.jsonl", status: CheckStatus::Ok }
}

fn state_name(state: LearningState) -> &'static str {
    match state {
        LearningState::Candidate => "candidate",
        LearningState::Active => "active",
        LearningState::Inferred => "inferred",
        LearningState::Terminal => "terminal",
    }
}

/// `doctor` (spec.md §10): validate every state file's integrity and
/// summarize the learning population by lifecycle state. Never fails —
/// integrity problems are reported, not propagated.
pub fn run(paths: &StatePaths) -> DoctorReport {
    let checks = vec![
        check_json_file("config.json", &paths.config()),
        check_json_file("learnings.json", &paths.learnings()),
        check_wal_file(&paths.wal()),
        check_json_file("profile.json", &paths.profile()),
        check_json_file("stats.json", &paths.stats()),
    ];

    let store = Store::load(paths.clone());
    let mut state_counts: HashMap<&'static str, usize> = HashMap::new();
    state_counts.insert("candidate", 0);
    state_counts.insert("active", 0);
    state_counts.insert("inferred", 0);
    state_counts.insert("terminal", 0);
    for learning in store.get_all() {
        *state_counts.entry(state_name(learning.state())).or_insert(0) += 1;
    }

    DoctorReport { checks, state_counts, total_sessions: store.total_sessions() }
}
