use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-wide bookkeeping carried alongside the learning set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub last_consolidation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub consolidation_session: Option<u32>,
}

/// A single narrative paragraph summarizing the developer, synthesized from
/// all active learnings (spec.md §3, §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub text: String,
    pub generated_at: DateTime<Utc>,
    pub learning_count: usize,
    pub session_count: u32,
    pub checksum: String,
}
