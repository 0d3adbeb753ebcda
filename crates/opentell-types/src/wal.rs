use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ambiguous pair awaiting language-model classification (spec.md §3).
/// Serialized as one JSON object per line in `wal.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalEntry {
    pub claude_said: String,
    pub user_said: String,
    #[serde(default)]
    pub error_context: Option<String>,
    #[serde(default)]
    pub tool_context: Option<String>,
    pub written_at: DateTime<Utc>,
}
