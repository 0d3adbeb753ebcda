use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One line of the host's turn log. `content` may be a bare string or a
/// list of content blocks; only text blocks survive normalization
/// (spec.md §4.2).
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub role: Role,
    pub content: RawContent,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    Developer,
    /// Some hosts use "user" rather than "developer" for the human side;
    /// normalized to the same role downstream.
    User,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_developer(self) -> bool {
        matches!(self, Role::Developer | Role::User)
    }

    pub fn is_assistant(self) -> bool {
        matches!(self, Role::Assistant)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl RawContent {
    /// Concatenate all text blocks, discarding tool-call/tool-result blocks.
    pub fn extract_text(&self) -> String {
        match self {
            RawContent::Text(s) => s.clone(),
            RawContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
