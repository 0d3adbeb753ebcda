//! Sample transcript/learning generation for integration tests.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use opentell_types::{Area, Classification, DetectionMethod, Learning, Scope};

/// Write one minimal Claude-style transcript line (assistant then
/// developer message) to `path`, appending to any existing content.
pub fn append_transcript_pair(path: &Path, assistant_text: &str, developer_text: &str) -> Result<()> {
    use std::io::Write;

    let now = Utc::now().to_rfc3339();
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        r#"{{"role":"assistant","content":{},"timestamp":{:?}}}"#,
        serde_json::to_string(assistant_text)?,
        now
    )?;
    writeln!(
        file,
        r#"{{"role":"developer","content":{},"timestamp":{:?}}}"#,
        serde_json::to_string(developer_text)?,
        now
    )?;
    Ok(())
}

/// Build a learning with sensible defaults, for tests that need a
/// populated store without going through the detectors.
pub fn learning(text: &str, classification: Classification, confidence: f64) -> Learning {
    Learning::new(
        Uuid::new_v4(),
        text.to_string(),
        classification,
        confidence,
        Scope::Repo,
        Area::General,
        DetectionMethod::Regex,
        Utc::now(),
    )
}
