use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use opentell_types::Pair;

use crate::error::Result;
use crate::schema::{RawRecord, Role};

/// Records with this many characters of text or fewer are dropped
/// (spec.md §4.2).
const MIN_TEXT_CHARS: usize = 3;

struct KeptRecord {
    role: Role,
    text: String,
    at: chrono::DateTime<Utc>,
}

fn read_kept_records(path: &Path) -> Result<Vec<KeptRecord>> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut kept = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Malformed lines are skipped, never propagated (spec.md §4.2).
        let Ok(record) = serde_json::from_str::<RawRecord>(trimmed) else {
            continue;
        };

        if !(record.role.is_assistant() || record.role.is_developer()) {
            continue;
        }

        let text = record.content.extract_text().trim().to_string();
        if text.chars().count() <= MIN_TEXT_CHARS {
            continue;
        }

        kept.push(KeptRecord {
            role: record.role,
            text,
            at: record.timestamp.unwrap_or_else(Utc::now),
        });
    }

    Ok(kept)
}

/// Parse the host's turn log into ordered (assistant, developer) pairs,
/// produced whenever an assistant record is immediately followed by a
/// developer record in the kept (post-filter) sequence.
pub fn read_pairs(path: &Path) -> Result<Vec<Pair>> {
    let kept = read_kept_records(path)?;
    let mut pairs = Vec::new();

    for window in kept.windows(2) {
        let [a, b] = window else { continue };
        if a.role.is_assistant() && b.role.is_developer() {
            pairs.push(Pair {
                assistant_text: a.text.clone(),
                developer_text: b.text.clone(),
                assistant_at: a.at,
                developer_at: b.at,
            });
        }
    }

    Ok(pairs)
}

/// The last `n` pairs, per spec.md §4.2 ("the last N pairs can be
/// requested").
pub fn read_last_pairs(path: &Path, n: usize) -> Result<Vec<Pair>> {
    let mut pairs = read_pairs(path)?;
    if pairs.len() > n {
        pairs.drain(0..pairs.len() - n);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_transcript(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f
    }

    #[test]
    fn pairs_adjacent_assistant_then_developer() {
        let f = write_transcript(&[
            r#"{"role":"assistant","content":"I'll install with npm"}"#,
            r#"{"role":"developer","content":"no, use pnpm instead"}"#,
        ]);
        let pairs = read_pairs(f.path()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].assistant_text, "I'll install with npm");
        assert_eq!(pairs[0].developer_text, "no, use pnpm instead");
    }

    #[test]
    fn short_records_are_dropped() {
        let f = write_transcript(&[
            r#"{"role":"assistant","content":"ok"}"#,
            r#"{"role":"developer","content":"thanks"}"#,
        ]);
        let pairs = read_pairs(f.path()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let f = write_transcript(&[
            "{not valid json",
            r#"{"role":"assistant","content":"Let's use pnpm here"}"#,
            r#"{"role":"developer","content":"sounds good to me"}"#,
        ]);
        let pairs = read_pairs(f.path()).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn tool_blocks_are_stripped_from_content() {
        let f = write_transcript(&[
            r#"{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"Bash"},{"type":"text","text":"Running the tests now"}]}"#,
            r#"{"role":"developer","content":"looks right, thank you"}"#,
        ]);
        let pairs = read_pairs(f.path()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].assistant_text, "Running the tests now");
    }

    #[test]
    fn assistant_without_following_developer_yields_no_pair() {
        let f = write_transcript(&[
            r#"{"role":"assistant","content":"Here is the plan for the refactor"}"#,
            r#"{"role":"assistant","content":"Let me also check the tests directory"}"#,
        ]);
        let pairs = read_pairs(f.path()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn read_last_pairs_truncates_to_tail() {
        let mut lines = Vec::new();
        for i in 0..6 {
            lines.push(format!(
                r#"{{"role":"assistant","content":"assistant turn number {i}"}}"#
            ));
            lines.push(format!(
                r#"{{"role":"developer","content":"developer reply number {i}"}}"#
            ));
        }
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let f = write_transcript(&refs);
        let pairs = read_last_pairs(f.path(), 3).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs[2].developer_text.contains("number 5"));
    }

    #[test]
    fn missing_file_errors_but_does_not_panic() {
        let result = read_pairs(Path::new("/nonexistent/path/transcript.jsonl"));
        assert!(result.is_err());
    }
}
