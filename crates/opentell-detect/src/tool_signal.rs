use std::path::Path;

use opentell_types::{
    Area, Classification, DetectionMethod, Scope, Signal, SessionBuffer, ToolEvent, ToolEventKind,
};

use opentell_core::{PACKAGE_MANAGERS, TEST_RUNNERS};

const CONTEXT_EVENT_LIMIT: usize = 15;
const SUBSTITUTION_CONFIDENCE: f64 = 0.72;

fn leading_token(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

fn known_tool<'a>(token: &'a str, known: &[&str]) -> Option<&'a str> {
    known.iter().find(|k| **k == token).map(|_| token)
}

/// Detect structural substitutions in the current turn's buffered tool
/// events: package manager, test runner, file extension (spec.md §4.4).
pub fn detect(buffer: &SessionBuffer) -> Vec<Signal> {
    let events = buffer.events_since_last_stop();
    let mut signals = Vec::new();

    if let Some(signal) = detect_command_substitution(&events, PACKAGE_MANAGERS, Area::General) {
        signals.push(signal);
    }
    if let Some(signal) = detect_command_substitution(&events, TEST_RUNNERS, Area::Testing) {
        signals.push(signal);
    }
    if let Some(signal) = detect_extension_substitution(&events) {
        signals.push(signal);
    }

    signals
}

fn detect_command_substitution(
    events: &[&ToolEvent],
    known: &[&str],
    area: Area,
) -> Option<Signal> {
    let mut seen: Vec<&str> = Vec::new();
    for event in events {
        let ToolEventKind::Bash { command } = &event.kind else {
            continue;
        };
        let Some(token) = leading_token(command) else {
            continue;
        };
        let Some(tool) = known_tool(&token.to_lowercase(), known) else {
            continue;
        };
        if seen.last().map(|t| *t != tool).unwrap_or(false) {
            let previous = seen.last().copied().unwrap();
            return Some(
                Signal::new(
                    format!("Uses {tool} — not {previous}"),
                    SUBSTITUTION_CONFIDENCE,
                    Classification::Preference,
                    Scope::Repo,
                    area,
                    DetectionMethod::ToolPattern,
                )
                .with_evidence(String::new(), String::new()),
            );
        }
        if seen.last() != Some(&tool) {
            seen.push(tool);
        }
    }
    None
}

fn detect_extension_substitution(events: &[&ToolEvent]) -> Option<Signal> {
    use std::collections::HashMap;

    let mut by_base: HashMap<String, Vec<String>> = HashMap::new();
    for event in events {
        let path = match &event.kind {
            ToolEventKind::Write { path } | ToolEventKind::Edit { path } => path,
            ToolEventKind::Bash { .. } => continue,
        };
        let p = Path::new(path);
        let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("").to_string();
        let base = p
            .with_extension("")
            .to_string_lossy()
            .to_string();
        let exts = by_base.entry(base).or_default();
        if exts.last().map(|e| *e != ext).unwrap_or(true) && !ext.is_empty() {
            exts.push(ext);
        }
    }

    for exts in by_base.values() {
        if exts.len() >= 2 {
            let first = &exts[0];
            let last = exts.last().unwrap();
            if first != last {
                return Some(
                    Signal::new(
                        format!("Uses {last} files — not {first}"),
                        SUBSTITUTION_CONFIDENCE,
                        Classification::Preference,
                        Scope::Repo,
                        Area::General,
                        DetectionMethod::ToolPattern,
                    )
                    .with_evidence(String::new(), String::new()),
                );
            }
        }
    }

    None
}

/// Build a bounded multi-line string from the last `≤15` buffered tool
/// events, appended to the classifier prompt (spec.md §4.4).
pub fn format_tool_context(buffer: &SessionBuffer) -> String {
    buffer
        .tool_events
        .iter()
        .rev()
        .take(CONTEXT_EVENT_LIMIT)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|event| match &event.kind {
            ToolEventKind::Bash { command } => format!("bash: {command}"),
            ToolEventKind::Write { path } => format!("wrote: {path}"),
            ToolEventKind::Edit { path } => format!("edited: {path}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bash(buffer: &mut SessionBuffer, command: &str) {
        buffer.push_tool_event(ToolEvent {
            ts: Utc::now(),
            kind: ToolEventKind::Bash {
                command: command.to_string(),
            },
        });
    }

    #[test]
    fn package_manager_substitution_is_detected() {
        let mut buffer = SessionBuffer::new("s1");
        bash(&mut buffer, "npm install react");
        bash(&mut buffer, "pnpm install react");
        let signals = detect(&buffer);
        assert!(signals.iter().any(|s| s.text == "Uses pnpm — not npm"));
        assert_eq!(
            signals.iter().find(|s| s.text.contains("pnpm")).unwrap().confidence,
            0.72
        );
    }

    #[test]
    fn identical_consecutive_commands_are_not_a_substitution() {
        let mut buffer = SessionBuffer::new("s1");
        bash(&mut buffer, "pnpm install react");
        bash(&mut buffer, "pnpm test");
        let signals = detect(&buffer);
        assert!(signals.is_empty());
    }

    #[test]
    fn extension_substitution_is_detected() {
        let mut buffer = SessionBuffer::new("s1");
        buffer.push_tool_event(ToolEvent {
            ts: Utc::now(),
            kind: ToolEventKind::Write {
                path: "src/app.js".to_string(),
            },
        });
        buffer.push_tool_event(ToolEvent {
            ts: Utc::now(),
            kind: ToolEventKind::Write {
                path: "src/app.ts".to_string(),
            },
        });
        let signals = detect(&buffer);
        assert!(signals.iter().any(|s| s.text == "Uses ts files — not js"));
    }

    #[test]
    fn format_tool_context_caps_at_fifteen_events() {
        let mut buffer = SessionBuffer::new("s1");
        for i in 0..20 {
            bash(&mut buffer, &format!("echo {i}"));
        }
        let context = format_tool_context(&buffer);
        assert_eq!(context.lines().count(), CONTEXT_EVENT_LIMIT);
        assert!(context.contains("echo 19"));
        assert!(!context.contains("echo 0\n") && !context.ends_with("echo 0"));
    }
}
