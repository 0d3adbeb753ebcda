use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use opentell_types::{Area, Classification, DetectionMethod, Pair, Scope, Signal};

const SCAN_LIMIT: usize = 1000;
const MIN_EXTRACT_LEN: usize = 5;
const MAX_EXTRACT_LEN: usize = 150;
const VALIDATED_CONFIDENCE: f64 = 0.45;
const MAX_DEVELOPER_LEN: usize = 80;

const GENERIC_DENY_LIST: &[&str] = &["it", "this", "that", "the same thing", "this way"];

struct ObserverRule {
    name: &'static str,
    regex: Regex,
    confidence: f64,
}

static OBSERVER_RULES: Lazy<Vec<ObserverRule>> = Lazy::new(|| {
    vec![
        ObserverRule {
            name: "self_adaptation",
            regex: Regex::new(
                r"(?i)I'?ll use\s+(.+?)\s+since\s+the\s+(?:project|team)\s+(?:already\s+)?uses\s+(?:it|the\s+same)(.*)",
            )
            .unwrap(),
            confidence: 0.25,
        },
        ObserverRule {
            name: "since_project_uses",
            regex: Regex::new(r"(?i)using\s+(.+?)\s+since\s+the\s+project\s+already\s+uses(.*)").unwrap(),
            confidence: 0.22,
        },
        ObserverRule {
            name: "project_observation",
            regex: Regex::new(r"(?i)I\s+(?:notice|see|observe)\s+the\s+project\s+uses\s+(.+)").unwrap(),
            confidence: 0.20,
        },
        ObserverRule {
            name: "follow_same",
            regex: Regex::new(r"(?i)follow(?:ing)?\s+the\s+same\s+(.+?)\s+as").unwrap(),
            confidence: 0.18,
        },
        ObserverRule {
            name: "matching_existing",
            regex: Regex::new(r"(?i)matching\s+(?:the\s+)?existing\s+(.+)").unwrap(),
            confidence: 0.16,
        },
        ObserverRule {
            name: "based_on_existing",
            regex: Regex::new(r"(?i)based\s+on\s+(?:the\s+)?existing\s+(.+)").unwrap(),
            confidence: 0.15,
        },
    ]
});

static REJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:no|nope|not quite|actually|instead|rather than)\b").unwrap());

static AFFIRMATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:yes|yeah|exactly|correct|right|good catch|that's it|perfect)\b").unwrap()
});

/// Merge the object clause (group 1) with any trailing modifier (group 2)
/// a rule's regex captured after the "...uses it" anchor, so a short tool
/// name like "pnpm" survives as the full object phrase ("pnpm for
/// installs") instead of being truncated at the anchor and then rejected
/// by the minimum-length floor.
fn first_group(caps: &Captures) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(m) = caps.get(1) {
        let t = m.as_str().trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }
    if let Some(m) = caps.get(2) {
        let t = m.as_str().trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn classify_extract(text: &str) -> (Classification, Area) {
    let lower = text.to_lowercase();
    if ["architecture", "layered", "modular", "separation"]
        .iter()
        .any(|k| lower.contains(k))
    {
        (Classification::DesignPrinciple, Area::Architecture)
    } else if ["test", "lint", "format", "type-check", "validation"]
        .iter()
        .any(|k| lower.contains(k))
    {
        (Classification::QualityStandard, Area::Testing)
    } else {
        (Classification::Preference, Area::General)
    }
}

/// Candidate observations extracted from the assistant's own reasoning,
/// scanning only the first 1000 characters (spec.md §4.5).
pub fn detect_observations(assistant_text: &str) -> Vec<Signal> {
    let scanned: String = assistant_text.chars().take(SCAN_LIMIT).collect();
    let mut signals = Vec::new();

    for rule in OBSERVER_RULES.iter() {
        let Some(caps) = rule.regex.captures(&scanned) else {
            continue;
        };
        let Some(extract) = first_group(&caps) else {
            continue;
        };
        let extract = extract.trim().trim_end_matches(['.', ',', '!', ';']).to_string();
        if extract.len() < MIN_EXTRACT_LEN || extract.len() > MAX_EXTRACT_LEN {
            continue;
        }
        if GENERIC_DENY_LIST.contains(&extract.to_lowercase().as_str()) {
            continue;
        }

        let (classification, area) = classify_extract(&extract);
        signals.push(
            Signal::new(
                format!("Uses {extract}"),
                rule.confidence,
                classification,
                Scope::Repo,
                area,
                DetectionMethod::ClaudeObservation,
            )
            .with_evidence(assistant_text.to_string(), String::new()),
        );
    }

    signals
}

/// The highest-confidence observation in a set, if any.
fn highest_confidence(signals: Vec<Signal>) -> Option<Signal> {
    signals
        .into_iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
}

/// A validated observation: the developer's short affirming reply confirms
/// an observation the assistant made about the project (spec.md §4.5).
pub fn detect_validated(pair: &Pair) -> Option<Signal> {
    let developer = pair.developer_text.trim();
    if developer.chars().count() > MAX_DEVELOPER_LEN {
        return None;
    }
    if REJECTION.is_match(developer) {
        return None;
    }
    if !AFFIRMATION.is_match(developer) {
        return None;
    }

    let observations = detect_observations(&pair.assistant_text);
    let best = highest_confidence(observations)?;

    Some(Signal {
        confidence: VALIDATED_CONFIDENCE,
        detection_method: DetectionMethod::ValidatedObservation,
        evidence_user: pair.developer_text.clone(),
        ..best
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pair(assistant: &str, developer: &str) -> Pair {
        let now = Utc::now();
        Pair {
            assistant_text: assistant.to_string(),
            developer_text: developer.to_string(),
            assistant_at: now,
            developer_at: now,
        }
    }

    #[test]
    fn detects_self_adaptation_observation() {
        let signals =
            detect_observations("I'll use pnpm since the project already uses it for installs");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].confidence, 0.25);
    }

    #[test]
    fn validated_requires_short_affirmation_and_observation() {
        let p = pair(
            "I'll use pnpm since the project already uses it for installs",
            "yes exactly",
        );
        let signal = detect_validated(&p).unwrap();
        assert_eq!(signal.confidence, 0.45);
        assert_eq!(
            signal.detection_method,
            DetectionMethod::ValidatedObservation
        );
    }

    #[test]
    fn validated_rejects_rejection_language() {
        let p = pair(
            "I'll use pnpm since the project already uses it for installs",
            "no, that's not right",
        );
        assert!(detect_validated(&p).is_none());
    }

    #[test]
    fn validated_requires_an_underlying_observation() {
        let p = pair("Here's the refactor.", "yes exactly");
        assert!(detect_validated(&p).is_none());
    }
}
