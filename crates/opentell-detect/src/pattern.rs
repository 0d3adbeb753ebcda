use opentell_core::normalize_core;
use opentell_types::{DetectionMethod, Pair, Signal};

use crate::noise::is_noise;
use crate::rules::all_rules;

/// Output of the pattern detector for one pair (spec.md §4.3).
pub struct DetectResult {
    pub detected: bool,
    pub signals: Vec<Signal>,
    pub noise: bool,
}

/// Scan a pair's developer side against the fixed rule tables, dedup the
/// results, and report whether the pair was noise, matched, or ambiguous.
pub fn detect(pair: &Pair) -> DetectResult {
    if is_noise(&pair.developer_text) {
        return DetectResult {
            detected: false,
            signals: Vec::new(),
            noise: true,
        };
    }

    let mut raw: Vec<Signal> = Vec::new();
    for family in all_rules() {
        for rule in family.iter() {
            if let Some(text) = rule.apply(&pair.developer_text) {
                raw.push(
                    Signal::new(
                        text,
                        rule.confidence,
                        rule.classification,
                        opentell_types::Scope::Repo,
                        rule.area,
                        DetectionMethod::Regex,
                    )
                    .with_evidence(pair.assistant_text.clone(), pair.developer_text.clone()),
                );
            }
        }
    }

    let signals = dedup_by_core(raw);

    DetectResult {
        detected: !signals.is_empty(),
        signals,
        noise: false,
    }
}

/// Group signals by normalized core, keeping the highest-confidence (ties
/// broken by longer text) representative of each group (spec.md §4.3).
fn dedup_by_core(signals: Vec<Signal>) -> Vec<Signal> {
    let mut best: Vec<(String, Signal)> = Vec::new();

    for signal in signals {
        let core = normalize_core(&signal.text);
        match best.iter_mut().find(|(c, _)| *c == core) {
            Some((_, existing)) => {
                let replace = signal.confidence > existing.confidence
                    || (signal.confidence == existing.confidence
                        && signal.text.len() > existing.text.len());
                if replace {
                    *existing = signal;
                }
            }
            None => best.push((core, signal)),
        }
    }

    best.into_iter().map(|(_, s)| s).collect()
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
    fn correction_yields_preference_signal() {
        let result = detect(&pair("I'll install with npm", "no, use pnpm"));
        assert!(result.detected);
        assert_eq!(result.signals.len(), 1);
        assert_eq!(result.signals[0].text, "Prefers pnpm");
        assert_eq!(result.signals[0].confidence, 0.35);
    }

    #[test]
    fn noise_short_circuits_detection() {
        let result = detect(&pair("Done.", "thanks"));
        assert!(result.noise);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn no_match_and_no_noise_is_ambiguous() {
        let result = detect(&pair(
            "The refactor touches three modules.",
            "let's see how the deploy pipeline handles this edge case",
        ));
        assert!(!result.detected);
        assert!(!result.noise);
    }

    #[test]
    fn duplicate_signals_from_multiple_rules_are_collapsed() {
        let result = detect(&pair("Installing now", "use pnpm instead"));
        assert_eq!(result.signals.len(), 1);
    }
}
