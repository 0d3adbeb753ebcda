use once_cell::sync::Lazy;
use regex::Regex;

use opentell_core::{classify_tool, contains_word_bounded, jaccard_similarity, normalize_core};
use opentell_types::Learning;

const CONTRADICTION_SIMILARITY: f64 = 0.6;

/// Style-opposite pairs (spec.md §4.1 contradiction rule 3): two regexes
/// that, if matched by different learnings' cores, signal a stylistic
/// reversal rather than a reinforcement.
static STYLE_OPPOSITES: Lazy<Vec<(Regex, Regex)>> = Lazy::new(|| {
    vec![
        (re(r"concise"), re(r"verbose")),
        (re(r"code[- ]first"), re(r"explain[- ]more|more explanation")),
        (re(r"(?:no|minimal)[- ]comments"), re(r"more comments")),
        (re(r"\bfunctional\b"), re(r"\bclass(?:es)?\b")),
        (re(r"named[- ]export"), re(r"default[- ]export")),
        (re(r"strict[- ]typ"), re(r"no[- ]typ")),
        (re(r"simplicity"), re(r"future[- ]proof")),
        (re(r"prototype[- ]first"), re(r"plan[- ]first")),
    ]
});

fn re(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("style-opposite regex must compile")
}

/// Outcome of scanning existing learnings for a contradiction against a new
/// candidate text.
pub struct Contradiction {
    pub reason: String,
}

/// Rule 1: "X instead of Y" where Y word-bounded-appears in an existing core.
fn rule_instead_of(new_text: &str, existing_core: &str) -> bool {
    let lower = new_text.to_lowercase();
    if let Some(idx) = lower.find(" instead of ") {
        let y = &lower[idx + " instead of ".len()..];
        return contains_word_bounded(existing_core, y.trim());
    }
    false
}

/// Rule 2: same tool category, different tool name.
fn rule_tool_category_clash(new_core: &str, existing_core: &str) -> bool {
    let new_tokens: Vec<&str> = new_core.split_whitespace().collect();
    let existing_tokens: Vec<&str> = existing_core.split_whitespace().collect();

    for new_tok in &new_tokens {
        let Some(new_cat) = classify_tool(new_tok) else {
            continue;
        };
        for existing_tok in &existing_tokens {
            if new_tok == existing_tok {
                continue;
            }
            if classify_tool(existing_tok) == Some(new_cat) {
                return true;
            }
        }
    }
    false
}

/// Rule 3: style opposites.
fn rule_style_opposite(new_core: &str, existing_core: &str) -> bool {
    STYLE_OPPOSITES.iter().any(|(a, b)| {
        (a.is_match(new_core) && b.is_match(existing_core))
            || (b.is_match(new_core) && a.is_match(existing_core))
    })
}

/// Rule 4: "avoids X" matches an existing "uses X" core (similarity > 0.6).
fn rule_avoids_uses_clash(new_text: &str, new_core: &str, existing_text: &str, existing_core: &str) -> bool {
    let new_is_avoids = new_text.to_lowercase().trim_start().starts_with("avoids ");
    let existing_is_uses = existing_text.to_lowercase().trim_start().starts_with("uses ");
    let existing_is_avoids = existing_text.to_lowercase().trim_start().starts_with("avoids ");
    let new_is_uses = new_text.to_lowercase().trim_start().starts_with("uses ");

    let one_avoids_other_uses =
        (new_is_avoids && existing_is_uses) || (existing_is_avoids && new_is_uses);

    one_avoids_other_uses && jaccard_similarity(new_core, existing_core) > CONTRADICTION_SIMILARITY
}

/// Scan `candidates` for a learning that contradicts `new_text`, per
/// spec.md §4.1's four contradiction rules.
pub fn find_contradictions<'a>(new_text: &str, candidates: &'a [Learning]) -> Vec<&'a Learning> {
    let new_core = normalize_core(new_text);
    candidates
        .iter()
        .filter(|l| !l.archived && !l.promoted)
        .filter(|l| {
            let existing_core = normalize_core(&l.text);
            rule_instead_of(new_text, &existing_core)
                || rule_tool_category_clash(&new_core, &existing_core)
                || rule_style_opposite(&new_core, &existing_core)
                || rule_avoids_uses_clash(new_text, &new_core, &l.text, &existing_core)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use opentell_types::{Area, Classification, DetectionMethod, Scope};
    use uuid::Uuid;

    fn learning(text: &str) -> Learning {
        Learning::new(
            Uuid::new_v4(),
            text.to_string(),
            Classification::Preference,
            0.35,
            Scope::Repo,
            Area::General,
            DetectionMethod::Regex,
            Utc::now(),
        )
    }

    #[test]
    fn detects_tool_category_clash() {
        let existing = vec![learning("Uses jest for tests")];
        let found = find_contradictions("Uses vitest for tests", &existing);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn detects_style_opposite() {
        let existing = vec![learning("Prefers concise responses")];
        let found = find_contradictions("Prefers verbose responses", &existing);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn detects_avoids_uses_clash() {
        let existing = vec![learning("Uses global state")];
        let found = find_contradictions("Avoids global state entirely", &existing);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn no_contradiction_for_unrelated_text() {
        let existing = vec![learning("Uses jest for tests")];
        let found = find_contradictions("Prefers concise responses", &existing);
        assert!(found.is_empty());
    }
}
