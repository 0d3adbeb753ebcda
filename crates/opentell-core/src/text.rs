use std::collections::HashSet;

/// The leading verb a learning's text is framed with — used both for
/// duplicate detection (spec.md §4.1) and contradiction detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Uses,
    Avoids,
    Prefers,
    Other,
}

impl Prefix {
    /// Two prefixes are compatible unless one is `Avoids` and the other is
    /// `Uses` (spec.md §4.1 "avoids↔uses is a contradiction").
    pub fn contradicts(self, other: Prefix) -> bool {
        matches!(
            (self, other),
            (Prefix::Avoids, Prefix::Uses) | (Prefix::Uses, Prefix::Avoids)
        )
    }
}

/// Detect a learning text's leading prefix.
pub fn text_prefix(text: &str) -> Prefix {
    let lower = text.trim().to_lowercase();
    if lower.starts_with("uses ") {
        Prefix::Uses
    } else if lower.starts_with("avoids ") {
        Prefix::Avoids
    } else if lower.starts_with("prefers ") {
        Prefix::Prefers
    } else {
        Prefix::Other
    }
}

/// Strip the leading conventional prefix and the tail after an em-dash,
/// lowercase and collapse whitespace — the normalized "core" two learnings
/// are compared on (spec.md §4.1).
pub fn normalize_core(text: &str) -> String {
    let mut s = text.trim();

    for prefix in ["uses ", "avoids ", "prefers "] {
        if s.to_lowercase().starts_with(prefix) {
            s = &s[prefix.len()..];
            break;
        }
    }

    let s = match s.find('—') {
        Some(idx) => &s[..idx],
        None => s,
    };

    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity over whitespace-tokenized, lowercased words.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Two learning texts are duplicates iff their normalized cores are
/// identical or similar (>0.7 Jaccard) AND their prefixes don't contradict
/// (spec.md §4.1).
pub fn is_duplicate(a: &str, b: &str) -> bool {
    let core_a = normalize_core(a);
    let core_b = normalize_core(b);
    let prefix_a = text_prefix(a);
    let prefix_b = text_prefix(b);

    if prefix_a.contradicts(prefix_b) {
        return false;
    }

    core_a == core_b || jaccard_similarity(&core_a, &core_b) > 0.7
}

/// Word-bounded substring containment check, used by contradiction rule #1
/// ("X instead of Y" where Y word-bounded-appears in an existing core).
pub fn contains_word_bounded(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    for (idx, _) in haystack.match_indices(&needle) {
        let before_ok = idx == 0
            || !haystack[..idx]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after_idx = idx + needle.len();
        let after_ok = after_idx >= haystack.len()
            || !haystack[after_idx..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_core_strips_prefix_and_em_dash_tail() {
        assert_eq!(normalize_core("Uses pnpm — not npm"), "pnpm");
        assert_eq!(normalize_core("Prefers concise responses"), "concise responses");
        assert_eq!(normalize_core("Avoids global state"), "global state");
    }

    #[test]
    fn jaccard_similarity_identical_is_one() {
        assert_eq!(jaccard_similarity("uses pnpm", "uses pnpm"), 1.0);
    }

    #[test]
    fn jaccard_similarity_disjoint_is_zero() {
        assert_eq!(jaccard_similarity("uses pnpm", "avoids yarn totally"), 0.0);
    }

    #[test]
    fn duplicate_detects_near_identical_cores() {
        assert!(is_duplicate("Uses pnpm for installs", "Uses pnpm for all installs"));
    }

    #[test]
    fn duplicate_rejects_cores_below_threshold() {
        assert!(!is_duplicate("Uses pnpm", "Uses pnpm for installs"));
    }

    #[test]
    fn duplicate_rejects_contradicting_prefixes() {
        assert!(!is_duplicate("Uses jest", "Avoids jest"));
    }

    #[test]
    fn contains_word_bounded_respects_boundaries() {
        assert!(contains_word_bounded("uses npm for installs", "npm"));
        assert!(!contains_word_bounded("uses npmrc for config", "npm"));
    }
}
