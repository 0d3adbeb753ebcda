use crate::classification::{Certainty, Classification};

/// Confidence at or above which a non-inferred, non-terminal learning is
/// "active" and eligible for injection.
pub const ACTIVATION: f64 = 0.45;

/// Confidence at or above which an active learning becomes promotable,
/// subject also to `PROMOTION_MIN_EVIDENCE`.
pub const PROMOTION: f64 = 0.80;

/// Minimum `evidence_count` for promotion, alongside `PROMOTION`.
pub const PROMOTION_MIN_EVIDENCE: u32 = 4;

/// Confidence below which a learning is archived (by decay or contradiction
/// review).
pub const ARCHIVE: f64 = 0.15;

/// Hard ceiling on the confidence of any learning still flagged `inferred`
/// (invariant I4).
pub const INFERRED_CAP: f64 = 0.44;

/// Unconditional per-insert reinforcement delta applied by the store.
///
/// spec.md §9 flags a discrepancy here: the host's documented UX describes
/// +0.08 for a same-session reinforcement and +0.15 for a new-session one,
/// but the store itself applies +0.15 unconditionally on every reinforcing
/// insert, leaving session-uniqueness bookkeeping to the cross-session
/// analyzer. This constant reflects the store's actual, unconditional rule;
/// see DESIGN.md for the recorded decision not to guess a reconciliation.
pub const REINFORCEMENT_DELTA: f64 = 0.15;

/// Starting confidence for a newly created learning, keyed by
/// `(classification, certainty)` per spec.md §4.1.
pub fn starting_confidence(classification: Classification, certainty: Certainty) -> f64 {
    use Certainty::{High, Low};
    use Classification::*;
    match (classification, certainty) {
        (ThinkingPattern, High) | (DesignPrinciple, High) => 0.38,
        (ThinkingPattern, Low) | (DesignPrinciple, Low) => 0.28,
        (QualityStandard, High) | (Preference, High) => 0.35,
        (QualityStandard, Low) | (Preference, Low) => 0.25,
        (BehavioralGap, High) => 0.30,
        (BehavioralGap, Low) => 0.20,
    }
}

/// Per-component evidence/buffer bounds (spec.md §5 "Back-pressure").
pub const EVIDENCE_RING_CAP: usize = 10;
pub const TOOL_EVENT_BUFFER_CAP: usize = 100;
pub const ANALYZED_FINGERPRINT_CAP: usize = 200;
pub const WAL_DRAIN_CAP: usize = 10;
pub const TRANSCRIPT_TAIL_PAIRS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Certainty::{High, Low};
    use crate::classification::Classification::*;

    #[test]
    fn starting_confidence_matrix_matches_spec() {
        assert_eq!(starting_confidence(ThinkingPattern, High), 0.38);
        assert_eq!(starting_confidence(ThinkingPattern, Low), 0.28);
        assert_eq!(starting_confidence(DesignPrinciple, High), 0.38);
        assert_eq!(starting_confidence(DesignPrinciple, Low), 0.28);
        assert_eq!(starting_confidence(QualityStandard, High), 0.35);
        assert_eq!(starting_confidence(QualityStandard, Low), 0.25);
        assert_eq!(starting_confidence(Preference, High), 0.35);
        assert_eq!(starting_confidence(Preference, Low), 0.25);
        assert_eq!(starting_confidence(BehavioralGap, High), 0.30);
        assert_eq!(starting_confidence(BehavioralGap, Low), 0.20);
    }

    #[test]
    fn depth_order_matches_spec() {
        assert_eq!(ThinkingPattern.depth(), 5);
        assert_eq!(DesignPrinciple.depth(), 4);
        assert_eq!(QualityStandard.depth(), 3);
        assert_eq!(Preference.depth(), 1);
        assert_eq!(BehavioralGap.depth(), 2);
    }
}
