use chrono::Duration;
use opentell_types::{Classification, Learning};

const BOOST_THRESHOLD: usize = 3;
const UPGRADE1_THRESHOLD: usize = 4;
const UPGRADE2_THRESHOLD: usize = 5;
const BOOST_DELTA: f64 = 0.10;
const UPGRADE2_DELTA: f64 = 0.05;

/// Estimated session count from evidence timestamps (spec.md §4.7
/// fallback), used when `session_ids` is empty — e.g. learnings persisted
/// before the store started tracking session ids. A gap of more than 30
/// minutes between consecutive evidence records is treated as a session
/// boundary.
fn estimate_sessions_from_evidence(learning: &Learning) -> usize {
    let mut timestamps: Vec<_> = learning.evidence.iter().map(|e| e.recorded_at).collect();
    if timestamps.is_empty() {
        return 1;
    }
    timestamps.sort();
    let gap = Duration::minutes(30);
    let mut sessions = 1;
    for window in timestamps.windows(2) {
        if window[1] - window[0] > gap {
            sessions += 1;
        }
    }
    sessions
}

fn effective_session_count(learning: &Learning) -> usize {
    if learning.session_ids.is_empty() {
        estimate_sessions_from_evidence(learning)
    } else {
        learning.session_ids.len()
    }
}

/// Apply the boost and classification-upgrade rules to one learning based
/// on the number of distinct sessions it has been reinforced across
/// (spec.md §4.7). Each rule fires at most once per learning.
fn apply_thresholds(learning: &mut Learning) {
    let count = effective_session_count(learning);

    if count >= BOOST_THRESHOLD && !learning.cross_session_boosted {
        learning.confidence = (learning.confidence + BOOST_DELTA).min(1.0);
        learning.cross_session_boosted = true;
        learning.cross_session_count = Some(count as u32);
    }

    if count >= UPGRADE1_THRESHOLD
        && matches!(
            learning.classification,
            Classification::Preference | Classification::BehavioralGap
        )
        && learning.classification_upgraded_from.is_none()
    {
        learning.classification_upgraded_from = Some(learning.classification);
        learning.classification = Classification::QualityStandard;
    }

    if count >= UPGRADE2_THRESHOLD
        && learning.classification == Classification::QualityStandard
        && !learning.deep_pattern_upgrade
    {
        learning.classification = Classification::ThinkingPattern;
        learning.confidence = (learning.confidence + UPGRADE2_DELTA).min(1.0);
        learning.deep_pattern_upgrade = true;
    }
}

/// Run the cross-session analyzer over the whole learning set at
/// session-end. Session-id bookkeeping itself happens at insertion time
/// (`Store::add_candidate` / `Store::add_observation`); this pass only
/// evaluates the boost/upgrade thresholds against whatever `session_ids`
/// each learning has accumulated so far.
pub fn analyze(learnings: &mut [Learning]) {
    for learning in learnings.iter_mut() {
        if learning.archived || learning.promoted {
            continue;
        }
        apply_thresholds(learning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use opentell_types::{Area, DetectionMethod, Scope};
    use uuid::Uuid;

    fn learning_with_sessions(n: usize) -> Learning {
        let mut l = Learning::new(
            Uuid::new_v4(),
            "Prefers pnpm".to_string(),
            Classification::Preference,
            0.35,
            Scope::Repo,
            Area::General,
            DetectionMethod::Regex,
            Utc::now(),
        );
        for i in 0..n {
            l.session_ids.insert(format!("session-{i}"));
        }
        l
    }

    #[test]
    fn boosts_at_three_sessions() {
        let mut l = learning_with_sessions(3);
        let before = l.confidence;
        analyze(std::slice::from_mut(&mut l));
        assert!(l.cross_session_boosted);
        assert!((l.confidence - (before + BOOST_DELTA)).abs() < 1e-9);
    }

    #[test]
    fn upgrades_to_quality_standard_at_four_sessions() {
        let mut l = learning_with_sessions(4);
        analyze(std::slice::from_mut(&mut l));
        assert_eq!(l.classification, Classification::QualityStandard);
        assert_eq!(l.classification_upgraded_from, Some(Classification::Preference));
    }

    #[test]
    fn upgrades_to_thinking_pattern_at_five_sessions_in_one_pass() {
        let mut l = learning_with_sessions(5);
        analyze(std::slice::from_mut(&mut l));
        assert_eq!(l.classification, Classification::ThinkingPattern);
        assert!(l.deep_pattern_upgrade);
    }

    #[test]
    fn does_not_upgrade_below_threshold() {
        let mut l = learning_with_sessions(2);
        analyze(std::slice::from_mut(&mut l));
        assert!(!l.cross_session_boosted);
        assert_eq!(l.classification, Classification::Preference);
    }

    #[test]
    fn skips_archived_learnings() {
        let mut l = learning_with_sessions(5);
        l.archive("test");
        analyze(std::slice::from_mut(&mut l));
        assert_eq!(l.classification, Classification::Preference);
    }
}
