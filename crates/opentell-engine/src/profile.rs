use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use opentell_types::{thresholds::ACTIVATION, Classification, Learning, Profile};

const PROFILE_MAX_TOKENS: u32 = 600;
const MIN_ACTIVE_FOR_PROFILE: usize = 3;
const SESSIONS_SINCE_SYNTHESIS: u32 = 10;

fn active_learnings(learnings: &[Learning]) -> Vec<&Learning> {
    learnings.iter().filter(|l| l.is_active(ACTIVATION)).collect()
}

/// Checksum over the sorted `"{id}:{confidence}:{text}"` lines of every
/// active learning (spec.md §4.9), used to detect when the profile has
/// drifted from the underlying learning set.
pub fn checksum(learnings: &[Learning]) -> String {
    let mut lines: Vec<String> = active_learnings(learnings)
        .iter()
        .map(|l| format!("{}:{}:{}", l.id, l.confidence, l.text))
        .collect();
    lines.sort();
    let mut hasher = Sha256::new();
    hasher.update(lines.join("\n").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `profileNeedsUpdate` (spec.md §4.9): no profile yet, a checksum
/// mismatch, or enough sessions elapsed since the last synthesis.
pub fn needs_update(learnings: &[Learning], profile: Option<&Profile>, total_sessions: u32) -> bool {
    match profile {
        None => true,
        Some(p) => {
            p.checksum != checksum(learnings) || total_sessions.saturating_sub(p.session_count) >= SESSIONS_SINCE_SYNTHESIS
        }
    }
}

/// Group active learnings by classification in depth order (deepest
/// first), the shape the profile prompt expects (spec.md §4.9).
fn grouped_by_depth(learnings: &[&Learning]) -> Vec<(Classification, Vec<&Learning>)> {
    let order = [
        Classification::ThinkingPattern,
        Classification::DesignPrinciple,
        Classification::QualityStandard,
        Classification::BehavioralGap,
        Classification::Preference,
    ];
    order
        .into_iter()
        .filter_map(|c| {
            let members: Vec<&Learning> = learnings.iter().copied().filter(|l| l.classification == c).collect();
            if members.is_empty() {
                None
            } else {
                Some((c, members))
            }
        })
        .collect()
}

fn build_user_message(groups: &[(Classification, Vec<&Learning>)]) -> String {
    let mut msg = String::new();
    for (classification, members) in groups {
        msg.push_str(&format!("{}:\n", classification.as_str()));
        for l in members {
            msg.push_str(&format!("- {}\n", l.text));
        }
    }
    msg
}

/// Synthesize a new profile from the current active learning set (spec.md
/// §4.9). Returns `None` if fewer than 3 active learnings exist, or on any
/// classifier transport/parse failure.
pub fn synthesize(
    client: &reqwest::blocking::Client,
    api_key: &str,
    model: &str,
    learnings: &[Learning],
    total_sessions: u32,
    now: DateTime<Utc>,
) -> Option<Profile> {
    let active = active_learnings(learnings);
    if active.len() < MIN_ACTIVE_FOR_PROFILE {
        return None;
    }

    let groups = grouped_by_depth(&active);
    let user_message = build_user_message(&groups);

    let text = opentell_classifier::synthesize(
        client,
        api_key,
        model,
        opentell_classifier::prompts::PROFILE_PROMPT,
        &user_message,
        PROFILE_MAX_TOKENS,
    )?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    Some(Profile {
        text,
        generated_at: now,
        learning_count: active.len(),
        session_count: total_sessions,
        checksum: checksum(learnings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentell_types::{Area, DetectionMethod, Scope};
    use uuid::Uuid;

    fn learning(text: &str, confidence: f64, classification: Classification) -> Learning {
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

    #[test]
    fn checksum_is_stable_for_identical_input() {
        let learnings = vec![learning("Prefers pnpm", 0.5, Classification::Preference)];
        assert_eq!(checksum(&learnings), checksum(&learnings));
    }

    #[test]
    fn needs_update_when_no_profile_exists() {
        let learnings = vec![learning("Prefers pnpm", 0.5, Classification::Preference)];
        assert!(needs_update(&learnings, None, 1));
    }

    #[test]
    fn does_not_need_update_when_checksum_and_sessions_match() {
        let learnings = vec![learning("Prefers pnpm", 0.5, Classification::Preference)];
        let profile = Profile {
            text: "x".to_string(),
            generated_at: Utc::now(),
            learning_count: 1,
            session_count: 5,
            checksum: checksum(&learnings),
        };
        assert!(!needs_update(&learnings, Some(&profile), 6));
    }

    #[test]
    fn groups_by_depth_order() {
        let learnings = vec![
            learning("a", 0.5, Classification::Preference),
            learning("b", 0.5, Classification::ThinkingPattern),
        ];
        let active: Vec<&Learning> = learnings.iter().collect();
        let groups = grouped_by_depth(&active);
        assert_eq!(groups[0].0, Classification::ThinkingPattern);
        assert_eq!(groups[1].0, Classification::Preference);
    }
}
