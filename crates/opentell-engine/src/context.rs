use std::collections::HashSet;

use opentell_types::{Area, Classification, Learning, Profile, Scope};

const PROFILE_MODE_MIN_ACTIVE: usize = 6;
const AREA_FILTER_MIN_ACTIVE: usize = 15;

fn active_learnings(learnings: &[Learning], threshold: f64) -> Vec<&Learning> {
    learnings.iter().filter(|l| l.is_active(threshold)).collect()
}

/// Whether a learning survives the optional area filter (spec.md §4.10):
/// thinking patterns, design principles, and global-scope preferences
/// always pass; everything else passes only if its area set intersects
/// the caller's active-area set, which always implicitly includes
/// `general`.
fn passes_area_filter(learning: &Learning, active_areas: &HashSet<Area>) -> bool {
    if matches!(learning.classification, Classification::ThinkingPattern | Classification::DesignPrinciple) {
        return true;
    }
    if learning.classification == Classification::Preference && learning.scope == Scope::Global {
        return true;
    }
    learning.area == Area::General || learning.areas.contains(&Area::General) || learning.areas.iter().any(|a| active_areas.contains(a))
}

fn filter_by_area<'a>(learnings: Vec<&'a Learning>, active_areas: Option<&HashSet<Area>>) -> Vec<&'a Learning> {
    if learnings.len() < AREA_FILTER_MIN_ACTIVE {
        return learnings;
    }
    let Some(active_areas) = active_areas else {
        return learnings;
    };
    learnings.into_iter().filter(|l| passes_area_filter(l, active_areas)).collect()
}

fn render_profile_mode(profile: &Profile, preferences: &[&Learning]) -> String {
    let mut out = String::new();
    out.push_str("# Developer context\n\n");
    out.push_str(&profile.text);
    out.push_str("\n\n");
    if !preferences.is_empty() {
        out.push_str("## Active preferences\n");
        for l in preferences {
            out.push_str(&format!("- {}\n", l.text));
        }
    }
    out
}

fn render_section(title: &str, members: &[&Learning]) -> String {
    if members.is_empty() {
        return String::new();
    }
    let mut out = format!("## {title}\n");
    for l in members {
        out.push_str(&format!("- {}\n", l.text));
    }
    out.push('\n');
    out
}

fn render_structured_mode(learnings: &[&Learning]) -> String {
    let thinking: Vec<&Learning> = learnings
        .iter()
        .copied()
        .filter(|l| l.classification == Classification::ThinkingPattern)
        .collect();
    let design: Vec<&Learning> = learnings
        .iter()
        .copied()
        .filter(|l| l.classification == Classification::DesignPrinciple)
        .collect();
    let quality: Vec<&Learning> = learnings
        .iter()
        .copied()
        .filter(|l| l.classification == Classification::QualityStandard)
        .collect();
    let gaps: Vec<&Learning> = learnings
        .iter()
        .copied()
        .filter(|l| l.classification == Classification::BehavioralGap)
        .collect();
    let preferences: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::Preference).collect();
    let global_prefs: Vec<&Learning> = preferences.iter().copied().filter(|l| l.scope == Scope::Global).collect();
    let scoped_prefs: Vec<&Learning> = preferences.iter().copied().filter(|l| l.scope != Scope::Global).collect();

    let mut out = String::from("# Developer context\n\n");
    out.push_str(&render_section("How we build", &thinking));
    out.push_str(&render_section("Architecture", &design));
    out.push_str(&render_section("Quality standards", &quality));
    out.push_str(&render_section("Common gaps to watch", &gaps));
    out.push_str(&render_section("General preferences", &global_prefs));
    out.push_str(&render_section("This project's conventions", &scoped_prefs));
    out
}

/// Build the session-start context brief (spec.md §4.10). `active_areas`
/// is an optional hint (e.g. files touched so far this session) used only
/// once the active set is large enough to need filtering.
pub fn build_context(
    learnings: &[Learning],
    profile: Option<&Profile>,
    threshold: f64,
    active_areas: Option<&HashSet<Area>>,
) -> String {
    let active = active_learnings(learnings, threshold);
    let active = filter_by_area(active, active_areas);

    if active.len() >= PROFILE_MODE_MIN_ACTIVE {
        if let Some(profile) = profile {
            let preferences: Vec<&Learning> =
                active.iter().copied().filter(|l| l.classification == Classification::Preference).collect();
            return render_profile_mode(profile, &preferences);
        }
    }

    render_structured_mode(&active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use opentell_types::DetectionMethod;
    use uuid::Uuid;

    fn learning(text: &str, classification: Classification, scope: Scope) -> Learning {
        Learning::new(
            Uuid::new_v4(),
            text.to_string(),
            classification,
            0.5,
            scope,
            Area::General,
            DetectionMethod::Regex,
            Utc::now(),
        )
    }

    #[test]
    fn structured_mode_used_below_profile_threshold() {
        let learnings = vec![learning("Prefers pnpm", Classification::Preference, Scope::Global)];
        let text = build_context(&learnings, None, 0.45, None);
        assert!(text.contains("General preferences"));
    }

    #[test]
    fn profile_mode_used_with_enough_active_and_a_profile() {
        let learnings: Vec<Learning> = (0..6)
            .map(|i| learning(&format!("Prefers thing {i}"), Classification::Preference, Scope::Global))
            .collect();
        let profile = Profile {
            text: "Narrative brief.".to_string(),
            generated_at: Utc::now(),
            learning_count: 6,
            session_count: 3,
            checksum: "abc".to_string(),
        };
        let text = build_context(&learnings, Some(&profile), 0.45, None);
        assert!(text.contains("Narrative brief."));
        assert!(text.contains("Active preferences"));
    }

    #[test]
    fn excludes_inferred_and_archived_learnings() {
        let mut inferred = learning("Uses pnpm", Classification::Preference, Scope::Global);
        inferred.inferred = true;
        let mut archived = learning("Uses jest", Classification::Preference, Scope::Global);
        archived.archive("superseded");
        let learnings = vec![inferred, archived];
        let text = build_context(&learnings, None, 0.45, None);
        assert!(!text.contains("Uses pnpm"));
        assert!(!text.contains("Uses jest"));
    }
}
