use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use opentell_types::{
    thresholds::ACTIVATION, Classification, DetectionMethod, EvidenceRecord, Learning, Meta, Scope,
};

const MIN_CLUSTER: usize = 2;

/// One of the fixed consolidation affinity groups (spec.md §4.8): a theme a
/// developer's preferences can cluster around, matched by keyword.
pub struct AffinityGroup {
    pub id: &'static str,
    pub keywords: &'static [&'static str],
}

pub static AFFINITY_GROUPS: Lazy<Vec<AffinityGroup>> = Lazy::new(|| {
    vec![
        AffinityGroup {
            id: "composability",
            keywords: &["composable", "composition", "reusable", "small functions", "single responsibility"],
        },
        AffinityGroup {
            id: "user_empathy",
            keywords: &["user experience", "developer experience", "error message", "friendly", "accessib"],
        },
        AffinityGroup {
            id: "defensive_design",
            keywords: &["validation", "edge case", "defensive", "null check", "guard clause"],
        },
        AffinityGroup {
            id: "data_architecture",
            keywords: &["schema", "migration", "normalized", "data model", "foreign key"],
        },
        AffinityGroup {
            id: "shipping_standards",
            keywords: &["ship", "release", "deploy", "ci", "rollback"],
        },
        AffinityGroup {
            id: "simplicity_pragmatism",
            keywords: &["simplicity", "simple", "pragmatic", "avoid over-engineering", "yagni"],
        },
        AffinityGroup {
            id: "system_thinking",
            keywords: &["system", "holistic", "tradeoff", "architecture", "scalab"],
        },
        AffinityGroup {
            id: "code_clarity",
            keywords: &["readable", "clarity", "naming", "self-documenting", "concise"],
        },
    ]
});

/// A candidate cluster: the affinity group it belongs to and the active
/// learnings whose text matched its keywords.
pub struct Cluster<'a> {
    pub group_id: &'static str,
    pub members: Vec<&'a Learning>,
}

fn is_active(learning: &Learning) -> bool {
    !learning.archived && !learning.promoted && learning.confidence >= ACTIVATION
}

fn already_consolidated(group_id: &str, learnings: &[Learning]) -> bool {
    learnings
        .iter()
        .any(|l| l.consolidated_from_group.as_deref() == Some(group_id))
}

/// Find clusters of active learnings sharing an affinity group's keywords,
/// skipping groups already consolidated once (spec.md §4.8 `findClusters`).
pub fn find_clusters(learnings: &[Learning]) -> Vec<Cluster<'_>> {
    let mut clusters = Vec::new();
    for group in AFFINITY_GROUPS.iter() {
        if already_consolidated(group.id, learnings) {
            continue;
        }
        let members: Vec<&Learning> = learnings
            .iter()
            .filter(|l| is_active(l))
            .filter(|l| {
                let text = l.text.to_lowercase();
                group.keywords.iter().any(|kw| text.contains(kw))
            })
            .collect();
        if members.len() >= MIN_CLUSTER {
            clusters.push(Cluster { group_id: group.id, members });
        }
    }
    clusters
}

/// Build the synthesized learning for a cluster, given the language
/// model's merged text (spec.md §4.8 `consolidateCluster`). Also marks each
/// member as consolidated into the new learning's id.
pub fn build_consolidated_learning(cluster: &Cluster<'_>, merged_text: String, now: DateTime<Utc>) -> Learning {
    let avg_confidence: f64 =
        cluster.members.iter().map(|l| l.confidence).sum::<f64>() / cluster.members.len() as f64;
    let evidence_count: u32 = cluster.members.iter().map(|l| l.evidence_count).sum();
    let area = cluster.members[0].area;

    let mut learning = Learning::new(
        Uuid::new_v4(),
        merged_text,
        Classification::ThinkingPattern,
        (avg_confidence + 0.05).min(0.95),
        Scope::Global,
        area,
        DetectionMethod::Consolidation,
        now,
    );
    learning.evidence_count = evidence_count;
    learning.consolidated_from_group = Some(cluster.group_id.to_string());
    learning.consolidated_from_ids = Some(cluster.members.iter().map(|l| l.id).collect());
    learning.push_evidence(EvidenceRecord::new(
        "consolidated",
        &format!("merged {} related learnings", cluster.members.len()),
        now,
    ));
    learning
}

/// `shouldConsolidate` (spec.md §4.8): at least 6 active learnings, no
/// consolidation in the prior 5 sessions, and at least one cluster found.
pub fn should_consolidate(learnings: &[Learning], meta: &Meta, total_sessions: u32) -> bool {
    let active_count = learnings.iter().filter(|l| is_active(l)).count();
    if active_count < 6 {
        return false;
    }
    let session_gap_ok = match meta.consolidation_session {
        Some(last) => total_sessions.saturating_sub(last) >= 5,
        None => true,
    };
    if !session_gap_ok {
        return false;
    }
    !find_clusters(learnings).is_empty()
}

const CONSOLIDATION_MAX_TOKENS: u32 = 200;

/// Submit a cluster's member texts to the language model and, on a
/// parsable response, return the new consolidated learning (spec.md §4.8
/// `consolidateCluster`). Returns `None` on any transport/parse failure —
/// the cluster simply stays unconsolidated and is reconsidered next run.
pub fn consolidate_cluster(
    client: &reqwest::blocking::Client,
    api_key: &str,
    model: &str,
    cluster: &Cluster<'_>,
    now: DateTime<Utc>,
) -> Option<Learning> {
    let list = cluster
        .members
        .iter()
        .map(|l| format!("- {}", l.text))
        .collect::<Vec<_>>()
        .join("\n");
    let user_message = format!("Learnings:\n{list}");

    let raw = opentell_classifier::synthesize(
        client,
        api_key,
        model,
        opentell_classifier::prompts::CONSOLIDATION_PROMPT,
        &user_message,
        CONSOLIDATION_MAX_TOKENS,
    )?;

    let body: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    let text = body.get("text")?.as_str()?.trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(build_consolidated_learning(cluster, text, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentell_types::{Area, Scope as S};

    fn learning(text: &str, confidence: f64) -> Learning {
        Learning::new(
            Uuid::new_v4(),
            text.to_string(),
            Classification::Preference,
            confidence,
            S::Repo,
            Area::General,
            DetectionMethod::Regex,
            Utc::now(),
        )
    }

    #[test]
    fn finds_cluster_when_keyword_count_meets_minimum() {
        let learnings = vec![
            learning("Prefers simple solutions over clever ones", 0.5),
            learning("Avoid over-engineering small scripts", 0.5),
        ];
        let clusters = find_clusters(&learnings);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].group_id, "simplicity_pragmatism");
    }

    #[test]
    fn ignores_group_already_consolidated() {
        let mut already = learning("Prefers simplicity", 0.5);
        already.consolidated_from_group = Some("simplicity_pragmatism".to_string());
        let learnings = vec![
            already,
            learning("Prefers simple solutions", 0.5),
            learning("Avoid over-engineering", 0.5),
        ];
        assert!(find_clusters(&learnings).is_empty());
    }

    #[test]
    fn should_consolidate_requires_six_active_and_a_cluster() {
        let mut learnings: Vec<Learning> = (0..5).map(|i| learning(&format!("Prefers thing {i}"), 0.5)).collect();
        learnings.push(learning("Prefers simple solutions", 0.5));
        learnings.push(learning("Avoid over-engineering", 0.5));
        let meta = Meta::default();
        assert!(should_consolidate(&learnings, &meta, 1));
    }

    #[test]
    fn should_not_consolidate_within_five_sessions_of_last_run() {
        let mut learnings: Vec<Learning> = (0..5).map(|i| learning(&format!("Prefers thing {i}"), 0.5)).collect();
        learnings.push(learning("Prefers simple solutions", 0.5));
        learnings.push(learning("Avoid over-engineering", 0.5));
        let meta = Meta {
            consolidation_session: Some(8),
            ..Meta::default()
        };
        assert!(!should_consolidate(&learnings, &meta, 10));
    }
}
