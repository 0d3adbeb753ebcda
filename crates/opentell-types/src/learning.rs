use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classification::{Area, Classification, DetectionMethod, Scope};
use crate::thresholds::EVIDENCE_RING_CAP;

/// A single evidence record backing a learning. Capped at roughly 300 bytes
/// per side (spec.md §3) — truncation happens at the call site where the
/// original text is available; this type just stores whatever it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub claude_said: String,
    pub user_said: String,
    pub recorded_at: DateTime<Utc>,
}

/// One of the four observable states a learning can be in (invariant I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningState {
    Candidate,
    Active,
    Inferred,
    Terminal,
}

/// The atomic unit of memory (spec.md §3).
///
/// Optional bookkeeping fields accumulate over a learning's lifetime
/// (boost flags, upgrade trails, consolidation links) and are modeled as
/// `Option`/defaulted fields on one struct rather than a sum type — see
/// DESIGN.md / SPEC_FULL.md §3 ("dynamic document shape").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learning {
    pub id: Uuid,
    pub text: String,
    pub classification: Classification,
    pub confidence: f64,
    pub evidence_count: u32,
    pub scope: Scope,
    pub area: Area,
    #[serde(default)]
    pub areas: HashSet<Area>,
    pub detection_method: DetectionMethod,
    pub first_seen: DateTime<Utc>,
    pub last_reinforced: DateTime<Utc>,
    #[serde(default = "one")]
    pub decay_weight: f64,
    #[serde(default)]
    pub session_ids: HashSet<String>,
    #[serde(default)]
    pub inferred: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default)]
    pub evidence: VecDeque<EvidenceRecord>,

    #[serde(default)]
    pub archived_reason: Option<String>,

    // Consolidation links (spec.md §3, invariant I5). Stored as ids, never
    // direct pointers, so serialization stays flat (DESIGN NOTES §9).
    #[serde(default)]
    pub consolidated_from_group: Option<String>,
    #[serde(default)]
    pub consolidated_from_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub consolidated_into: Option<Uuid>,

    // Upgrade bookkeeping.
    #[serde(default)]
    pub cross_session_boosted: bool,
    #[serde(default)]
    pub cross_session_count: Option<u32>,
    #[serde(default)]
    pub classification_upgraded_from: Option<Classification>,
    #[serde(default)]
    pub deep_pattern_upgrade: bool,

    // Observation bookkeeping.
    #[serde(default)]
    pub observation_corroborations: u32,
}

fn one() -> f64 {
    1.0
}

impl Learning {
    pub fn new(
        id: Uuid,
        text: String,
        classification: Classification,
        confidence: f64,
        scope: Scope,
        area: Area,
        detection_method: DetectionMethod,
        now: DateTime<Utc>,
    ) -> Self {
        let mut areas = HashSet::new();
        areas.insert(area);
        Learning {
            id,
            text,
            classification,
            confidence: confidence.clamp(0.0, 1.0),
            evidence_count: 1,
            scope,
            area,
            areas,
            detection_method,
            first_seen: now,
            last_reinforced: now,
            decay_weight: 1.0,
            session_ids: HashSet::new(),
            inferred: false,
            archived: false,
            promoted: false,
            evidence: VecDeque::new(),
            archived_reason: None,
            consolidated_from_group: None,
            consolidated_from_ids: None,
            consolidated_into: None,
            cross_session_boosted: false,
            cross_session_count: None,
            classification_upgraded_from: None,
            deep_pattern_upgrade: false,
            observation_corroborations: 0,
        }
    }

    pub fn state(&self) -> LearningState {
        if self.archived || self.promoted {
            LearningState::Terminal
        } else if self.inferred {
            LearningState::Inferred
        } else if self.confidence >= crate::thresholds::ACTIVATION {
            LearningState::Active
        } else {
            LearningState::Candidate
        }
    }

    pub fn is_active(&self, threshold: f64) -> bool {
        !self.archived && !self.promoted && !self.inferred && self.confidence >= threshold
    }

    pub fn is_promotable(&self) -> bool {
        !self.archived
            && !self.promoted
            && !self.inferred
            && self.confidence >= crate::thresholds::PROMOTION
            && self.evidence_count >= crate::thresholds::PROMOTION_MIN_EVIDENCE
    }

    pub fn push_evidence(&mut self, record: EvidenceRecord) {
        self.evidence.push_back(record);
        while self.evidence.len() > EVIDENCE_RING_CAP {
            self.evidence.pop_front();
        }
    }

    pub fn archive(&mut self, reason: impl Into<String>) {
        self.archived = true;
        self.archived_reason = Some(reason.into());
    }
}

fn truncate_for_evidence(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

impl EvidenceRecord {
    /// Build an evidence record, truncating each side to ~300 bytes per
    /// spec.md §3.
    pub fn new(claude_said: &str, user_said: &str, recorded_at: DateTime<Utc>) -> Self {
        EvidenceRecord {
            claude_said: truncate_for_evidence(claude_said, 300),
            user_said: truncate_for_evidence(user_said, 300),
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Learning {
        Learning::new(
            Uuid::new_v4(),
            "Prefers pnpm".to_string(),
            Classification::Preference,
            0.35,
            Scope::Global,
            Area::General,
            DetectionMethod::Regex,
            Utc::now(),
        )
    }

    #[test]
    fn new_learning_has_evidence_count_one() {
        assert_eq!(sample().evidence_count, 1);
    }

    #[test]
    fn confidence_is_clamped_on_construction() {
        let mut l = sample();
        l.confidence = 5.0;
        // clamp only happens at construction; callers are expected to clamp
        // on every mutation too (exercised in opentell-store).
        assert!(Learning::new(
            l.id,
            "x".into(),
            Classification::Preference,
            5.0,
            Scope::Global,
            Area::General,
            DetectionMethod::Regex,
            Utc::now()
        )
        .confidence
            <= 1.0);
    }

    #[test]
    fn evidence_ring_caps_at_ten() {
        let mut l = sample();
        for i in 0..15 {
            l.push_evidence(EvidenceRecord::new(&format!("a{i}"), &format!("b{i}"), Utc::now()));
        }
        assert_eq!(l.evidence.len(), EVIDENCE_RING_CAP);
        assert_eq!(l.evidence.front().unwrap().claude_said, "a5");
    }

    #[test]
    fn evidence_truncates_long_sides() {
        let long = "x".repeat(1000);
        let rec = EvidenceRecord::new(&long, &long, Utc::now());
        assert!(rec.claude_said.len() <= 301);
    }

    #[test]
    fn state_reflects_lifecycle() {
        let mut l = sample();
        l.confidence = 0.10;
        assert_eq!(l.state(), LearningState::Candidate);
        l.confidence = 0.50;
        assert_eq!(l.state(), LearningState::Active);
        l.inferred = true;
        assert_eq!(l.state(), LearningState::Inferred);
        l.inferred = false;
        l.archived = true;
        assert_eq!(l.state(), LearningState::Terminal);
    }

    #[test]
    fn promotable_requires_evidence_and_confidence() {
        let mut l = sample();
        l.confidence = 0.85;
        l.evidence_count = 2;
        assert!(!l.is_promotable());
        l.evidence_count = 4;
        assert!(l.is_promotable());
    }
}
