use serde::{Deserialize, Serialize};

/// The six classes a learning (or a classifier verdict) can carry.
///
/// Depth order governs both display grouping and the upgrade rule in the
/// reinforcement algebra: a deeper classification never yields to a
/// shallower one on reinforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    ThinkingPattern,
    DesignPrinciple,
    QualityStandard,
    Preference,
    BehavioralGap,
}

impl Classification {
    /// Depth order from spec.md: 5,4,3,1,2 for
    /// THINKING_PATTERN, DESIGN_PRINCIPLE, QUALITY_STANDARD, PREFERENCE, BEHAVIORAL_GAP.
    pub fn depth(self) -> u8 {
        match self {
            Classification::ThinkingPattern => 5,
            Classification::DesignPrinciple => 4,
            Classification::QualityStandard => 3,
            Classification::Preference => 1,
            Classification::BehavioralGap => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::ThinkingPattern => "THINKING_PATTERN",
            Classification::DesignPrinciple => "DESIGN_PRINCIPLE",
            Classification::QualityStandard => "QUALITY_STANDARD",
            Classification::Preference => "PREFERENCE",
            Classification::BehavioralGap => "BEHAVIORAL_GAP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "THINKING_PATTERN" => Some(Classification::ThinkingPattern),
            "DESIGN_PRINCIPLE" => Some(Classification::DesignPrinciple),
            "QUALITY_STANDARD" => Some(Classification::QualityStandard),
            "PREFERENCE" => Some(Classification::Preference),
            "BEHAVIORAL_GAP" => Some(Classification::BehavioralGap),
            _ => None,
        }
    }
}

/// Non-learning-bearing verdicts the classifier may also return (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionClass {
    Situational,
    Factual,
    Continuation,
}

/// Where a learning applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Repo,
    Language,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Repo => "repo",
            Scope::Language => "language",
        }
    }
}

/// Tag from the fixed area vocabulary (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Architecture,
    Frontend,
    Backend,
    Testing,
    Devops,
    Data,
    Ux,
    General,
}

impl Area {
    pub fn as_str(self) -> &'static str {
        match self {
            Area::Architecture => "architecture",
            Area::Frontend => "frontend",
            Area::Backend => "backend",
            Area::Testing => "testing",
            Area::Devops => "devops",
            Area::Data => "data",
            Area::Ux => "ux",
            Area::General => "general",
        }
    }
}

/// Provenance tag recorded on every learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Regex,
    ToolPattern,
    Llm,
    ClaudeObservation,
    ValidatedObservation,
    Consolidation,
    ClaudeObservationAccepted,
    ClaudeObservationValidated,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Regex => "regex",
            DetectionMethod::ToolPattern => "tool_pattern",
            DetectionMethod::Llm => "llm",
            DetectionMethod::ClaudeObservation => "claude_observation",
            DetectionMethod::ValidatedObservation => "validated_observation",
            DetectionMethod::Consolidation => "consolidation",
            DetectionMethod::ClaudeObservationAccepted => "claude_observation_accepted",
            DetectionMethod::ClaudeObservationValidated => "claude_observation_validated",
        }
    }
}

/// Certainty axis used by the starting-confidence matrix (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    High,
    Low,
}
