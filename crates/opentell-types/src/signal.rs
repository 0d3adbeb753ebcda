use crate::classification::{Area, Classification, DetectionMethod, Scope};

/// A candidate learning emitted by a detector (spec.md GLOSSARY "Signal").
///
/// Every detector — pattern, tool-signal, observer, and the classifier —
/// converges on this one shape before it reaches the store, so
/// `Store::add_candidate` / `Store::add_observation` need only one input
/// type regardless of provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub text: String,
    pub confidence: f64,
    pub classification: Classification,
    pub scope: Scope,
    pub area: Area,
    pub detection_method: DetectionMethod,
    /// The raw (assistant, developer) text this signal was extracted from,
    /// used to populate evidence on insert. `None` for signals synthesized
    /// without a source pair (e.g. consolidation).
    pub evidence_claude: String,
    pub evidence_user: String,
}

impl Signal {
    pub fn new(
        text: impl Into<String>,
        confidence: f64,
        classification: Classification,
        scope: Scope,
        area: Area,
        detection_method: DetectionMethod,
    ) -> Self {
        Signal {
            text: text.into(),
            confidence,
            classification,
            scope,
            area,
            detection_method,
            evidence_claude: String::new(),
            evidence_user: String::new(),
        }
    }

    pub fn with_evidence(mut self, claude_said: impl Into<String>, user_said: impl Into<String>) -> Self {
        self.evidence_claude = claude_said.into();
        self.evidence_user = user_said.into();
        self
    }
}
