use chrono::{DateTime, Utc};
use uuid::Uuid;

use opentell_core::{is_duplicate, jaccard_similarity, normalize_core, StatePaths};
use opentell_types::{
    thresholds, DetectionMethod, EvidenceRecord, Learning, LearningDocument, SessionBuffer, Signal,
    WalEntry,
};

use crate::records;
use crate::rules::find_contradictions;

const ALIGNMENT_SIMILARITY: f64 = 0.7;

/// What happened when a signal was inserted (spec.md §4.1).
#[derive(Debug)]
pub enum InsertOutcome {
    Created(Uuid),
    Reinforced(Uuid),
    ValidatedInferred(Uuid),
    Corroborated(Uuid),
    ReinforcedInferred(Uuid),
    /// A new learning was created after archiving one or more contradicting
    /// learnings it supersedes.
    CreatedAndSuperseded { created: Uuid, superseded: Vec<Uuid> },
}

/// The persistent learning set plus its WAL and session buffer, all under
/// one per-user state directory (spec.md §4.1).
pub struct Store {
    paths: StatePaths,
    document: LearningDocument,
}

impl Store {
    pub fn load(paths: StatePaths) -> Self {
        let document = records::load_learnings(&paths.learnings());
        Store { paths, document }
    }

    pub fn save(&self) {
        records::save_learnings(&self.paths.learnings(), &self.document);
    }

    pub fn get_all(&self) -> &[Learning] {
        &self.document.learnings
    }

    pub fn get_active(&self, threshold: f64) -> Vec<&Learning> {
        self.document
            .learnings
            .iter()
            .filter(|l| l.is_active(threshold))
            .collect()
    }

    pub fn get_promotable(&self) -> Vec<&Learning> {
        self.document
            .learnings
            .iter()
            .filter(|l| l.is_promotable())
            .collect()
    }

    pub fn mark_promoted(&mut self, ids: &[Uuid]) {
        for l in self.document.learnings.iter_mut() {
            if ids.contains(&l.id) {
                l.promoted = true;
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Learning> {
        let idx = self.document.learnings.iter().position(|l| l.id == id)?;
        Some(self.document.learnings.remove(idx))
    }

    pub fn reset(&mut self) {
        self.document = LearningDocument::default();
    }

    pub fn increment_session_count(&mut self) {
        self.document.meta.total_sessions += 1;
    }

    pub fn total_sessions(&self) -> u32 {
        self.document.meta.total_sessions
    }

    pub fn meta(&self) -> &opentell_types::Meta {
        &self.document.meta
    }

    /// Direct mutable access to the learning set, for the cross-session
    /// analyzer (`opentell-engine`), which operates over a plain `&mut
    /// [Learning]` so it need not depend on the store crate.
    pub fn learnings_mut(&mut self) -> &mut Vec<Learning> {
        &mut self.document.learnings
    }

    pub fn push_learning(&mut self, learning: Learning) {
        self.document.learnings.push(learning);
    }

    /// Mark every member of a freshly consolidated cluster as pointing at
    /// the new synthesized learning (spec.md §4.8).
    pub fn mark_consolidated_into(&mut self, member_ids: &[Uuid], new_id: Uuid) {
        for l in self.document.learnings.iter_mut() {
            if member_ids.contains(&l.id) {
                l.consolidated_into = Some(new_id);
            }
        }
    }

    pub fn mark_consolidation_run(&mut self, now: DateTime<Utc>, session_count: u32) {
        self.document.meta.last_consolidation = Some(now);
        self.document.meta.consolidation_session = Some(session_count);
    }

    fn find_inferred_alignment(&self, text: &str) -> Option<usize> {
        let core = normalize_core(text);
        self.document.learnings.iter().position(|l| {
            l.inferred && jaccard_similarity(&core, &normalize_core(&l.text)) > ALIGNMENT_SIMILARITY
        })
    }

    fn find_duplicate(&self, text: &str) -> Option<usize> {
        self.document.learnings.iter().position(|l| {
            !l.inferred && !l.archived && !l.promoted && is_duplicate(text, &l.text)
        })
    }

    fn find_non_inferred_observation_match(&self, text: &str) -> Option<usize> {
        self.document.learnings.iter().position(|l| {
            !l.inferred && !l.archived && !l.promoted && is_duplicate(text, &l.text)
        })
    }

    fn find_inferred_observation_match(&self, text: &str) -> Option<usize> {
        self.document
            .learnings
            .iter()
            .position(|l| l.inferred && is_duplicate(text, &l.text))
    }

    fn reinforce_at(&mut self, idx: usize, signal: &Signal, session_id: &str, now: DateTime<Utc>) -> Uuid {
        let l = &mut self.document.learnings[idx];
        l.confidence = (l.confidence + thresholds::REINFORCEMENT_DELTA).min(1.0);
        l.evidence_count += 1;
        l.last_reinforced = now;
        l.decay_weight = 1.0;
        l.areas.insert(signal.area);
        l.session_ids.insert(session_id.to_string());
        l.push_evidence(EvidenceRecord::new(&signal.evidence_claude, &signal.evidence_user, now));

        if signal.classification.depth() > l.classification.depth() {
            l.classification_upgraded_from = Some(l.classification);
            l.classification = signal.classification;
        }
        if signal.text.len() > l.text.len() {
            l.text = signal.text.clone();
        }
        l.id
    }

    fn create(&mut self, signal: Signal, session_id: &str, now: DateTime<Utc>, inferred: bool) -> Uuid {
        let mut learning = Learning::new(
            Uuid::new_v4(),
            signal.text,
            signal.classification,
            signal.confidence,
            signal.scope,
            signal.area,
            signal.detection_method,
            now,
        );
        learning.inferred = inferred;
        learning.session_ids.insert(session_id.to_string());
        learning.push_evidence(EvidenceRecord::new(&signal.evidence_claude, &signal.evidence_user, now));
        let id = learning.id;
        self.document.learnings.push(learning);
        id
    }

    /// Insert a signal from the pattern detector, tool-signal detector, or
    /// classifier (spec.md §4.1 `addCandidate`).
    pub fn add_candidate(&mut self, signal: Signal, session_id: &str, now: DateTime<Utc>) -> InsertOutcome {
        if let Some(idx) = self.find_inferred_alignment(&signal.text) {
            let l = &mut self.document.learnings[idx];
            l.inferred = false;
            l.confidence = (l.confidence + 0.25).max(thresholds::ACTIVATION).min(1.0);
            l.detection_method = DetectionMethod::ClaudeObservationValidated;
            l.last_reinforced = now;
            l.session_ids.insert(session_id.to_string());
            return InsertOutcome::ValidatedInferred(l.id);
        }

        if let Some(idx) = self.find_duplicate(&signal.text) {
            let id = self.reinforce_at(idx, &signal, session_id, now);
            return InsertOutcome::Reinforced(id);
        }

        let superseded: Vec<Uuid> = find_contradictions(&signal.text, &self.document.learnings)
            .iter()
            .map(|l| l.id)
            .collect();

        if !superseded.is_empty() {
            let reason = format!("Superseded by: {}", signal.text);
            for l in self.document.learnings.iter_mut() {
                if superseded.contains(&l.id) {
                    l.archive(reason.clone());
                }
            }
        }

        let created = self.create(signal, session_id, now, false);
        if superseded.is_empty() {
            InsertOutcome::Created(created)
        } else {
            InsertOutcome::CreatedAndSuperseded { created, superseded }
        }
    }

    /// Insert a signal from the observer (spec.md §4.1 `addObservation`).
    pub fn add_observation(&mut self, signal: Signal, session_id: &str, now: DateTime<Utc>) -> InsertOutcome {
        if let Some(idx) = self.find_non_inferred_observation_match(&signal.text) {
            let l = &mut self.document.learnings[idx];
            l.confidence = (l.confidence + 0.03).min(1.0);
            l.observation_corroborations += 1;
            return InsertOutcome::Corroborated(l.id);
        }

        if let Some(idx) = self.find_inferred_observation_match(&signal.text) {
            let l = &mut self.document.learnings[idx];
            l.confidence = (l.confidence + 0.05).min(thresholds::INFERRED_CAP);
            l.last_reinforced = now;
            l.session_ids.insert(session_id.to_string());
            l.push_evidence(EvidenceRecord::new(&signal.evidence_claude, &signal.evidence_user, now));
            return InsertOutcome::ReinforcedInferred(l.id);
        }

        let created = self.create(signal, session_id, now, true);
        InsertOutcome::Created(created)
    }

    /// A developer explicitly confirms an inferred learning.
    pub fn accept_observation(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
        let Some(l) = self.document.learnings.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        if !l.inferred {
            return false;
        }
        l.inferred = false;
        l.confidence = l.confidence.max(thresholds::ACTIVATION);
        l.detection_method = DetectionMethod::ClaudeObservationAccepted;
        l.last_reinforced = now;
        true
    }

    /// A developer explicitly rejects an inferred learning.
    pub fn reject_observation(&mut self, id: Uuid) -> bool {
        let Some(l) = self.document.learnings.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        if !l.inferred {
            return false;
        }
        l.archive("Rejected observation");
        true
    }

    /// Age-based confidence erosion, applied at session-end (spec.md §4.1).
    pub fn apply_decay(&mut self, now: DateTime<Utc>) {
        for l in self.document.learnings.iter_mut() {
            if l.archived || l.promoted {
                continue;
            }
            let days = (now - l.last_reinforced).num_days();
            if days > 30 {
                l.decay_weight *= 0.90;
                l.confidence *= l.decay_weight;
            } else if days > 14 {
                l.decay_weight *= 0.95;
                l.confidence *= l.decay_weight;
            }
            if l.confidence < thresholds::ARCHIVE {
                l.archive("Decayed below threshold");
            }
        }
    }

    /// Slow organic growth for unvalidated observations (spec.md §4.1).
    /// Never crosses the activation threshold.
    pub fn apply_passive_accumulation(&mut self) {
        for l in self.document.learnings.iter_mut() {
            if l.inferred {
                l.confidence = (l.confidence + 0.03).min(thresholds::INFERRED_CAP);
            }
        }
    }

    // --- WAL ---

    pub fn append_wal(&self, entry: &WalEntry) {
        records::append_wal(&self.paths.wal(), entry);
    }

    /// Current WAL contents, re-read from disk (the WAL is never cached
    /// across a hook invocation boundary, spec.md §9).
    pub fn wal_entries(&self) -> Vec<WalEntry> {
        records::load_wal(&self.paths.wal())
    }

    pub fn wal_len(&self) -> usize {
        self.wal_entries().len()
    }

    /// Remove and return up to `limit` WAL entries, oldest first.
    pub fn drain_wal(&self, limit: usize) -> Vec<WalEntry> {
        let mut all = records::load_wal(&self.paths.wal());
        let drained: Vec<WalEntry> = all.drain(..all.len().min(limit)).collect();
        records::save_wal(&self.paths.wal(), &all);
        drained
    }

    pub fn remove_from_wal(&self, entry: &WalEntry) {
        let mut all = records::load_wal(&self.paths.wal());
        if let Some(idx) = all.iter().position(|e| e == entry) {
            all.remove(idx);
        }
        records::save_wal(&self.paths.wal(), &all);
    }

    pub fn clear_wal(&self) {
        records::save_wal(&self.paths.wal(), &[]);
    }

    // --- Session buffer ---

    pub fn load_buffer(&self, session_id: &str) -> SessionBuffer {
        records::load_session_buffer(&self.paths.session_buffer(), session_id)
    }

    pub fn save_buffer(&self, buffer: &SessionBuffer) {
        records::save_session_buffer(&self.paths.session_buffer(), buffer);
    }

    pub fn clear_buffer(&self, session_id: &str) {
        records::clear_session_buffer(&self.paths.session_buffer(), session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentell_types::{Area, Classification, Scope};
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::load(StatePaths::new(dir.path().to_path_buf()));
        (dir, store)
    }

    fn signal(text: &str, confidence: f64) -> Signal {
        Signal::new(
            text,
            confidence,
            Classification::Preference,
            Scope::Repo,
            Area::General,
            DetectionMethod::Regex,
        )
    }

    #[test]
    fn candidate_creates_new_learning() {
        let (_dir, mut store) = store();
        let outcome = store.add_candidate(signal("Prefers pnpm", 0.35), "s1", Utc::now());
        assert!(matches!(outcome, InsertOutcome::Created(_)));
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn duplicate_candidate_reinforces_instead_of_duplicating() {
        let (_dir, mut store) = store();
        store.add_candidate(signal("Prefers pnpm", 0.35), "s1", Utc::now());
        let outcome = store.add_candidate(signal("Prefers pnpm", 0.35), "s1", Utc::now());
        assert!(matches!(outcome, InsertOutcome::Reinforced(_)));
        assert_eq!(store.get_all().len(), 1);
        assert!((store.get_all()[0].confidence - 0.50).abs() < 1e-9);
        assert_eq!(store.get_all()[0].evidence_count, 2);
    }

    #[test]
    fn contradicting_candidate_archives_the_old_one() {
        let (_dir, mut store) = store();
        store.add_candidate(signal("Uses jest for tests", 0.35), "s1", Utc::now());
        let outcome = store.add_candidate(signal("Uses vitest for tests", 0.35), "s1", Utc::now());
        assert!(matches!(outcome, InsertOutcome::CreatedAndSuperseded { .. }));
        let archived = store.get_all().iter().find(|l| l.text.contains("jest")).unwrap();
        assert!(archived.archived);
        assert!(archived.archived_reason.as_ref().unwrap().starts_with("Superseded by"));
    }

    #[test]
    fn observation_creates_inferred_learning_below_activation() {
        let (_dir, mut store) = store();
        let outcome = store.add_observation(signal("Uses pnpm", 0.25), "s1", Utc::now());
        assert!(matches!(outcome, InsertOutcome::Created(_)));
        assert!(store.get_all()[0].inferred);
        assert!(store.get_all()[0].confidence <= thresholds::INFERRED_CAP);
    }

    #[test]
    fn candidate_validates_matching_inferred_observation() {
        let (_dir, mut store) = store();
        store.add_observation(signal("Uses pnpm", 0.25), "s1", Utc::now());
        let outcome = store.add_candidate(signal("Uses pnpm", 0.35), "s1", Utc::now());
        assert!(matches!(outcome, InsertOutcome::ValidatedInferred(_)));
        assert!(!store.get_all()[0].inferred);
        assert!(store.get_all()[0].confidence >= thresholds::ACTIVATION);
    }

    #[test]
    fn decay_archives_stale_low_confidence_learnings() {
        let (_dir, mut store) = store();
        let old = Utc::now() - chrono::Duration::days(40);
        store.add_candidate(signal("Prefers pnpm", 0.16), "s1", old);
        store.apply_decay(Utc::now());
        assert!(store.get_all()[0].archived);
    }

    #[test]
    fn passive_accumulation_never_crosses_activation() {
        let (_dir, mut store) = store();
        store.add_observation(signal("Uses pnpm", 0.40), "s1", Utc::now());
        for _ in 0..20 {
            store.apply_passive_accumulation();
        }
        assert!(store.get_all()[0].confidence <= thresholds::INFERRED_CAP);
    }
}
