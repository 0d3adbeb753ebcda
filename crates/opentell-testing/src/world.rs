//! TestWorld pattern for declarative integration test setup.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use opentell_core::StatePaths;
use opentell_store::Store;

use crate::fixtures;

/// An isolated opentell state directory plus a project directory
/// containing a transcript file, wired together for integration tests.
pub struct TestWorld {
    _temp_dir: TempDir,
    state_dir: PathBuf,
    transcript_path: PathBuf,
}

impl TestWorld {
    pub fn builder() -> TestWorldBuilder {
        TestWorldBuilder::new()
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn transcript_path(&self) -> &Path {
        &self.transcript_path
    }

    pub fn paths(&self) -> StatePaths {
        StatePaths::new(self.state_dir.clone())
    }

    pub fn store(&self) -> Store {
        Store::load(self.paths())
    }

    /// Append one assistant/developer pair to the world's transcript.
    pub fn append_pair(&self, assistant_text: &str, developer_text: &str) -> anyhow::Result<()> {
        fixtures::append_transcript_pair(&self.transcript_path, assistant_text, developer_text)
    }

    /// Write `config.json` with the given API key, so session-end/
    /// turn-stop exercise the classifier/consolidation paths.
    pub fn with_api_key(&self, api_key: &str) -> anyhow::Result<()> {
        let config = opentell_core::Config {
            anthropic_api_key: Some(api_key.to_string()),
            ..Default::default()
        };
        config.save(&self.paths())?;
        Ok(())
    }
}

pub struct TestWorldBuilder {
    seed_learnings: Vec<opentell_types::Learning>,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self { seed_learnings: Vec::new() }
    }

    pub fn with_learning(mut self, learning: opentell_types::Learning) -> Self {
        self.seed_learnings.push(learning);
        self
    }

    pub fn build(self) -> TestWorld {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let state_dir = temp_dir.path().join("state");
        let transcript_path = temp_dir.path().join("transcript.jsonl");
        std::fs::create_dir_all(&state_dir).expect("failed to create state dir");
        std::fs::write(&transcript_path, "").expect("failed to create transcript file");

        let world = TestWorld { _temp_dir: temp_dir, state_dir, transcript_path };

        if !self.seed_learnings.is_empty() {
            let mut store = world.store();
            for learning in self.seed_learnings {
                store.push_learning(learning);
            }
            store.save();
        }

        world
    }
}
