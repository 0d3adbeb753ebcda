use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::StatePaths;

fn default_confidence_threshold() -> f64 {
    0.45
}

fn default_max_learnings() -> usize {
    100
}

/// `config.json` (spec.md §6). Unrecognized keys round-trip through
/// `serde_json::Value` storage would be nice but the spec only names a
/// closed set of keys, so this is a plain struct with `#[serde(default)]`
/// for every key the host may omit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub classifier_model: Option<String>,
    #[serde(default)]
    pub synthesis_model: Option<String>,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_max_learnings")]
    pub max_learnings: usize,
    #[serde(default)]
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anthropic_api_key: None,
            classifier_model: None,
            synthesis_model: None,
            confidence_threshold: default_confidence_threshold(),
            max_learnings: default_max_learnings(),
            paused: false,
        }
    }
}

impl Config {
    pub fn load(paths: &StatePaths) -> Result<Self> {
        Self::load_from(&paths.config())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        // Parse failure initializes to default rather than propagating —
        // the engine must never block the host on a corrupt config
        // (spec.md §4.1 "Failure semantics").
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Ok(Self::default()),
        };
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    pub fn save(&self, paths: &StatePaths) -> Result<()> {
        self.save_to(&paths.config())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        crate::atomic::write_atomic(path, content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_loads_as_default() {
        let dir = tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(cfg.confidence_threshold, 0.45);
        assert_eq!(cfg.max_learnings, 100);
        assert!(!cfg.paused);
    }

    #[test]
    fn corrupt_config_loads_as_default_without_erroring() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.confidence_threshold, 0.45);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut cfg = Config::default();
        cfg.paused = true;
        cfg.max_learnings = 50;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.paused);
        assert_eq!(loaded.max_learnings, 50);
    }
}
