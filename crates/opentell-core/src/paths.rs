use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolve the per-user state directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. `OPENTELL_PATH` environment variable (with tilde expansion)
/// 3. System data directory (recommended default)
/// 4. `~/.opentell` (fallback for systems without a standard data directory)
pub fn resolve_state_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("OPENTELL_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("opentell"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".opentell"));
    }

    Err(Error::Config(
        "Could not determine state directory: no HOME directory or system data directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Layout of the state directory (spec.md §6).
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub root: PathBuf,
}

impl StatePaths {
    pub fn new(root: PathBuf) -> Self {
        StatePaths { root }
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn learnings(&self) -> PathBuf {
        self.root.join("learnings.json")
    }

    pub fn wal(&self) -> PathBuf {
        self.root.join("wal.jsonl")
    }

    pub fn session_buffer(&self) -> PathBuf {
        self.root.join("session-buffer.json")
    }

    pub fn profile(&self) -> PathBuf {
        self.root.join("profile.json")
    }

    pub fn stats(&self) -> PathBuf {
        self.root.join("stats.json")
    }

    pub fn log(&self) -> PathBuf {
        self.root.join("opentell.log")
    }

    /// Timestamp marker for the session-start hook's "at most once every
    /// 24 hours" self-update check (spec.md §4.11).
    pub fn self_update_marker(&self) -> PathBuf {
        self.root.join(".last-self-update")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let resolved = resolve_state_dir(Some("/tmp/explicit")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn tilde_is_expanded() {
        if std::env::var_os("HOME").is_none() {
            return;
        }
        let resolved = resolve_state_dir(Some("~/explicit")).unwrap();
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }
}
