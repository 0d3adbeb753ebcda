//! Running the `opentell` CLI binary as a subprocess for integration tests.
//!
//! Unlike the teacher's long-lived `watch` process, every opentell hook
//! invocation is a short-lived process that reads one JSON event from
//! stdin and exits; this wraps that round-trip.

use anyhow::Result;
use assert_cmd::Command;

/// Run one hook subcommand (`session-start`, `turn-stop`, `tool-use`,
/// `session-end`) against a state directory, piping `event_json` to stdin,
/// and return its captured stdout.
pub fn run_hook(state_dir: &std::path::Path, subcommand: &str, event_json: &str) -> Result<String> {
    let mut cmd = Command::cargo_bin("opentell")?;
    cmd.args(["--state-dir", &state_dir.to_string_lossy(), subcommand]);
    cmd.write_stdin(event_json);
    let output = cmd.output()?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a non-hook subcommand (`doctor`, `stats`, `promote`, `reset`) and
/// return its captured stdout.
pub fn run_command(state_dir: &std::path::Path, args: &[&str]) -> Result<String> {
    let mut cmd = Command::cargo_bin("opentell")?;
    cmd.args(["--state-dir", &state_dir.to_string_lossy()]);
    cmd.args(args);
    let output = cmd.output()?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
