use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser)]
#[command(name = "opentell")]
#[command(about = "Observes AI coding assistant sessions and accumulates a durable model of developer preferences", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the state directory (default: `$OPENTELL_PATH` or the
    /// system data directory's `opentell` subdirectory).
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Hook: reset the session buffer, apply decay, print the context brief")]
    SessionStart,

    #[command(about = "Hook: scan unanalyzed transcript pairs for signals")]
    TurnStop,

    #[command(about = "Hook: record a Bash/Write/Edit tool event")]
    ToolUse,

    #[command(about = "Hook: drain the WAL, consolidate, resynthesize the profile")]
    SessionEnd,

    #[command(about = "Classify one WAL entry in a detached background process", hide = true)]
    ClassifyWorker {
        #[arg(long)]
        entry: usize,
    },

    #[command(about = "Check for and apply an opentell update", hide = true)]
    SelfUpdate,

    #[command(about = "Validate store/WAL/buffer integrity and print lifecycle counts")]
    Doctor,

    #[command(about = "Print accumulated classifier/synthesis call stats")]
    Stats,

    #[command(about = "Write promotable learnings into the project instruction file")]
    Promote {
        #[arg(long, default_value = "CLAUDE.md")]
        instruction_file: PathBuf,
    },

    #[command(about = "Clear all learned state for the current user")]
    Reset {
        #[arg(long)]
        yes: bool,
    },
}
