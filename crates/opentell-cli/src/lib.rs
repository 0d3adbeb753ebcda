mod args;
mod commands;
mod logging;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
