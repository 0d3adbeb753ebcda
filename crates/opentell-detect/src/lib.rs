mod noise;
mod observer;
mod pattern;
mod rules;
mod tool_signal;

pub use observer::{detect_observations, detect_validated};
pub use pattern::{detect, DetectResult};
pub use opentell_core::{classify_tool, ToolCategory};
pub use tool_signal::{detect as detect_tool_signals, format_tool_context};
