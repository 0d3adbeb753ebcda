mod error_context;
mod hook_event;
pub mod doctor;
pub mod ops;
pub mod promote;
pub mod stats;

pub use hook_event::HookEvent;
pub use ops::{classify_worker, self_update, session_end, session_start, tool_use, turn_stop};
