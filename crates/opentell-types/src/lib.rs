mod classification;
mod document;
pub mod error;
mod learning;
mod meta;
mod pair;
mod session;
mod signal;
pub mod thresholds;
mod tool_event;
mod wal;

pub use classification::{Area, Certainty, Classification, DetectionMethod, RejectionClass, Scope};
pub use document::LearningDocument;
pub use error::{Error, Result};
pub use learning::{EvidenceRecord, Learning, LearningState};
pub use meta::{Meta, Profile};
pub use pair::Pair;
pub use session::SessionBuffer;
pub use signal::Signal;
pub use tool_event::{truncate_command, ToolEvent, ToolEventKind, COMMAND_TRUNCATE_LEN};
pub use wal::WalEntry;
