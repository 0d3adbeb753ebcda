pub mod classify_worker;
pub mod self_update;
pub mod session_end;
pub mod session_start;
pub mod tool_use;
pub mod turn_stop;
