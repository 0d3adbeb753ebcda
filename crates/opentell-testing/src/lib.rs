//! Testing infrastructure for opentell integration tests.
//!
//! - `TestWorld`: fluent interface for declarative test setup
//! - `assertions`: custom assertions for opentell-specific validation
//! - `fixtures`: sample transcript/learning generation
//! - `process`: background process management for the CLI binary

pub mod assertions;
pub mod fixtures;
pub mod process;
pub mod world;

pub use world::TestWorld;
