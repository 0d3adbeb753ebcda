mod error;
mod records;
mod rules;
mod store;

pub use error::{Error, Result};
pub use store::{InsertOutcome, Store};
