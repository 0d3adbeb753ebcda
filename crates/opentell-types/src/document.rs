use serde::{Deserialize, Serialize};

use crate::learning::Learning;
use crate::meta::Meta;

/// The shape of `learnings.json` (spec.md §6): the whole learning set plus
/// store-wide bookkeeping, serialized atomically on every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningDocument {
    #[serde(default)]
    pub learnings: Vec<Learning>,
    #[serde(default)]
    pub meta: Meta,
}
