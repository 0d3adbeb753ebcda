pub mod consolidate;
pub mod context;
pub mod cross_session;
pub mod profile;

pub use consolidate::{build_consolidated_learning, consolidate_cluster, find_clusters, should_consolidate, AffinityGroup, Cluster};
pub use context::build_context;
pub use cross_session::analyze as analyze_cross_session;
pub use profile::{checksum as profile_checksum, needs_update as profile_needs_update, synthesize as synthesize_profile};
