//! Web archive collaborator
//!
//! - `resolver`: rate-limited snapshot lookups
//! - `snapshot`: parsing, building and repairing snapshot URLs

pub mod resolver;
pub mod snapshot;

pub use resolver::ArchiveResolver;
pub use snapshot::{Snapshot, SnapshotUrls};
