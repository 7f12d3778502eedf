pub mod snapshot;

pub use snapshot::{RaritySnapshot, RetentionPolicy, SnapshotDescription, SnapshotStore};
