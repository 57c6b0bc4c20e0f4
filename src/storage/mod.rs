//! Snapshot persistence
//!
//! The graph is persisted whole through the `SnapshotStore` trait. The
//! primary implementation is `JsonSnapshotStore`, a single JSON document.

mod json;
mod traits;

pub use json::JsonSnapshotStore;
pub use traits::{OpenStore, SnapshotStore, StorageError, StorageResult};
