//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local roster and override store
//! - **snapshot**: JSON snapshot file feeding the in-memory adapters
//!
//! Adapters are thin translators between storage representations and domain
//! types. They contain no follow resolution logic.

pub mod memory;
pub mod snapshot;

pub use memory::{InMemoryFollowOverrides, InMemoryRoster};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError, SnapshotStore};
