//! Test utilities shared by unit and integration tests.
//!
//! Only compiled for tests or with the `test-support` feature.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::outbound::{Snapshot, SnapshotError, SnapshotStore};

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Shared handle suitable for service constructors.
    pub fn shared(now: DateTime<Utc>) -> Arc<dyn Clock> {
        Arc::new(Self(now))
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Snapshot file in a private temporary directory, removed on drop.
#[derive(Debug)]
pub struct TempSnapshot {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl TempSnapshot {
    /// Write `snapshot` to a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the temporary directory cannot be
    /// created or the snapshot cannot be written.
    pub fn write(snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        let dir = TempDir::new().map_err(|err| SnapshotError::OpenDir {
            path: Utf8PathBuf::from("<tempdir>"),
            message: err.to_string(),
        })?;
        let path = Utf8PathBuf::from_path_buf(dir.path().join("snapshot.json")).map_err(
            |path| SnapshotError::InvalidPath {
                path: Utf8PathBuf::from(path.to_string_lossy().into_owned()),
            },
        )?;
        SnapshotStore::open(&path)?.save(snapshot)?;
        Ok(Self { _dir: dir, path })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Open a store bound to the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the directory cannot be opened.
    pub fn store(&self) -> Result<SnapshotStore, SnapshotError> {
        SnapshotStore::open(&self.path)
    }
}
