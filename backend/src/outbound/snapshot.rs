//! JSON snapshot file backing the in-memory adapters.
//!
//! A snapshot holds the roster and every follow override:
//!
//! ```json
//! { "version": 1, "users": [...], "follows": [...] }
//! ```
//!
//! Reads go through a `cap-std` directory handle opened on the snapshot's
//! parent. Writes replace the file atomically via a temporary sibling and a
//! rename, so a reader never observes a partial snapshot.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{FollowOverride, User};
use crate::outbound::memory::{InMemoryFollowOverrides, InMemoryRoster};

/// Snapshot format version understood by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors raised while loading or saving a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The path does not name a file.
    #[error("snapshot path '{path}' must name a file")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The snapshot directory could not be opened.
    #[error("failed to open snapshot directory '{path}': {message}")]
    OpenDir {
        /// Directory path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
    /// The snapshot file could not be read.
    #[error("failed to read snapshot '{path}': {message}")]
    Read {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
    /// The snapshot JSON is malformed or fails domain validation.
    #[error("invalid snapshot JSON: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        actual: u32,
    },
    /// The snapshot could not be encoded.
    #[error("failed to encode snapshot: {message}")]
    Encode {
        /// Description of the encoding error.
        message: String,
    },
    /// The snapshot file could not be written.
    #[error("failed to write snapshot '{path}': {message}")]
    Write {
        /// Path being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}

/// Roster and follow overrides persisted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version; must equal [`SNAPSHOT_VERSION`].
    pub version: u32,
    /// Roster entries in any order.
    #[serde(default)]
    pub users: Vec<User>,
    /// Follow overrides in creation order.
    #[serde(default)]
    pub follows: Vec<FollowOverride>,
}

impl Snapshot {
    /// Build a current-version snapshot.
    pub fn new(users: Vec<User>, follows: Vec<FollowOverride>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users,
            follows,
        }
    }

    /// Split into adapters serving the roster and override ports.
    pub fn into_adapters(self) -> (InMemoryRoster, InMemoryFollowOverrides) {
        (
            InMemoryRoster::new(self.users),
            InMemoryFollowOverrides::new(self.follows),
        )
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Snapshot file bound to a directory handle.
#[derive(Debug)]
pub struct SnapshotStore {
    dir: Dir,
    file_name: String,
    path: Utf8PathBuf,
}

impl SnapshotStore {
    /// Bind to the snapshot at `path`. The file itself need not exist yet,
    /// but its parent directory must.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| SnapshotError::InvalidPath {
                path: path.to_path_buf(),
            })?
            .to_owned();
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            SnapshotError::OpenDir {
                path: parent.to_path_buf(),
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            dir,
            file_name,
            path: path.to_path_buf(),
        })
    }

    /// Path the store was opened with.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read and validate the snapshot.
    pub fn load(&self) -> Result<Snapshot, SnapshotError> {
        let contents =
            self.dir
                .read_to_string(&self.file_name)
                .map_err(|err| SnapshotError::Read {
                    path: self.path.clone(),
                    message: err.to_string(),
                })?;
        let snapshot = parse_snapshot(&contents)?;
        debug!(
            path = %self.path,
            users = snapshot.users.len(),
            follows = snapshot.follows.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Replace the snapshot file atomically.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut contents =
            serde_json::to_string_pretty(snapshot).map_err(|err| SnapshotError::Encode {
                message: err.to_string(),
            })?;
        contents.push('\n');
        self.write_atomic(&contents)?;
        debug!(path = %self.path, follows = snapshot.follows.len(), "saved snapshot");
        Ok(())
    }

    fn write_atomic(&self, contents: &str) -> Result<(), SnapshotError> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        let tmp_name = format!(
            ".{}.tmp.{}.{}.{}",
            self.file_name,
            std::process::id(),
            suffix,
            counter
        );

        if let Err(err) = self.write_temp(&tmp_name, contents) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(self.write_error(&err));
        }
        if let Err(err) = self.dir.rename(&tmp_name, &self.dir, &self.file_name) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(self.write_error(&err));
        }
        // Directory sync is best effort.
        drop(self.dir.open(".").and_then(|dir| dir.sync_all()));
        Ok(())
    }

    fn write_temp(&self, tmp_name: &str, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = self.dir.open_with(tmp_name, &options)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn write_error(&self, err: &io::Error) -> SnapshotError {
        SnapshotError::Write {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

/// Parse snapshot JSON, checking the version before the body.
pub fn parse_snapshot(contents: &str) -> Result<Snapshot, SnapshotError> {
    let probe: VersionProbe =
        serde_json::from_str(contents).map_err(|err| SnapshotError::Parse {
            message: err.to_string(),
        })?;
    if probe.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            expected: SNAPSHOT_VERSION,
            actual: probe.version,
        });
    }
    serde_json::from_str(contents).map_err(|err| SnapshotError::Parse {
        message: err.to_string(),
    })
}
