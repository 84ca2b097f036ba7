//! Runtime configuration loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_LOG_FILTER: &str = "info";

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("follow-graph")
        .join("snapshot.json")
}

/// Settings for the follow graph tooling.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WORK_CALENDAR")]
pub struct WorkCalendarSettings {
    /// Snapshot file holding the roster and follow overrides.
    pub snapshot_path: Option<PathBuf>,
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = true)]
    pub log_json: bool,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl WorkCalendarSettings {
    /// Return the configured snapshot path, falling back to the bundled fixture.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }

    /// Return the configured log filter, falling back to `info`.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> WorkCalendarSettings {
        WorkCalendarSettings::load_from_iter([OsString::from("follow-graph")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("WORK_CALENDAR_SNAPSHOT_PATH", None::<String>),
            ("WORK_CALENDAR_LOG_JSON", None::<String>),
            ("WORK_CALENDAR_LOG_FILTER", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.log_json);
        assert_eq!(settings.snapshot_path(), default_snapshot_path());
        assert_eq!(settings.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "WORK_CALENDAR_SNAPSHOT_PATH",
                Some("/tmp/follow-snapshot.json".to_owned()),
            ),
            ("WORK_CALENDAR_LOG_JSON", Some("false".to_owned())),
            ("WORK_CALENDAR_LOG_FILTER", Some("work_calendar=debug".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.log_json);
        assert_eq!(
            settings.snapshot_path(),
            PathBuf::from("/tmp/follow-snapshot.json")
        );
        assert_eq!(settings.log_filter(), "work_calendar=debug");
    }
}
