//! Project memberships and the active-interval test.
//!
//! A membership binds a user to a project for an optional date range. Missing
//! bounds fall back to a fixed open interval wide enough to contain any
//! realistic "now", so undated memberships are always active.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`ProjectId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectIdValidationError {
    /// The identifier was empty.
    #[error("project id must not be empty")]
    Empty,
    /// The identifier was not a UUID.
    #[error("project id must be a valid UUID")]
    Invalid,
}

/// Stable project identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Validate and construct a [`ProjectId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProjectIdValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(ProjectIdValidationError::Empty);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ProjectIdValidationError::Invalid)
    }

    /// Generate a new random [`ProjectId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ProjectId {
    type Error = ProjectIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower bound substituted for a missing `dateStart`.
pub fn open_interval_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Upper bound substituted for a missing `dateEnd`.
pub fn open_interval_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Time-bounded association between a user and a project.
///
/// `project` is `None` when the referenced project no longer resolves; such
/// memberships never count towards co-membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMembership {
    /// Referenced project, if it still resolves.
    #[serde(default)]
    pub project: Option<ProjectId>,
    /// First instant of the membership; open when absent.
    #[serde(default)]
    pub date_start: Option<DateTime<Utc>>,
    /// Last instant of the membership; open when absent.
    #[serde(default)]
    pub date_end: Option<DateTime<Utc>>,
}

impl ProjectMembership {
    /// Undated membership in `project`.
    pub fn open(project: ProjectId) -> Self {
        Self {
            project: Some(project),
            date_start: None,
            date_end: None,
        }
    }

    /// Membership in `project` bounded by the supplied dates.
    pub fn bounded(
        project: ProjectId,
        date_start: Option<DateTime<Utc>>,
        date_end: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            project: Some(project),
            date_start,
            date_end,
        }
    }

    /// Effective start, substituting the open-interval default.
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.date_start.unwrap_or_else(open_interval_start)
    }

    /// Effective end, substituting the open-interval default.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.date_end.unwrap_or_else(open_interval_end)
    }

    /// Whether `now` lies strictly inside the effective interval.
    ///
    /// Both bounds are exclusive: a membership starting or ending exactly at
    /// `now` is inactive.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_start() < now && now < self.effective_end()
    }

    /// Project id when the membership is active and the project resolves.
    pub fn active_project(&self, now: DateTime<Utc>) -> Option<ProjectId> {
        if self.is_active_at(now) {
            self.project
        } else {
            None
        }
    }
}
