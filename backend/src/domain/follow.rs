//! Follow override records and the follow graph read model.
//!
//! Overrides are explicit follow/unfollow decisions that sit on top of the
//! implicit, project-derived relationship. Records are append/delete only;
//! several records may exist for the same pair.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{User, UserId};

/// Whether an override adds or removes a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowType {
    /// Follow regardless of project overlap.
    Add,
    /// Do not follow regardless of project overlap or explicit adds.
    Remove,
}

impl FollowType {
    /// Stable wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for FollowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowType {
    type Err = FollowValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            other => Err(FollowValidationError::UnknownFollowType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation failures for follow identifiers and creation payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FollowValidationError {
    /// Follow id was empty.
    #[error("follow id must not be empty")]
    EmptyFollowId,
    /// Follow id was not a UUID.
    #[error("follow id must be a valid UUID")]
    InvalidFollowId,
    /// Follower id was missing or not a UUID.
    #[error("followerId is invalid: {reason}")]
    InvalidFollowerId {
        /// Underlying user id validation failure.
        reason: String,
    },
    /// Following id was missing or not a UUID.
    #[error("followingId is invalid: {reason}")]
    InvalidFollowingId {
        /// Underlying user id validation failure.
        reason: String,
    },
    /// Follow type tag was not one of `add` or `remove`.
    #[error("followType must be \"add\" or \"remove\", got \"{value}\"")]
    UnknownFollowType {
        /// Rejected tag.
        value: String,
    },
    /// A user cannot hold an override against itself.
    #[error("followerId and followingId must differ")]
    SelfFollow,
}

impl FollowValidationError {
    /// Name of the payload field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyFollowId | Self::InvalidFollowId => "id",
            Self::InvalidFollowerId { .. } | Self::SelfFollow => "followerId",
            Self::InvalidFollowingId { .. } => "followingId",
            Self::UnknownFollowType { .. } => "followType",
        }
    }
}

/// Identifier of a stored follow override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FollowId(Uuid);

impl FollowId {
    /// Validate and construct a [`FollowId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, FollowValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(FollowValidationError::EmptyFollowId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| FollowValidationError::InvalidFollowId)
    }

    /// Generate a new random [`FollowId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FollowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<FollowId> for String {
    fn from(value: FollowId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for FollowId {
    type Error = FollowValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored follow override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOverride {
    /// Record identifier.
    pub id: FollowId,
    /// User whose following set is adjusted.
    pub follower_id: UserId,
    /// User being followed or unfollowed.
    pub following_id: UserId,
    /// Direction of the adjustment.
    pub follow_type: FollowType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Raw creation payload as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOverrideDraft {
    /// Follower user id.
    #[serde(default)]
    pub follower_id: String,
    /// Following user id.
    #[serde(default)]
    pub following_id: String,
    /// `add` or `remove`.
    #[serde(default)]
    pub follow_type: String,
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFollowOverride {
    follower_id: UserId,
    following_id: UserId,
    follow_type: FollowType,
}

impl NewFollowOverride {
    /// Build from already validated parts.
    pub fn new(
        follower_id: UserId,
        following_id: UserId,
        follow_type: FollowType,
    ) -> Result<Self, FollowValidationError> {
        if follower_id == following_id {
            return Err(FollowValidationError::SelfFollow);
        }
        Ok(Self {
            follower_id,
            following_id,
            follow_type,
        })
    }

    /// Follower user id.
    pub fn follower_id(&self) -> &UserId {
        &self.follower_id
    }

    /// Following user id.
    pub fn following_id(&self) -> &UserId {
        &self.following_id
    }

    /// Direction of the adjustment.
    pub fn follow_type(&self) -> FollowType {
        self.follow_type
    }

    /// Materialise a stored record.
    pub fn into_override(self, id: FollowId, created_at: DateTime<Utc>) -> FollowOverride {
        FollowOverride {
            id,
            follower_id: self.follower_id,
            following_id: self.following_id,
            follow_type: self.follow_type,
            created_at,
        }
    }
}

impl TryFrom<FollowOverrideDraft> for NewFollowOverride {
    type Error = FollowValidationError;

    fn try_from(value: FollowOverrideDraft) -> Result<Self, Self::Error> {
        let follower_id = UserId::new(&value.follower_id).map_err(|err| {
            FollowValidationError::InvalidFollowerId {
                reason: err.to_string(),
            }
        })?;
        let following_id = UserId::new(&value.following_id).map_err(|err| {
            FollowValidationError::InvalidFollowingId {
                reason: err.to_string(),
            }
        })?;
        let follow_type = value.follow_type.parse::<FollowType>()?;
        Self::new(follower_id, following_id, follow_type)
    }
}

/// Override record with both user references resolved against the roster.
///
/// A reference that no longer resolves is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOverrideDetails {
    /// Record identifier.
    pub id: FollowId,
    /// Resolved follower.
    pub follower: Option<User>,
    /// Resolved following user.
    pub following: Option<User>,
    /// Direction of the adjustment.
    pub follow_type: FollowType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Composite follow view for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFollowGraph {
    /// Users the subject follows.
    pub following: Vec<User>,
    /// Users following the subject.
    pub followers: Vec<User>,
    /// Every override naming the subject on either side.
    pub all_for_user: Vec<FollowOverrideDetails>,
}

/// Conjunctive filter over stored overrides; `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowOverrideFilter {
    /// Restrict to records with this follower.
    pub follower_id: Option<UserId>,
    /// Restrict to records with this following user.
    pub following_id: Option<UserId>,
    /// Restrict to records of this type.
    pub follow_type: Option<FollowType>,
}

impl FollowOverrideFilter {
    /// Records where `user_id` is the follower.
    pub fn by_follower(user_id: &UserId) -> Self {
        Self {
            follower_id: Some(user_id.clone()),
            ..Self::default()
        }
    }

    /// Records where `user_id` is being followed.
    pub fn by_following(user_id: &UserId) -> Self {
        Self {
            following_id: Some(user_id.clone()),
            ..Self::default()
        }
    }

    /// Whether `record` satisfies every populated field.
    pub fn matches(&self, record: &FollowOverride) -> bool {
        self.follower_id
            .as_ref()
            .is_none_or(|id| *id == record.follower_id)
            && self
                .following_id
                .as_ref()
                .is_none_or(|id| *id == record.following_id)
            && self
                .follow_type
                .is_none_or(|follow_type| follow_type == record.follow_type)
    }
}
