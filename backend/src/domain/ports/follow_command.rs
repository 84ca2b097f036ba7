//! Driving port for follow override mutations.

use async_trait::async_trait;

use crate::domain::{DomainError, FollowId, FollowOverride, FollowOverrideDraft};

/// Domain use-case port for creating and deleting follow overrides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// Validate and persist a new override.
    async fn add_follow(&self, draft: FollowOverrideDraft) -> Result<FollowOverride, DomainError>;

    /// Delete an override by id, returning the removed record.
    async fn delete_follow(&self, id: &FollowId) -> Result<FollowOverride, DomainError>;
}
