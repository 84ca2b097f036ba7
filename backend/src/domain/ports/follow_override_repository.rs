//! Driven port for follow override persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FollowId, FollowOverride, FollowOverrideFilter, NewFollowOverride};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow override repository adapters.
    pub enum FollowOverrideRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "follow override repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "follow override repository query failed: {message}",
        /// Stored data could not be decoded.
        Malformed { message: String } =>
            "follow override repository returned malformed data: {message}",
    }
}

/// Port for reading, creating and deleting follow overrides.
///
/// No uniqueness is enforced; the same pair may carry several records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowOverrideRepository: Send + Sync {
    /// Records matching every populated field of `filter`, in creation order.
    async fn find(
        &self,
        filter: &FollowOverrideFilter,
    ) -> Result<Vec<FollowOverride>, FollowOverrideRepositoryError>;

    /// Persist a new record stamped with `created_at`.
    async fn create(
        &self,
        record: NewFollowOverride,
        created_at: DateTime<Utc>,
    ) -> Result<FollowOverride, FollowOverrideRepositoryError>;

    /// Delete a record, returning it when it existed.
    async fn delete_by_id(
        &self,
        id: &FollowId,
    ) -> Result<Option<FollowOverride>, FollowOverrideRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowOverrideRepository;

#[async_trait]
impl FollowOverrideRepository for FixtureFollowOverrideRepository {
    async fn find(
        &self,
        _filter: &FollowOverrideFilter,
    ) -> Result<Vec<FollowOverride>, FollowOverrideRepositoryError> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        record: NewFollowOverride,
        created_at: DateTime<Utc>,
    ) -> Result<FollowOverride, FollowOverrideRepositoryError> {
        Ok(record.into_override(FollowId::random(), created_at))
    }

    async fn delete_by_id(
        &self,
        _id: &FollowId,
    ) -> Result<Option<FollowOverride>, FollowOverrideRepositoryError> {
        Ok(None)
    }
}
