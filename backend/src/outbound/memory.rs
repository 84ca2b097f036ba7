//! Process-local adapters for the roster and follow override ports.
//!
//! The roster is immutable once built. Overrides live behind an `RwLock` so
//! concurrent reads do not block each other; a poisoned lock is reported as
//! a connection failure rather than a panic.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::ports::{
    FollowOverrideRepository, FollowOverrideRepositoryError, RosterProvider, RosterProviderError,
};
use crate::domain::{
    FollowId, FollowOverride, FollowOverrideFilter, NewFollowOverride, User, UserId,
};

/// Roster held in memory, ordered by username ascending.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    users: Vec<User>,
}

impl InMemoryRoster {
    /// Build a roster, sorting users by username.
    ///
    /// # Examples
    /// ```
    /// use work_calendar::domain::User;
    /// use work_calendar::outbound::InMemoryRoster;
    ///
    /// let zed = User::try_from_strings("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Zed")
    ///     .expect("valid user");
    /// let ada = User::try_from_strings("9b2e5d8c-1f0a-4c1e-8d3b-2a4f6e7c9d01", "Ada")
    ///     .expect("valid user");
    /// let roster = InMemoryRoster::new(vec![zed, ada]);
    /// assert_eq!(roster.users()[0].username().as_ref(), "Ada");
    /// ```
    pub fn new(mut users: Vec<User>) -> Self {
        users.sort_by(|left, right| left.username().cmp(right.username()));
        Self { users }
    }

    /// Users in roster order.
    pub fn users(&self) -> &[User] {
        &self.users
    }
}

#[async_trait]
impl RosterProvider for InMemoryRoster {
    async fn list_users(&self) -> Result<Vec<User>, RosterProviderError> {
        Ok(self.users.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RosterProviderError> {
        Ok(self.users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RosterProviderError> {
        Ok(self
            .users
            .iter()
            .find(|user| {
                user.mail_nickname()
                    .is_some_and(|nickname| nickname.matches_login(login))
            })
            .cloned())
    }
}

/// Follow override store held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryFollowOverrides {
    records: RwLock<Vec<FollowOverride>>,
}

impl InMemoryFollowOverrides {
    /// Seed the store with existing records.
    pub fn new(records: Vec<FollowOverride>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Copy of every stored record, for persisting.
    pub fn records(&self) -> Result<Vec<FollowOverride>, FollowOverrideRepositoryError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<FollowOverride>>, FollowOverrideRepositoryError> {
        self.records
            .read()
            .map_err(|_| FollowOverrideRepositoryError::connection("override store lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Vec<FollowOverride>>, FollowOverrideRepositoryError> {
        self.records
            .write()
            .map_err(|_| FollowOverrideRepositoryError::connection("override store lock poisoned"))
    }
}

#[async_trait]
impl FollowOverrideRepository for InMemoryFollowOverrides {
    async fn find(
        &self,
        filter: &FollowOverrideFilter,
    ) -> Result<Vec<FollowOverride>, FollowOverrideRepositoryError> {
        Ok(self
            .read()?
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        record: NewFollowOverride,
        created_at: DateTime<Utc>,
    ) -> Result<FollowOverride, FollowOverrideRepositoryError> {
        let created = record.into_override(FollowId::random(), created_at);
        let mut records = self.write()?;
        records.push(created.clone());
        debug!(follow_id = %created.id, stored = records.len(), "stored follow override");
        Ok(created)
    }

    async fn delete_by_id(
        &self,
        id: &FollowId,
    ) -> Result<Option<FollowOverride>, FollowOverrideRepositoryError> {
        let mut records = self.write()?;
        let position = records.iter().position(|record| record.id == *id);
        Ok(position.map(|index| records.remove(index)))
    }
}
