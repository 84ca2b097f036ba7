//! Follow graph domain service.
//!
//! This service implements the follow driving ports on top of the roster and
//! override repositories. Each call reloads its inputs; nothing is cached
//! between requests. Independent loads are issued concurrently and the first
//! failure aborts the whole operation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::follow_resolution::{resolve_followers, resolve_following};
use crate::domain::ports::{
    FollowCommand, FollowGraphQuery, FollowOverrideRepository, FollowOverrideRepositoryError,
    RosterProvider, RosterProviderError,
};
use crate::domain::{
    DomainError, FollowId, FollowOverride, FollowOverrideDetails, FollowOverrideDraft,
    FollowOverrideFilter, NewFollowOverride, User, UserFollowGraph, UserId,
};

fn map_roster_error(error: RosterProviderError) -> DomainError {
    warn!(kind = error.kind(), %error, "roster provider failed");
    match error {
        RosterProviderError::Connection { message } => {
            DomainError::upstream(format!("roster unavailable: {message}"))
        }
        RosterProviderError::Query { message } => {
            DomainError::upstream(format!("roster query failed: {message}"))
        }
        RosterProviderError::Malformed { message } => {
            DomainError::upstream(format!("roster returned malformed data: {message}"))
        }
    }
}

fn map_override_error(error: FollowOverrideRepositoryError) -> DomainError {
    warn!(kind = error.kind(), %error, "follow override repository failed");
    match error {
        FollowOverrideRepositoryError::Connection { message } => {
            DomainError::upstream(format!("follow override store unavailable: {message}"))
        }
        FollowOverrideRepositoryError::Query { message } => {
            DomainError::upstream(format!("follow override store query failed: {message}"))
        }
        FollowOverrideRepositoryError::Malformed { message } => DomainError::upstream(format!(
            "follow override store returned malformed data: {message}"
        )),
    }
}

fn user_not_found(user_id: &UserId) -> DomainError {
    DomainError::not_found(format!("user {user_id} not found"))
}

fn find_in_roster(roster: &[User], id: &UserId) -> Option<User> {
    roster.iter().find(|user| user.id() == id).cloned()
}

/// Inputs for one resolution, loaded together.
struct ResolutionInputs {
    subject: User,
    roster: Vec<User>,
    overrides: Vec<FollowOverride>,
}

/// Follow service implementing the follow driving ports.
#[derive(Clone)]
pub struct FollowService<R, O> {
    roster: Arc<R>,
    overrides: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<R, O> FollowService<R, O> {
    /// Create a new service over the roster and override repositories.
    pub fn new(roster: Arc<R>, overrides: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            roster,
            overrides,
            clock,
        }
    }
}

impl<R, O> FollowService<R, O>
where
    R: RosterProvider,
    O: FollowOverrideRepository,
{
    async fn load_inputs(
        &self,
        user_id: &UserId,
        filter: FollowOverrideFilter,
    ) -> Result<ResolutionInputs, DomainError> {
        let (roster, subject, overrides) = tokio::try_join!(
            async { self.roster.list_users().await.map_err(map_roster_error) },
            async { self.roster.find_by_id(user_id).await.map_err(map_roster_error) },
            async { self.overrides.find(&filter).await.map_err(map_override_error) },
        )?;
        let subject = subject.ok_or_else(|| user_not_found(user_id))?;

        Ok(ResolutionInputs {
            subject,
            roster,
            overrides,
        })
    }
}

#[async_trait]
impl<R, O> FollowGraphQuery for FollowService<R, O>
where
    R: RosterProvider,
    O: FollowOverrideRepository,
{
    async fn following(&self, user_id: &UserId) -> Result<Vec<User>, DomainError> {
        let inputs = self
            .load_inputs(user_id, FollowOverrideFilter::by_follower(user_id))
            .await?;
        let following = resolve_following(
            &inputs.subject,
            &inputs.roster,
            &inputs.overrides,
            self.clock.utc(),
        );
        debug!(
            user_id = %user_id,
            roster_size = inputs.roster.len(),
            override_count = inputs.overrides.len(),
            following_count = following.len(),
            "resolved following"
        );
        Ok(following)
    }

    async fn followers(&self, user_id: &UserId) -> Result<Vec<User>, DomainError> {
        let inputs = self
            .load_inputs(user_id, FollowOverrideFilter::by_following(user_id))
            .await?;
        let followers = resolve_followers(
            &inputs.subject,
            &inputs.roster,
            &inputs.overrides,
            self.clock.utc(),
        );
        debug!(
            user_id = %user_id,
            roster_size = inputs.roster.len(),
            override_count = inputs.overrides.len(),
            follower_count = followers.len(),
            "resolved followers"
        );
        Ok(followers)
    }

    async fn all_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FollowOverrideDetails>, DomainError> {
        let (roster, as_follower, as_following) = tokio::try_join!(
            async { self.roster.list_users().await.map_err(map_roster_error) },
            async {
                self.overrides
                    .find(&FollowOverrideFilter::by_follower(user_id))
                    .await
                    .map_err(map_override_error)
            },
            async {
                self.overrides
                    .find(&FollowOverrideFilter::by_following(user_id))
                    .await
                    .map_err(map_override_error)
            },
        )?;

        // A record naming the user on both sides is returned by both queries.
        let mut records = as_follower;
        for record in as_following {
            if !records.iter().any(|existing| existing.id == record.id) {
                records.push(record);
            }
        }
        records.sort_by_key(|record| record.created_at);
        debug!(user_id = %user_id, override_count = records.len(), "loaded follow overrides");

        Ok(records
            .into_iter()
            .map(|record| FollowOverrideDetails {
                id: record.id,
                follower: find_in_roster(&roster, &record.follower_id),
                following: find_in_roster(&roster, &record.following_id),
                follow_type: record.follow_type,
                created_at: record.created_at,
            })
            .collect())
    }

    async fn user_follow_graph(&self, user_id: &UserId) -> Result<UserFollowGraph, DomainError> {
        let (following, followers, all_for_user) = tokio::try_join!(
            self.following(user_id),
            self.followers(user_id),
            self.all_for_user(user_id),
        )?;
        info!(
            user_id = %user_id,
            following_count = following.len(),
            follower_count = followers.len(),
            override_count = all_for_user.len(),
            "follow graph resolved"
        );
        Ok(UserFollowGraph {
            following,
            followers,
            all_for_user,
        })
    }

    async fn resolve_login(&self, login: &str) -> Result<User, DomainError> {
        let user = self
            .roster
            .find_by_login(login)
            .await
            .map_err(map_roster_error)?
            .ok_or_else(|| DomainError::not_found(format!("user with login {login} not found")))?;
        debug!(login, user_id = %user.id(), "resolved login");
        Ok(user)
    }
}

#[async_trait]
impl<R, O> FollowCommand for FollowService<R, O>
where
    R: RosterProvider,
    O: FollowOverrideRepository,
{
    async fn add_follow(&self, draft: FollowOverrideDraft) -> Result<FollowOverride, DomainError> {
        let record = NewFollowOverride::try_from(draft).map_err(|err| {
            DomainError::invalid_request(format!("invalid follow override: {err}"))
                .with_details(json!({ "field": err.field() }))
        })?;

        let created = self
            .overrides
            .create(record, self.clock.utc())
            .await
            .map_err(map_override_error)?;
        info!(
            follow_id = %created.id,
            follower_id = %created.follower_id,
            following_id = %created.following_id,
            follow_type = %created.follow_type,
            "follow override created"
        );
        Ok(created)
    }

    async fn delete_follow(&self, id: &FollowId) -> Result<FollowOverride, DomainError> {
        let deleted = self
            .overrides
            .delete_by_id(id)
            .await
            .map_err(map_override_error)?
            .ok_or_else(|| DomainError::not_found(format!("follow override {id} not found")))?;
        info!(follow_id = %id, "follow override deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "follow_service_tests.rs"]
mod tests;
