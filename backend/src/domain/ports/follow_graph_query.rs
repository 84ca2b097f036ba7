//! Driving port for follow graph reads.
//!
//! Inbound adapters use this port to read who a user follows and who follows
//! them without importing roster or override storage concerns.

use async_trait::async_trait;

use crate::domain::{DomainError, FollowOverrideDetails, User, UserFollowGraph, UserId};

/// Domain use-case port for resolving follow relationships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowGraphQuery: Send + Sync {
    /// Users `user_id` follows, implicit peers first, then explicit adds.
    async fn following(&self, user_id: &UserId) -> Result<Vec<User>, DomainError>;

    /// Users following `user_id`.
    async fn followers(&self, user_id: &UserId) -> Result<Vec<User>, DomainError>;

    /// Every override naming `user_id` on either side, with users resolved.
    async fn all_for_user(&self, user_id: &UserId)
    -> Result<Vec<FollowOverrideDetails>, DomainError>;

    /// The three views above, resolved together.
    async fn user_follow_graph(&self, user_id: &UserId) -> Result<UserFollowGraph, DomainError>;

    /// Look a user up by login so callers can address them by nickname.
    async fn resolve_login(&self, login: &str) -> Result<User, DomainError>;
}

/// Fixture query reporting an empty graph for every user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowGraphQuery;

#[async_trait]
impl FollowGraphQuery for FixtureFollowGraphQuery {
    async fn following(&self, _user_id: &UserId) -> Result<Vec<User>, DomainError> {
        Ok(Vec::new())
    }

    async fn followers(&self, _user_id: &UserId) -> Result<Vec<User>, DomainError> {
        Ok(Vec::new())
    }

    async fn all_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<FollowOverrideDetails>, DomainError> {
        Ok(Vec::new())
    }

    async fn user_follow_graph(&self, _user_id: &UserId) -> Result<UserFollowGraph, DomainError> {
        Ok(UserFollowGraph {
            following: Vec::new(),
            followers: Vec::new(),
            all_for_user: Vec::new(),
        })
    }

    async fn resolve_login(&self, login: &str) -> Result<User, DomainError> {
        Err(DomainError::not_found(format!("user with login {login} not found")))
    }
}
