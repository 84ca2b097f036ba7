//! Driven port exposing the organisation roster.
//!
//! Adapters must return project memberships with project references already
//! resolved. A membership whose project no longer exists carries `None`.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by roster adapters.
    pub enum RosterProviderError {
        /// The roster store could not be reached.
        Connection { message: String } => "roster connection failed: {message}",
        /// A lookup failed during execution.
        Query { message: String } => "roster query failed: {message}",
        /// The roster store returned a record that failed validation.
        Malformed { message: String } => "roster returned malformed data: {message}",
    }
}

/// Port for reading the organisation roster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Every user, ordered by username ascending.
    async fn list_users(&self) -> Result<Vec<User>, RosterProviderError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RosterProviderError>;

    /// Fetch a user by login, matching the whole mail nickname ignoring case.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RosterProviderError>;
}

/// Fixture roster with no users, for tests that do not exercise the roster.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRosterProvider;

#[async_trait]
impl RosterProvider for FixtureRosterProvider {
    async fn list_users(&self) -> Result<Vec<User>, RosterProviderError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, RosterProviderError> {
        Ok(None)
    }

    async fn find_by_login(&self, _login: &str) -> Result<Option<User>, RosterProviderError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_roster_is_empty() {
        let roster = FixtureRosterProvider;
        assert!(roster.list_users().await.expect("fixture list").is_empty());
        assert!(
            roster
                .find_by_id(&UserId::random())
                .await
                .expect("fixture lookup")
                .is_none()
        );
        assert!(
            roster
                .find_by_login("ada")
                .await
                .expect("fixture login lookup")
                .is_none()
        );
    }

    #[rstest]
    fn malformed_error_formats_message() {
        let err = RosterProviderError::malformed("username missing");
        assert_eq!(
            err.to_string(),
            "roster returned malformed data: username missing"
        );
        assert_eq!(err.kind(), "malformed");
    }
}
