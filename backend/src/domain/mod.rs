//! Domain primitives, follow graph resolution and the ports around them.
//!
//! Purpose: Define strongly typed roster and follow override entities and the
//! rules that turn them into a user's following and follower sets. Adapters
//! plug in through the traits in [`ports`]; nothing here performs I/O.
//!
//! Public surface:
//! - DomainError / ErrorCode: failure payload shared by every operation.
//! - User, UserId, Username, MailNickname: roster identity.
//! - ProjectId, ProjectMembership: dated project assignments.
//! - FollowOverride and friends: explicit follow/unfollow records.
//! - FollowService: implements the follow driving ports.

pub mod error;
pub mod follow;
pub mod follow_resolution;
pub mod follow_service;
pub mod ports;
pub mod project;
pub mod user;

pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::follow::{
    FollowId, FollowOverride, FollowOverrideDetails, FollowOverrideDraft, FollowOverrideFilter,
    FollowType, FollowValidationError, NewFollowOverride, UserFollowGraph,
};
pub use self::follow_service::FollowService;
pub use self::project::{ProjectId, ProjectIdValidationError, ProjectMembership};
pub use self::user::{MailNickname, USERNAME_MAX, User, UserId, UserValidationError, Username};

/// Result alias for domain operations.
///
/// # Examples
/// ```
/// use work_calendar::domain::{DomainError, DomainResult};
///
/// fn lookup() -> DomainResult<()> {
///     Err(DomainError::not_found("user missing"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
