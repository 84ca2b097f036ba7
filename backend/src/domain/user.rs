//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project::ProjectMembership;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptyMailNickname,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyMailNickname => write!(f, "mail nickname must not be blank when present"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
///
/// Any spelling accepted by [`Uuid::parse_str`] normalises to the lowercase
/// hyphenated form, so equality never depends on how the id was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, parsed.to_string()))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;

/// Employee name used to order the roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Directory login alias, compared without regard to case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MailNickname(String);

impl MailNickname {
    /// Validate and construct a [`MailNickname`].
    pub fn new(nickname: impl Into<String>) -> Result<Self, UserValidationError> {
        let nickname = nickname.into();
        if nickname.trim().is_empty() {
            return Err(UserValidationError::EmptyMailNickname);
        }
        Ok(Self(nickname))
    }

    /// Whole-value, case-insensitive comparison against a login.
    pub fn matches_login(&self, login: &str) -> bool {
        self.0.to_lowercase() == login.to_lowercase()
    }
}

impl AsRef<str> for MailNickname {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MailNickname> for String {
    fn from(value: MailNickname) -> Self {
        value.0
    }
}

impl TryFrom<String> for MailNickname {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Roster entry for one employee.
///
/// ## Invariants
/// - `id` must be a valid UUID string and never changes.
/// - `username` must be non-empty once trimmed of whitespace.
/// - `projects` keeps membership order as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    username: Username,
    mail_nickname: Option<MailNickname>,
    projects: Vec<ProjectMembership>,
}

impl User {
    /// Build a new [`User`] from validated components with no memberships.
    pub fn new(id: UserId, username: Username) -> Self {
        Self {
            id,
            username,
            mail_nickname: None,
            projects: Vec::new(),
        }
    }

    /// Attach a login alias.
    #[must_use]
    pub fn with_mail_nickname(mut self, mail_nickname: MailNickname) -> Self {
        self.mail_nickname = Some(mail_nickname);
        self
    }

    /// Replace the project memberships.
    #[must_use]
    pub fn with_projects(mut self, projects: Vec<ProjectMembership>) -> Self {
        self.projects = projects;
        self
    }

    /// Fallible constructor enforcing identifier and username invariants.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        username: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let id = UserId::new(id)?;
        let username = Username::new(username)?;

        Ok(Self::new(id, username))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Employee name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Login alias, when the directory provides one.
    pub fn mail_nickname(&self) -> Option<&MailNickname> {
        self.mail_nickname.as_ref()
    }

    /// Project memberships in stored order.
    pub fn projects(&self) -> &[ProjectMembership] {
        &self.projects
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mail_nickname: Option<String>,
    #[serde(default)]
    projects: Vec<ProjectMembership>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            username,
            mail_nickname,
            projects,
        } = value;
        Self {
            id: id.into(),
            username: username.into(),
            mail_nickname: mail_nickname.map(Into::into),
            projects,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let user = User::try_from_strings(value.id, value.username)?;
        let user = match value.mail_nickname {
            Some(nickname) => user.with_mail_nickname(MailNickname::new(nickname)?),
            None => user,
        };
        Ok(user.with_projects(value.projects))
    }
}

#[cfg(test)]
mod tests;
