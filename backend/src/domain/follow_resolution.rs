//! Pure follow graph resolution.
//!
//! Following is derived in three layers:
//! 1. implicit peers: roster members sharing at least one active project;
//! 2. explicit `add` overrides appended in record order;
//! 3. explicit `remove` overrides subtracted after adds, so a remove always
//!    wins over an add for the same pair regardless of timestamps.
//!
//! The subject is stripped last; nobody follows themselves. A subject with no
//! active project is treated as following the entire roster. That fallback
//! only applies to the following direction.
//!
//! Every function here is synchronous and takes `now` explicitly so callers
//! control the clock.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{FollowOverride, FollowType, ProjectId, User, UserId};

/// Which side of an override record names the counterpart user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    /// Counterpart is `following_id`; used when resolving who a user follows.
    Following,
    /// Counterpart is `follower_id`; used when resolving a user's followers.
    Follower,
}

impl Counterpart {
    fn pick(self, record: &FollowOverride) -> &UserId {
        match self {
            Self::Following => &record.following_id,
            Self::Follower => &record.follower_id,
        }
    }
}

/// Counterpart ids split by override type, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSets {
    /// Ids named by `add` records.
    pub added: Vec<UserId>,
    /// Ids named by `remove` records.
    pub removed: Vec<UserId>,
}

impl OverrideSets {
    /// Partition `records` by type, reading the id on the `counterpart` side.
    ///
    /// Duplicates are kept; both later steps are idempotent over them.
    pub fn partition(records: &[FollowOverride], counterpart: Counterpart) -> Self {
        let mut sets = Self::default();
        for record in records {
            let id = counterpart.pick(record).clone();
            match record.follow_type {
                FollowType::Add => sets.added.push(id),
                FollowType::Remove => sets.removed.push(id),
            }
        }
        sets
    }
}

/// Projects `user` is actively assigned to at `now`, in membership order.
///
/// Memberships whose project reference is missing are skipped even when
/// their dates are active.
pub fn active_project_ids(user: &User, now: DateTime<Utc>) -> Vec<ProjectId> {
    user.projects()
        .iter()
        .filter_map(|membership| membership.active_project(now))
        .collect()
}

/// Roster members sharing at least one active project with `subject`.
///
/// Keeps roster order. The subject is included when it has an active project;
/// [`apply_overrides`] removes it.
pub fn implicit_peers(subject: &User, roster: &[User], now: DateTime<Utc>) -> Vec<User> {
    let subject_projects = active_project_ids(subject, now);
    if subject_projects.is_empty() {
        return Vec::new();
    }

    roster
        .iter()
        .filter(|candidate| {
            active_project_ids(candidate, now)
                .iter()
                .any(|project| subject_projects.contains(project))
        })
        .cloned()
        .collect()
}

/// Apply explicit overrides to an implicit base set.
///
/// Added ids already present are ignored; the rest are resolved against the
/// roster and appended. Added ids missing from the roster are skipped.
/// Removed ids are subtracted afterwards, then `subject` is stripped.
pub fn apply_overrides(
    mut base: Vec<User>,
    overrides: &OverrideSets,
    roster: &[User],
    subject: &UserId,
) -> Vec<User> {
    for added in &overrides.added {
        if base.iter().any(|user| user.id() == added) {
            continue;
        }
        match roster.iter().find(|user| user.id() == added) {
            Some(user) => base.push(user.clone()),
            None => warn!(
                user_id = %subject,
                counterpart_id = %added,
                "follow override references a user missing from the roster"
            ),
        }
    }

    if !overrides.removed.is_empty() {
        base.retain(|user| !overrides.removed.contains(user.id()));
    }

    base.retain(|user| user.id() != subject);
    base
}

/// Users `subject` follows.
///
/// `overrides` must be the records whose follower is `subject`.
pub fn resolve_following(
    subject: &User,
    roster: &[User],
    overrides: &[FollowOverride],
    now: DateTime<Utc>,
) -> Vec<User> {
    let base = if active_project_ids(subject, now).is_empty() {
        roster.to_vec()
    } else {
        implicit_peers(subject, roster, now)
    };
    let sets = OverrideSets::partition(overrides, Counterpart::Following);
    apply_overrides(base, &sets, roster, subject.id())
}

/// Users following `subject`.
///
/// `overrides` must be the records whose following user is `subject`.
pub fn resolve_followers(
    subject: &User,
    roster: &[User],
    overrides: &[FollowOverride],
    now: DateTime<Utc>,
) -> Vec<User> {
    let base = implicit_peers(subject, roster, now);
    let sets = OverrideSets::partition(overrides, Counterpart::Follower);
    apply_overrides(base, &sets, roster, subject.id())
}

#[cfg(test)]
#[path = "follow_resolution_tests.rs"]
mod tests;
