//! Membership resolution: expanding an audience into concrete users and
//! testing a single user against one.

use super::{Audience, RawAudience};
use crate::directory::GroupDirectory;
use crate::error::{TeamFoldError, TeamFoldResult};
use crate::models::UserId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Expands audiences and answers single-user membership questions against
/// the group directory. Pure reads; safe to share across requests.
#[derive(Clone)]
pub struct MembershipResolver {
    directory: Arc<GroupDirectory>,
}

impl MembershipResolver {
    pub fn new(directory: Arc<GroupDirectory>) -> Self {
        Self { directory }
    }

    /// Validates a raw audience into a well-formed [`Audience`].
    ///
    /// Deduplicates both sides, rejects unknown group references
    /// (`InvalidAudience`) and rejects an audience whose resolved membership
    /// is empty (`EmptyAudience`); a resource nobody can see is a
    /// configuration error, not something to accept silently. Group
    /// validation runs first so the more specific failure wins.
    pub fn normalize(&self, raw: RawAudience) -> TeamFoldResult<Audience> {
        let audience = Audience::new(raw.users, raw.groups);
        for group_id in &audience.groups {
            if !self.directory.group_exists(group_id)? {
                return Err(TeamFoldError::InvalidAudience(format!(
                    "unknown group {}",
                    group_id
                )));
            }
        }
        if self.expand(&audience)?.is_empty() {
            return Err(TeamFoldError::EmptyAudience);
        }
        Ok(audience)
    }

    /// Resolves the audience to the deduplicated set of users it covers:
    /// the explicit users plus every member of every listed group.
    pub fn expand(&self, audience: &Audience) -> TeamFoldResult<BTreeSet<UserId>> {
        let mut members = audience.users.clone();
        for group_id in &audience.groups {
            members.extend(self.directory.members_of(group_id)?);
        }
        Ok(members)
    }

    /// Whether the audience covers this user.
    ///
    /// Equivalent to `expand(audience).contains(user)` but checks the
    /// explicit user set first and then intersects the user's own groups
    /// with the audience's groups and never expands a group's membership,
    /// which keeps the cost proportional to the handful of groups one user
    /// belongs to.
    pub fn contains(&self, audience: &Audience, user_id: &UserId) -> TeamFoldResult<bool> {
        if audience.users.contains(user_id) {
            return Ok(true);
        }
        if audience.groups.is_empty() {
            return Ok(false);
        }
        let user_groups = self.directory.groups_of(user_id)?;
        Ok(user_groups
            .intersection(&audience.groups)
            .next()
            .is_some())
    }

    /// Fails with `CreatorExcluded` when the audience does not cover the
    /// user. Creators must keep visibility of what they create, or they
    /// could lock themselves out at creation time.
    pub fn ensure_includes(&self, audience: &Audience, user_id: &UserId) -> TeamFoldResult<()> {
        if self.contains(audience, user_id)? {
            Ok(())
        } else {
            Err(TeamFoldError::CreatorExcluded(user_id.to_string()))
        }
    }

    pub fn directory(&self) -> &GroupDirectory {
        &self.directory
    }
}
