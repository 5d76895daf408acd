//! Single-resource authorization decisions.

use super::resolver::MembershipResolver;
use super::{HasAudience, Owned};
use crate::error::TeamFoldResult;
use crate::models::{Position, User};
use std::sync::Arc;

/// Capability interface answering "may this user bypass audience and
/// ownership checks". All elevated-role decisions in the crate go through
/// this one seam, so an embedding application can substitute its own role
/// subsystem.
pub trait ElevationOracle: Send + Sync {
    fn is_elevated(&self, user: &User) -> bool;
}

/// Default oracle: leaders and admins are elevated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionOracle;

impl ElevationOracle for PositionOracle {
    fn is_elevated(&self, user: &User) -> bool {
        matches!(user.position, Position::Leader | Position::Admin)
    }
}

/// Combines audience visibility with ownership/role overrides into the
/// yes/no decisions taken at read, write and delete time. All decisions are
/// pure and synchronous over already-loaded data; failures only propagate
/// from the directory lookups underneath.
#[derive(Clone)]
pub struct AuthorizationGuard {
    resolver: MembershipResolver,
    oracle: Arc<dyn ElevationOracle>,
}

impl AuthorizationGuard {
    pub fn new(resolver: MembershipResolver, oracle: Arc<dyn ElevationOracle>) -> Self {
        Self { resolver, oracle }
    }

    /// Visibility: exactly the audience membership test.
    pub fn can_view<R: HasAudience>(&self, user: &User, resource: &R) -> TeamFoldResult<bool> {
        self.resolver.contains(resource.audience(), &user.id)
    }

    /// Modification: creator or elevated role. Deliberately independent of
    /// visibility; ownership survives membership changes that would hide
    /// the resource from its creator.
    pub fn can_modify<R: Owned>(&self, user: &User, resource: &R) -> TeamFoldResult<bool> {
        Ok(resource.creator() == &user.id || self.oracle.is_elevated(user))
    }

    pub fn is_elevated(&self, user: &User) -> bool {
        self.oracle.is_elevated(user)
    }
}
