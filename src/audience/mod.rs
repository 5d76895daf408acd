//! The audience engine: who can see a resource, and how to ask the storage
//! layer the same question in bulk.
//!
//! An [`Audience`] is an immutable value embedded in each gated resource.
//! [`resolver::MembershipResolver`] expands it to concrete users or tests a
//! single user against it, [`predicate::audience_filter`] turns the same
//! membership test into a storage predicate, and [`guard::AuthorizationGuard`]
//! layers ownership and elevated-role overrides on top. The resolver and the
//! predicate must agree resource-by-resource; any divergence is a security
//! bug, and `tests/consistency_tests.rs` checks the law over a generated
//! grid.

pub mod guard;
pub mod predicate;
pub mod resolver;

use crate::models::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of users and groups permitted to view a resource. Built through
/// [`resolver::MembershipResolver::normalize`], which validates the group
/// references; the sets keep both sides deduplicated structurally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    pub users: BTreeSet<UserId>,
    pub groups: BTreeSet<GroupId>,
}

impl Audience {
    pub fn new(
        users: impl IntoIterator<Item = UserId>,
        groups: impl IntoIterator<Item = GroupId>,
    ) -> Self {
        Self {
            users: users.into_iter().collect(),
            groups: groups.into_iter().collect(),
        }
    }

    /// True when neither users nor groups are declared. Note that a
    /// non-declared-empty audience can still resolve to zero users (all its
    /// groups empty); `normalize` rejects both.
    pub fn is_declared_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

/// Unvalidated audience as received from the outside, e.g. a request body.
/// Duplicates are tolerated here and removed by normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAudience {
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

/// Capability of resources gated by an audience.
pub trait HasAudience {
    fn audience(&self) -> &Audience;
}

/// Capability of resources with a recorded creator, consulted by the
/// modification guard independently of visibility.
pub trait Owned {
    fn creator(&self) -> &UserId;
}
