use crate::db_operations::DbOperations;
use crate::error::{TeamFoldError, TeamFoldResult};
use crate::models::{Group, GroupId, GroupRule, User, UserId};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Resolved member sets per group, dropped wholesale on any mutation. The
/// generation counter ticks on every invalidation so a resolution that ran
/// concurrently with a mutation can detect it and discard its result
/// instead of caching a pre-mutation member set.
#[derive(Default)]
struct MembershipCache {
    generation: u64,
    members: HashMap<GroupId, BTreeSet<UserId>>,
}

/// Thread-safe directory of users and groups backed by the document store.
pub struct GroupDirectory {
    db: DbOperations,
    cache: RwLock<MembershipCache>,
}

impl GroupDirectory {
    pub fn new(db: DbOperations) -> Self {
        Self {
            db,
            cache: RwLock::new(MembershipCache::default()),
        }
    }

    // ========== READ SIDE ==========

    /// Resolves a group, stored or virtual, to its current member set.
    pub fn members_of(&self, group_id: &GroupId) -> TeamFoldResult<BTreeSet<UserId>> {
        let generation = {
            let cache = self
                .cache
                .read()
                .map_err(|_| TeamFoldError::Internal("membership cache lock poisoned".into()))?;
            if let Some(members) = cache.members.get(group_id) {
                return Ok(members.clone());
            }
            cache.generation
        };

        let group = self.load_group(group_id)?;
        let members = self.resolve_rule(&group.rule)?;

        self.cache_members_if_current(generation, group_id, &members)?;
        Ok(members)
    }

    /// Lists every group, stored or virtual, the user currently belongs to.
    /// A known user in no groups yields the empty set; an identifier absent
    /// from the user tree is an `UnknownUser` error.
    ///
    /// Tests the user against each rule directly and never materializes any
    /// group's member set, so the cost of the per-user visibility filter
    /// stays independent of group sizes.
    pub fn groups_of(&self, user_id: &UserId) -> TeamFoldResult<BTreeSet<GroupId>> {
        if !self.user_exists(user_id)? {
            return Err(TeamFoldError::UnknownUser(user_id.to_string()));
        }
        let mut groups = BTreeSet::new();
        for group in self.list_groups()? {
            if self.rule_contains(&group.rule, user_id)? {
                groups.insert(group.id);
            }
        }
        Ok(groups)
    }

    /// Looks up a user record, failing with `UnknownUser` for an identifier
    /// the directory has never seen.
    pub fn get_user(&self, user_id: &UserId) -> TeamFoldResult<User> {
        self.db
            .get_from_tree(&self.db.users_tree, user_id.as_str())?
            .ok_or_else(|| TeamFoldError::UnknownUser(user_id.to_string()))
    }

    pub fn user_exists(&self, user_id: &UserId) -> TeamFoldResult<bool> {
        self.db.exists_in_tree(&self.db.users_tree, user_id.as_str())
    }

    pub fn group_exists(&self, group_id: &GroupId) -> TeamFoldResult<bool> {
        self.db
            .exists_in_tree(&self.db.groups_tree, group_id.as_str())
    }

    pub fn get_group(&self, group_id: &GroupId) -> TeamFoldResult<Group> {
        self.load_group(group_id)
    }

    pub fn list_groups(&self) -> TeamFoldResult<Vec<Group>> {
        let items: Vec<(String, Group)> = self.db.list_items_in_tree(&self.db.groups_tree)?;
        Ok(items.into_iter().map(|(_, group)| group).collect())
    }

    pub fn list_users(&self) -> TeamFoldResult<Vec<User>> {
        let items: Vec<(String, User)> = self.db.list_items_in_tree(&self.db.users_tree)?;
        Ok(items.into_iter().map(|(_, user)| user).collect())
    }

    /// User-enumeration hook behind the `Everyone` rule.
    pub fn all_user_ids(&self) -> TeamFoldResult<BTreeSet<UserId>> {
        let keys = self.db.list_keys_in_tree(&self.db.users_tree)?;
        Ok(keys.into_iter().map(UserId::new).collect())
    }

    // ========== ADMINISTRATIVE MUTATIONS ==========
    //
    // Each mutation writes through to the store and invalidates the
    // membership cache before returning.

    pub fn create_user(&self, user: User) -> TeamFoldResult<()> {
        self.db
            .store_in_tree(&self.db.users_tree, user.id.as_str(), &user)?;
        info!("created user {} ({})", user.id, user.full_name());
        self.invalidate_cache()
    }

    /// Flips the active flag. Deactivation does not remove the user from any
    /// group; visibility is unaffected by design.
    pub fn set_user_active(&self, user_id: &UserId, active: bool) -> TeamFoldResult<()> {
        let mut user = self.get_user(user_id)?;
        user.active = active;
        self.db
            .store_in_tree(&self.db.users_tree, user.id.as_str(), &user)?;
        info!("set user {} active={}", user_id, active);
        self.invalidate_cache()
    }

    /// Defines or redefines a group. Every user id the rule names must have
    /// a user record, virtual-rule references must point at existing groups,
    /// and the rule must not introduce a cycle; all are rejected here, at
    /// definition time, never during resolution.
    pub fn define_group(&self, group: Group) -> TeamFoldResult<()> {
        self.assert_acyclic(&group)?;
        self.assert_rule_users_exist(&group.rule)?;
        self.db
            .store_in_tree(&self.db.groups_tree, group.id.as_str(), &group)?;
        info!("defined group {} ({})", group.id, group.name);
        self.invalidate_cache()
    }

    /// Adds a user to a stored group. Virtual groups change only by
    /// redefinition.
    pub fn add_member(&self, group_id: &GroupId, user_id: &UserId) -> TeamFoldResult<()> {
        if !self.user_exists(user_id)? {
            return Err(TeamFoldError::UnknownUser(user_id.to_string()));
        }
        let mut group = self.load_group(group_id)?;
        match &mut group.rule {
            GroupRule::Stored { members } => {
                members.insert(user_id.clone());
            }
            _ => {
                return Err(TeamFoldError::Validation(format!(
                    "group {} is virtual; redefine its rule instead",
                    group_id
                )))
            }
        }
        self.db
            .store_in_tree(&self.db.groups_tree, group.id.as_str(), &group)?;
        debug!("added {} to group {}", user_id, group_id);
        self.invalidate_cache()
    }

    /// Removes a user from a stored group.
    pub fn remove_member(&self, group_id: &GroupId, user_id: &UserId) -> TeamFoldResult<()> {
        let mut group = self.load_group(group_id)?;
        match &mut group.rule {
            GroupRule::Stored { members } => {
                members.remove(user_id);
            }
            _ => {
                return Err(TeamFoldError::Validation(format!(
                    "group {} is virtual; redefine its rule instead",
                    group_id
                )))
            }
        }
        self.db
            .store_in_tree(&self.db.groups_tree, group.id.as_str(), &group)?;
        debug!("removed {} from group {}", user_id, group_id);
        self.invalidate_cache()
    }

    /// Removes a group definition. Refused while another group's rule still
    /// resolves through it.
    pub fn remove_group(&self, group_id: &GroupId) -> TeamFoldResult<()> {
        for other in self.list_groups()? {
            if other.id != *group_id && other.rule.references().contains(&group_id) {
                return Err(TeamFoldError::Validation(format!(
                    "group {} is referenced by the rule of group {}",
                    group_id, other.id
                )));
            }
        }
        if !self.db.delete_from_tree(&self.db.groups_tree, group_id.as_str())? {
            return Err(TeamFoldError::NotFound(format!("group {}", group_id)));
        }
        info!("removed group {}", group_id);
        self.invalidate_cache()
    }

    // ========== INTERNALS ==========

    fn load_group(&self, group_id: &GroupId) -> TeamFoldResult<Group> {
        self.db
            .get_from_tree(&self.db.groups_tree, group_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("group {}", group_id)))
    }

    /// Interprets a rule to a concrete member set. Terminates because the
    /// rule graph is kept acyclic by `define_group`.
    fn resolve_rule(&self, rule: &GroupRule) -> TeamFoldResult<BTreeSet<UserId>> {
        match rule {
            GroupRule::Stored { members } => Ok(members.clone()),
            GroupRule::Everyone => self.all_user_ids(),
            GroupRule::Excluding { base, excluded } => {
                let mut members = self.members_of(base)?;
                for user in excluded {
                    members.remove(user);
                }
                Ok(members)
            }
            GroupRule::Union { left, right } => {
                let mut members = self.members_of(left)?;
                members.extend(self.members_of(right)?);
                Ok(members)
            }
        }
    }

    /// Tests one user against one group without materializing its member
    /// set. A cached set answers from the set directly.
    fn group_contains(&self, group_id: &GroupId, user_id: &UserId) -> TeamFoldResult<bool> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| TeamFoldError::Internal("membership cache lock poisoned".into()))?;
            if let Some(members) = cache.members.get(group_id) {
                return Ok(members.contains(user_id));
            }
        }
        let group = self.load_group(group_id)?;
        self.rule_contains(&group.rule, user_id)
    }

    /// Per-rule membership test. Terminates for the same reason
    /// `resolve_rule` does: the rule graph is kept acyclic.
    fn rule_contains(&self, rule: &GroupRule, user_id: &UserId) -> TeamFoldResult<bool> {
        match rule {
            GroupRule::Stored { members } => Ok(members.contains(user_id)),
            GroupRule::Everyone => self.user_exists(user_id),
            GroupRule::Excluding { base, excluded } => {
                if excluded.contains(user_id) {
                    Ok(false)
                } else {
                    self.group_contains(base, user_id)
                }
            }
            GroupRule::Union { left, right } => {
                Ok(self.group_contains(left, user_id)? || self.group_contains(right, user_id)?)
            }
        }
    }

    /// Rejects a rule naming a user id no record backs, matching the
    /// `add_member` check. Resolution can then trust every stored member id.
    fn assert_rule_users_exist(&self, rule: &GroupRule) -> TeamFoldResult<()> {
        let named = match rule {
            GroupRule::Stored { members } => members,
            GroupRule::Excluding { excluded, .. } => excluded,
            GroupRule::Everyone | GroupRule::Union { .. } => return Ok(()),
        };
        for user_id in named {
            if !self.user_exists(user_id)? {
                return Err(TeamFoldError::UnknownUser(user_id.to_string()));
            }
        }
        Ok(())
    }

    /// Walks the rule graph reachable from `candidate`'s references; finding
    /// the candidate's own id again means the definition would close a cycle.
    /// Unknown references surface as `NotFound` here.
    fn assert_acyclic(&self, candidate: &Group) -> TeamFoldResult<()> {
        let mut stack: Vec<GroupId> = candidate
            .rule
            .references()
            .into_iter()
            .cloned()
            .collect();
        let mut seen = BTreeSet::new();
        while let Some(group_id) = stack.pop() {
            if group_id == candidate.id {
                return Err(TeamFoldError::GroupCycle(candidate.id.to_string()));
            }
            if !seen.insert(group_id.clone()) {
                continue;
            }
            let group = self.load_group(&group_id)?;
            stack.extend(group.rule.references().into_iter().cloned());
        }
        Ok(())
    }

    /// Caches a resolved member set unless a mutation invalidated the cache
    /// while the set was being computed outside the lock. The set resolved
    /// from pre-mutation state must never become visible to later reads.
    fn cache_members_if_current(
        &self,
        generation: u64,
        group_id: &GroupId,
        members: &BTreeSet<UserId>,
    ) -> TeamFoldResult<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| TeamFoldError::Internal("membership cache lock poisoned".into()))?;
        if cache.generation == generation {
            cache.members.insert(group_id.clone(), members.clone());
        }
        Ok(())
    }

    fn invalidate_cache(&self) -> TeamFoldResult<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| TeamFoldError::Internal("membership cache lock poisoned".into()))?;
        cache.members.clear();
        cache.generation = cache.generation.wrapping_add(1);
        Ok(())
    }
}
