use super::ids::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a group's membership is determined.
///
/// `Stored` groups are flat member containers. The remaining variants are
/// *virtual* groups whose membership is computed on demand by the directory's
/// rule interpreter. Rule references (`base`, `left`, `right`) form a graph
/// that must stay acyclic; the directory rejects a definition that would
/// introduce a cycle, so resolution always terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupRule {
    /// Explicitly stored member set
    Stored { members: BTreeSet<UserId> },
    /// Every user currently known to the directory
    Everyone,
    /// Members of `base`, minus an explicit exclusion set
    Excluding {
        base: GroupId,
        excluded: BTreeSet<UserId>,
    },
    /// Union of two other groups
    Union { left: GroupId, right: GroupId },
}

impl GroupRule {
    /// Creates a stored rule from any iterator of user ids.
    pub fn stored(members: impl IntoIterator<Item = UserId>) -> Self {
        GroupRule::Stored {
            members: members.into_iter().collect(),
        }
    }

    /// Group ids this rule resolves through. Empty for `Stored` and
    /// `Everyone`.
    pub fn references(&self) -> Vec<&GroupId> {
        match self {
            GroupRule::Stored { .. } | GroupRule::Everyone => Vec::new(),
            GroupRule::Excluding { base, .. } => vec![base],
            GroupRule::Union { left, right } => vec![left, right],
        }
    }
}

/// A named group. Stored groups can be mutated member-by-member; virtual
/// groups change only by redefinition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub rule: GroupRule,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, rule: GroupRule) -> Self {
        Self {
            id,
            name: name.into(),
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_of_each_rule_kind() {
        let stored = GroupRule::stored([UserId::new("u-1")]);
        assert!(stored.references().is_empty());
        assert!(GroupRule::Everyone.references().is_empty());

        let excluding = GroupRule::Excluding {
            base: GroupId::new("g-base"),
            excluded: BTreeSet::new(),
        };
        assert_eq!(excluding.references(), vec![&GroupId::new("g-base")]);

        let union = GroupRule::Union {
            left: GroupId::new("g-a"),
            right: GroupId::new("g-b"),
        };
        assert_eq!(union.references().len(), 2);
    }

    #[test]
    fn test_rule_round_trips_through_json_tagging() {
        let rule = GroupRule::Excluding {
            base: GroupId::new("g-all"),
            excluded: [UserId::new("u-9")].into_iter().collect(),
        };
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["kind"], "excluding");
        let back: GroupRule = serde_json::from_value(value).unwrap();
        assert_eq!(back, rule);
    }
}
