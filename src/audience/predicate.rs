//! The query-side half of the audience engine.
//!
//! [`audience_filter`] translates "resources whose audience contains this
//! user" into a serializable [`Predicate`] the storage layer can interpret,
//! without expanding any group's membership. Additional conditions such as
//! date ranges compose onto it with [`Predicate::and`], so one bulk query
//! carries both the visibility filter and the domain filters.

use crate::directory::GroupDirectory;
use crate::error::TeamFoldResult;
use crate::models::{GroupId, UserId};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Comparison operators for [`Predicate::Field`] conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compare {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Matches on presence/absence of the field; the expected value is a
    /// boolean.
    Exists,
}

/// Storage-layer filter over stored JSON documents.
///
/// The audience-aware variants read the document's embedded `audience`
/// object; `Field` covers ordinary conditions addressed by dot-separated
/// path. The value is self-describing and serializable so a storage backend
/// can translate it into its own query language instead of scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// `audience.users` contains the user
    UserMatch { user: UserId },
    /// `audience.groups` intersects the given set
    GroupOverlap { groups: BTreeSet<GroupId> },
    /// Scalar comparison against the value at `path`
    Field {
        path: String,
        compare: Compare,
        value: Value,
    },
    /// Every clause matches. Empty means match-all.
    And { clauses: Vec<Predicate> },
    /// At least one clause matches. Empty means match-none.
    Or { clauses: Vec<Predicate> },
}

impl Predicate {
    /// Predicate matching every document.
    pub fn all() -> Self {
        Predicate::And { clauses: Vec::new() }
    }

    pub fn field(path: impl Into<String>, compare: Compare, value: Value) -> Self {
        Predicate::Field {
            path: path.into(),
            compare,
            value,
        }
    }

    /// Conjoins another condition, flattening nested `And`s.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And { mut clauses } => {
                clauses.push(other);
                Predicate::And { clauses }
            }
            first => Predicate::And {
                clauses: vec![first, other],
            },
        }
    }

    /// Evaluates the predicate against one stored document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::UserMatch { user } => doc
                .get("audience")
                .and_then(|a| a.get("users"))
                .and_then(Value::as_array)
                .is_some_and(|users| users.iter().any(|v| v.as_str() == Some(user.as_str()))),
            Predicate::GroupOverlap { groups } => doc
                .get("audience")
                .and_then(|a| a.get("groups"))
                .and_then(Value::as_array)
                .is_some_and(|doc_groups| {
                    doc_groups
                        .iter()
                        .filter_map(Value::as_str)
                        .any(|g| groups.contains(&GroupId::new(g)))
                }),
            Predicate::Field {
                path,
                compare,
                value,
            } => compare_at_path(doc, path, *compare, value),
            Predicate::And { clauses } => clauses.iter().all(|c| c.matches(doc)),
            Predicate::Or { clauses } => clauses.iter().any(|c| c.matches(doc)),
        }
    }
}

/// Builds the visibility filter for one user: `audience.users` contains the
/// user, or `audience.groups` intersects the groups the user belongs to.
///
/// Resolves only `groups_of(user)`; cost grows with the number of groups
/// this user is in, never with the size of any group. An unresolvable user
/// id aborts the query with `UnknownUser` (fail-closed); a known user in no
/// groups still gets the explicit-user arm.
pub fn audience_filter(directory: &GroupDirectory, user_id: &UserId) -> TeamFoldResult<Predicate> {
    let groups = directory.groups_of(user_id)?;
    let mut clauses = vec![Predicate::UserMatch {
        user: user_id.clone(),
    }];
    if !groups.is_empty() {
        clauses.push(Predicate::GroupOverlap { groups });
    }
    Ok(Predicate::Or { clauses })
}

fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, segment| value.get(segment))
}

fn compare_at_path(doc: &Value, path: &str, compare: Compare, expected: &Value) -> bool {
    let found = lookup_path(doc, path);
    if let Compare::Exists = compare {
        let wants_present = expected.as_bool().unwrap_or(true);
        return (found.is_some() && !found.is_some_and(Value::is_null)) == wants_present;
    }
    let Some(found) = found else {
        // A missing field satisfies only inequality.
        return matches!(compare, Compare::Ne);
    };
    match order_scalars(found, expected) {
        Some(ordering) => match compare {
            Compare::Eq => ordering == Ordering::Equal,
            Compare::Ne => ordering != Ordering::Equal,
            Compare::Gt => ordering == Ordering::Greater,
            Compare::Gte => ordering != Ordering::Less,
            Compare::Lt => ordering == Ordering::Less,
            Compare::Lte => ordering != Ordering::Greater,
            Compare::Exists => unreachable!("handled above"),
        },
        // Incomparable types: equal only if structurally identical.
        None => match compare {
            Compare::Eq => found == expected,
            Compare::Ne => found != expected,
            _ => false,
        },
    }
}

/// Orders two JSON scalars. Strings that both parse as RFC 3339 timestamps
/// compare chronologically, so documents written with differing offsets or
/// subsecond precision still order correctly.
fn order_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
