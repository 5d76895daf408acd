use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Position a user holds within the organization. `Leader` and `Admin` are
/// the elevated positions consulted by the authorization guard's default
/// oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Member,
    Leader,
    Admin,
}

/// A member of the organization. Identity is established by the surrounding
/// application; this crate only consumes already-authenticated users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: Position,
    /// Deactivated users stay resolvable for visibility decisions; callers
    /// that expand audiences into mailing lists decide whether to filter on
    /// this flag.
    pub active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
