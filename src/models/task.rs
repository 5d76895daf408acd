use super::ids::{TaskId, UserId};
use crate::audience::Owned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task assigned to a single user. Tasks are scoped to their assignee and
/// creator rather than an audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assignee: UserId,
    pub due_date: DateTime<Utc>,
    pub creator: UserId,
    pub completed: bool,
}

impl Owned for Task {
    fn creator(&self) -> &UserId {
        &self.creator
    }
}
