use super::ids::{EventId, UserId};
use crate::audience::{Audience, HasAudience, Owned};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event visible to its audience.
///
/// The audience is fixed at creation time; no operation rewrites it
/// afterwards, so visibility of an existing event only changes through group
/// membership changes in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub audience: Audience,
    pub creator: UserId,
    pub has_attendance: bool,
}

impl HasAudience for Event {
    fn audience(&self) -> &Audience {
        &self.audience
    }
}

impl Owned for Event {
    fn creator(&self) -> &UserId {
        &self.creator
    }
}
