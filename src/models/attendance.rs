use super::ids::{EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user attendance state for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Absent,
    Present,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub user: UserId,
    pub status: AttendanceStatus,
}

/// Attendance sheet for one event, seeded with every audience member marked
/// absent when the event is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub event: EventId,
    pub event_date: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
}

impl AttendanceRecord {
    /// Sets the status of one attendee. Returns false when the user is not
    /// on the sheet.
    pub fn mark(&mut self, user: &UserId, status: AttendanceStatus) -> bool {
        for attendee in &mut self.attendees {
            if &attendee.user == user {
                attendee.status = status;
                return true;
            }
        }
        false
    }

    pub fn status_of(&self, user: &UserId) -> Option<AttendanceStatus> {
        self.attendees
            .iter()
            .find(|a| &a.user == user)
            .map(|a| a.status)
    }
}

/// Aggregated attendance history for one user: how many events they made,
/// and which ones they missed without excuse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsenceSummary {
    pub present: u32,
    pub absences: Vec<EventId>,
}
