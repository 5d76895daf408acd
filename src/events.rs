//! Calendar events and attendance, built on the audience engine.
//!
//! Read paths merge the per-user visibility filter with date conditions into
//! one bulk query; the create path validates the audience and enforces
//! creator inclusion before anything is persisted.

use crate::audience::guard::AuthorizationGuard;
use crate::audience::predicate::{audience_filter, Compare, Predicate};
use crate::audience::resolver::MembershipResolver;
use crate::audience::RawAudience;
use crate::db_operations::DbOperations;
use crate::directory::GroupDirectory;
use crate::error::{TeamFoldError, TeamFoldResult};
use crate::models::{
    AbsenceSummary, AttendanceRecord, AttendanceStatus, Attendee, Event, EventId, User, UserId,
};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

/// Parameters for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub audience: RawAudience,
    pub has_attendance: bool,
}

/// A freshly created event together with the concrete users its audience
/// expands to, the input for whatever notification channel the embedding
/// application uses. Recipients include deactivated users; filtering on
/// `User::active` is the caller's product decision.
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub event: Event,
    pub recipients: Vec<User>,
}

#[derive(Clone)]
pub struct EventManager {
    db: DbOperations,
    directory: Arc<GroupDirectory>,
    resolver: MembershipResolver,
    guard: AuthorizationGuard,
}

impl EventManager {
    pub fn new(
        db: DbOperations,
        directory: Arc<GroupDirectory>,
        resolver: MembershipResolver,
        guard: AuthorizationGuard,
    ) -> Self {
        Self {
            db,
            directory,
            resolver,
            guard,
        }
    }

    /// Events within `[start, end)` visible to the user, sorted by date.
    pub fn events_between(
        &self,
        user: &User,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TeamFoldResult<Vec<Event>> {
        let filter = audience_filter(&self.directory, &user.id)?
            .and(Predicate::field(
                "date",
                Compare::Gte,
                serde_json::to_value(start)?,
            ))
            .and(Predicate::field(
                "date",
                Compare::Lt,
                serde_json::to_value(end)?,
            ));
        let mut events: Vec<Event> = self.db.find_matching(&self.db.events_tree, &filter)?;
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    /// Future events visible to the user, soonest first.
    pub fn upcoming_events(&self, user: &User) -> TeamFoldResult<Vec<Event>> {
        let filter = audience_filter(&self.directory, &user.id)?.and(Predicate::field(
            "date",
            Compare::Gte,
            serde_json::to_value(Utc::now())?,
        ));
        let mut events: Vec<Event> = self.db.find_matching(&self.db.events_tree, &filter)?;
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    /// Creates an event. Requires an elevated creator; the audience is
    /// normalized, must cover the creator, and the recipient list resolves
    /// fully before any write happens, so a rejected request leaves nothing
    /// behind.
    pub fn create_event(&self, creator: &User, new_event: NewEvent) -> TeamFoldResult<CreatedEvent> {
        if !self.guard.is_elevated(creator) {
            return Err(TeamFoldError::PermissionDenied(
                "only leaders and admins can create events".to_string(),
            ));
        }

        let audience = self.resolver.normalize(new_event.audience)?;
        self.resolver.ensure_includes(&audience, &creator.id)?;

        let member_ids = self.resolver.expand(&audience)?;
        let mut recipients = Vec::with_capacity(member_ids.len());
        for user_id in &member_ids {
            recipients.push(self.directory.get_user(user_id)?);
        }

        let description = new_event
            .description
            .filter(|text| !text.trim().is_empty());

        let event = Event {
            id: EventId::random(),
            name: new_event.name.trim().to_string(),
            date: new_event.date,
            description,
            audience,
            creator: creator.id.clone(),
            has_attendance: new_event.has_attendance,
        };

        self.db
            .store_in_tree(&self.db.events_tree, event.id.as_str(), &event)?;

        if event.has_attendance {
            let record = AttendanceRecord {
                event: event.id.clone(),
                event_date: event.date,
                attendees: member_ids
                    .iter()
                    .map(|user_id| Attendee {
                        user: user_id.clone(),
                        status: AttendanceStatus::Absent,
                    })
                    .collect(),
            };
            self.db
                .store_in_tree(&self.db.attendance_tree, event.id.as_str(), &record)?;
        }

        info!(
            "created event {} ({}) for {} recipients",
            event.id,
            event.name,
            recipients.len()
        );

        Ok(CreatedEvent { event, recipients })
    }

    /// Deletes an event and its attendance sheet. Creator or elevated only.
    pub fn delete_event(&self, user: &User, event_id: &EventId) -> TeamFoldResult<()> {
        let event: Event = self
            .db
            .get_from_tree(&self.db.events_tree, event_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("event {}", event_id)))?;

        if !self.guard.can_modify(user, &event)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} may not delete event {}",
                user.id, event_id
            )));
        }

        self.db.delete_from_tree(&self.db.events_tree, event_id.as_str())?;
        self.db
            .delete_from_tree(&self.db.attendance_tree, event_id.as_str())?;
        info!("deleted event {}", event_id);
        Ok(())
    }

    pub fn attendance_for(&self, event_id: &EventId) -> TeamFoldResult<AttendanceRecord> {
        self.db
            .get_from_tree(&self.db.attendance_tree, event_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("attendance for event {}", event_id)))
    }

    /// Replaces the attendance sheet wholesale. Elevated only.
    pub fn update_attendance(
        &self,
        user: &User,
        event_id: &EventId,
        attendees: Vec<Attendee>,
    ) -> TeamFoldResult<()> {
        if !self.guard.is_elevated(user) {
            return Err(TeamFoldError::PermissionDenied(
                "only leaders and admins can update attendance".to_string(),
            ));
        }
        let mut record = self.attendance_for(event_id)?;
        record.attendees = attendees;
        self.db
            .store_in_tree(&self.db.attendance_tree, event_id.as_str(), &record)
    }

    /// Marks a single attendee as excused. Elevated only.
    pub fn excuse_absence(
        &self,
        user: &User,
        event_id: &EventId,
        target: &UserId,
    ) -> TeamFoldResult<()> {
        if !self.guard.is_elevated(user) {
            return Err(TeamFoldError::PermissionDenied(
                "only leaders and admins can excuse absences".to_string(),
            ));
        }
        let mut record = self.attendance_for(event_id)?;
        if !record.mark(target, AttendanceStatus::Excused) {
            return Err(TeamFoldError::NotFound(format!(
                "user {} on attendance sheet of event {}",
                target, event_id
            )));
        }
        self.db
            .store_in_tree(&self.db.attendance_tree, event_id.as_str(), &record)
    }

    /// Attendance history for one user within a date window. `end` defaults
    /// to now. Excused absences count neither way.
    pub fn absence_summary(
        &self,
        target: &UserId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> TeamFoldResult<AbsenceSummary> {
        let end = end.unwrap_or_else(Utc::now);
        let mut filter = Predicate::all().and(Predicate::field(
            "event_date",
            Compare::Lte,
            serde_json::to_value(end)?,
        ));
        if let Some(start) = start {
            filter = filter.and(Predicate::field(
                "event_date",
                Compare::Gte,
                serde_json::to_value(start)?,
            ));
        }

        let records: Vec<AttendanceRecord> =
            self.db.find_matching(&self.db.attendance_tree, &filter)?;

        let mut summary = AbsenceSummary::default();
        for record in records {
            match record.status_of(target) {
                Some(AttendanceStatus::Present) => summary.present += 1,
                Some(AttendanceStatus::Absent) => summary.absences.push(record.event.clone()),
                Some(AttendanceStatus::Excused) | None => {}
            }
        }
        Ok(summary)
    }
}
