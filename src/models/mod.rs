//! Domain value types: identifiers, users, groups and the audience-gated
//! resources (events, folders, files, tasks).

mod attendance;
mod event;
mod file;
mod folder;
mod group;
mod ids;
mod task;
mod user;

pub use attendance::{AbsenceSummary, AttendanceRecord, AttendanceStatus, Attendee};
pub use event::Event;
pub use file::FileRecord;
pub use folder::Folder;
pub use group::{Group, GroupRule};
pub use ids::{EventId, FileId, FolderId, GroupId, TaskId, UserId};
pub use task::Task;
pub use user::{Position, User};
