//! teamfold: backend core for a team organization product.
//!
//! Events, tasks and drive folders are visible only to a dynamically
//! computed *audience* of users: explicit users plus groups, where a group
//! can be a stored member list or a rule-defined virtual group. The crate
//! centers on the audience engine:
//!
//! - [`directory::GroupDirectory`] resolves groups to users and users to
//!   groups, with a synchronously invalidated membership cache.
//! - [`audience::resolver::MembershipResolver`] expands an audience to
//!   concrete users and answers single-user membership.
//! - [`audience::predicate`] turns the same membership test into a
//!   storage-level filter for bulk queries.
//! - [`audience::guard::AuthorizationGuard`] layers ownership and
//!   elevated-role overrides for write-time decisions.
//!
//! The single-resource check and the bulk-query filter are guaranteed to
//! agree; that law is exercised in `tests/consistency_tests.rs`.
//!
//! Identity, HTTP, object storage and email all live outside this crate.

pub mod audience;
pub mod config;
pub mod db_operations;
pub mod directory;
pub mod drive;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod tasks;

mod teamfold;

pub use audience::guard::{AuthorizationGuard, ElevationOracle, PositionOracle};
pub use audience::predicate::{audience_filter, Compare, Predicate};
pub use audience::resolver::MembershipResolver;
pub use audience::{Audience, HasAudience, Owned, RawAudience};
pub use config::TeamFoldConfig;
pub use db_operations::DbOperations;
pub use directory::GroupDirectory;
pub use drive::{DriveManager, NewFile, NewFolder};
pub use error::{TeamFoldError, TeamFoldResult};
pub use events::{CreatedEvent, EventManager, NewEvent};
pub use models::{
    AbsenceSummary, AttendanceRecord, AttendanceStatus, Attendee, Event, EventId, FileId,
    FileRecord, Folder, FolderId, Group, GroupId, GroupRule, Position, Task, TaskId, User, UserId,
};
pub use tasks::{NewTask, TaskManager};
pub use teamfold::TeamFold;
