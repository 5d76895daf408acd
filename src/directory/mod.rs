//! Group Directory: stored and virtual groups, membership resolution and the
//! administrative mutation surface.
//!
//! The directory is the single owner of group/user membership data. Both
//! directions of the membership relation are served from here:
//! `members_of` expands one group into users, `groups_of` lists every group
//! containing one user, and the two always agree because `groups_of` is
//! defined in terms of `members_of`.
//!
//! Resolved member sets are cached behind an `RwLock`; every mutating call
//! drops the cache before it returns, so an authorization decision taken
//! immediately after a membership change never sees stale data.

mod group_directory;

pub use group_directory::GroupDirectory;
