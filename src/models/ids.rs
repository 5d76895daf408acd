//! Identifier newtypes.
//!
//! Every entity is addressed by a stable string identifier (UUID v4 for ids
//! minted by this crate). The newtypes keep user, group and resource ids from
//! being mixed up at call sites and order lexicographically so they can live
//! in `BTreeSet`s with deterministic iteration.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mints a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a user
    UserId
);
define_id!(
    /// Identifier of a group, stored or virtual
    GroupId
);
define_id!(
    /// Identifier of an event
    EventId
);
define_id!(
    /// Identifier of a drive folder
    FolderId
);
define_id!(
    /// Identifier of a stored file record
    FileId
);
define_id!(
    /// Identifier of a task
    TaskId
);
