//! Unified error handling for teamfold.
//!
//! Every fallible operation in the crate returns [`TeamFoldResult`]. The
//! audience-resolution failures (`InvalidAudience`, `EmptyAudience`,
//! `CreatorExcluded`, `UnknownUser`, `GroupCycle`) are local validation or
//! lookup failures and are never retried; callers surface them as request
//! rejections. A failure while building a bulk-query filter aborts the whole
//! query rather than degrading into an empty result set.

use thiserror::Error;

/// Result type for teamfold operations
pub type TeamFoldResult<T> = Result<T, TeamFoldError>;

/// Error types for teamfold operations
#[derive(Error, Debug)]
pub enum TeamFoldError {
    /// Unknown group or resource identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// User identifier that cannot be resolved at all. Distinct from a known
    /// user who simply belongs to no groups, which is not an error.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Audience referencing a group the directory cannot resolve
    #[error("invalid audience: {0}")]
    InvalidAudience(String),

    /// Audience whose resolved membership is empty
    #[error("audience resolves to no users")]
    EmptyAudience,

    /// Audience that does not cover the creator of its resource
    #[error("audience does not include its creator {0}")]
    CreatorExcluded(String),

    /// Group rule graph that would stop resolution from terminating
    #[error("group rule cycle through {0}")]
    GroupCycle(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
