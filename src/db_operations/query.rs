//! Predicate-driven bulk queries.
//!
//! This is the reference storage query executor: it interprets the opaque
//! [`Predicate`] built by the audience layer against each stored JSON
//! document. A backend with real indexes would translate the same predicate
//! into its own query language instead; the predicate value never depends on
//! this scan-based implementation.

use super::core::DbOperations;
use crate::audience::predicate::Predicate;
use crate::error::TeamFoldResult;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl DbOperations {
    /// Returns every document in the tree matching the predicate,
    /// deserialized into `T`.
    pub fn find_matching<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        predicate: &Predicate,
    ) -> TeamFoldResult<Vec<T>> {
        let mut matches = Vec::new();
        for result in tree.iter() {
            let (_, bytes) = result?;
            let doc: Value = serde_json::from_slice(&bytes)?;
            if predicate.matches(&doc) {
                matches.push(serde_json::from_value(doc)?);
            }
        }
        Ok(matches)
    }

    /// Returns the first matching document, if any. Used for point lookups
    /// that must also pass a visibility filter.
    pub fn find_one_matching<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        predicate: &Predicate,
    ) -> TeamFoldResult<Option<T>> {
        for result in tree.iter() {
            let (_, bytes) = result?;
            let doc: Value = serde_json::from_slice(&bytes)?;
            if predicate.matches(&doc) {
                return Ok(Some(serde_json::from_value(doc)?));
            }
        }
        Ok(None)
    }
}
