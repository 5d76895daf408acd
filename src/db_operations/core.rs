use crate::error::TeamFoldResult;
use serde::{de::DeserializeOwned, Serialize};

/// Unified access to the embedded sled database.
///
/// Every entity kind lives in its own named tree and is stored as a JSON
/// document, which keeps the stored shape readable by the predicate
/// evaluator in `query.rs`. Writes flush before returning so an
/// authorization decision taken right after a mutation never observes a
/// half-written state.
#[derive(Clone)]
pub struct DbOperations {
    /// The underlying sled database instance
    db: sled::Db,
    /// Cached trees, one per entity kind
    pub(crate) users_tree: sled::Tree,
    pub(crate) groups_tree: sled::Tree,
    pub(crate) events_tree: sled::Tree,
    pub(crate) folders_tree: sled::Tree,
    pub(crate) files_tree: sled::Tree,
    pub(crate) tasks_tree: sled::Tree,
    pub(crate) attendance_tree: sled::Tree,
}

impl DbOperations {
    /// Creates a new DbOperations instance with all required trees opened.
    pub fn new(db: sled::Db) -> Result<Self, sled::Error> {
        let users_tree = db.open_tree("users")?;
        let groups_tree = db.open_tree("groups")?;
        let events_tree = db.open_tree("events")?;
        let folders_tree = db.open_tree("folders")?;
        let files_tree = db.open_tree("files")?;
        let tasks_tree = db.open_tree("tasks")?;
        let attendance_tree = db.open_tree("attendance")?;

        Ok(Self {
            db,
            users_tree,
            groups_tree,
            events_tree,
            folders_tree,
            files_tree,
            tasks_tree,
            attendance_tree,
        })
    }

    /// Opens a throwaway in-memory database, used by tests.
    pub fn temporary() -> Result<Self, sled::Error> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::new(db)
    }

    /// Gets a reference to the underlying database
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn users_tree(&self) -> &sled::Tree {
        &self.users_tree
    }

    pub fn groups_tree(&self) -> &sled::Tree {
        &self.groups_tree
    }

    pub fn events_tree(&self) -> &sled::Tree {
        &self.events_tree
    }

    pub fn folders_tree(&self) -> &sled::Tree {
        &self.folders_tree
    }

    pub fn files_tree(&self) -> &sled::Tree {
        &self.files_tree
    }

    pub fn tasks_tree(&self) -> &sled::Tree {
        &self.tasks_tree
    }

    pub fn attendance_tree(&self) -> &sled::Tree {
        &self.attendance_tree
    }

    /// Stores a serializable item in a specific tree
    pub fn store_in_tree<T: Serialize>(
        &self,
        tree: &sled::Tree,
        key: &str,
        item: &T,
    ) -> TeamFoldResult<()> {
        let bytes = serde_json::to_vec(item)?;
        tree.insert(key.as_bytes(), bytes)?;

        // Ensure the data is durably written to disk
        tree.flush()?;
        Ok(())
    }

    /// Retrieves a deserializable item from a specific tree
    pub fn get_from_tree<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        key: &str,
    ) -> TeamFoldResult<Option<T>> {
        match tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Deletes an item from a specific tree. Returns whether it existed.
    pub fn delete_from_tree(&self, tree: &sled::Tree, key: &str) -> TeamFoldResult<bool> {
        let existed = tree.remove(key.as_bytes())?.is_some();
        tree.flush()?;
        Ok(existed)
    }

    /// Checks if a key exists in a specific tree
    pub fn exists_in_tree(&self, tree: &sled::Tree, key: &str) -> TeamFoldResult<bool> {
        Ok(tree.contains_key(key.as_bytes())?)
    }

    /// Lists all key-value pairs in a tree
    pub fn list_items_in_tree<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
    ) -> TeamFoldResult<Vec<(String, T)>> {
        let mut items = Vec::new();
        for result in tree.iter() {
            let (key, value) = result?;
            let key_str = String::from_utf8_lossy(&key).to_string();
            let item = serde_json::from_slice(&value)?;
            items.push((key_str, item));
        }
        Ok(items)
    }

    /// Lists all keys in a tree
    pub fn list_keys_in_tree(&self, tree: &sled::Tree) -> TeamFoldResult<Vec<String>> {
        let mut keys = Vec::new();
        for result in tree.iter() {
            let (key, _) = result?;
            keys.push(String::from_utf8_lossy(&key).to_string());
        }
        Ok(keys)
    }
}
