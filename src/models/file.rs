use super::ids::{FileId, FolderId, UserId};
use crate::audience::Owned;
use serde::{Deserialize, Serialize};

/// Metadata record for an uploaded file. The bytes themselves live in the
/// external object store; this crate only tracks the record and gates access
/// through the owning folder's audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub original_name: String,
    pub folder: FolderId,
    pub size: u64,
    pub mimetype: String,
    pub creator: UserId,
}

impl Owned for FileRecord {
    fn creator(&self) -> &UserId {
        &self.creator
    }
}
