use super::ids::{FolderId, UserId};
use crate::audience::{Audience, HasAudience, Owned};
use serde::{Deserialize, Serialize};

/// A drive folder. Files do not carry their own audience; access to a file
/// is always decided through the audience of the folder holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub audience: Audience,
    pub creator: UserId,
    /// `None` for a root-level folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    /// Default folders are installed at setup time and can be neither
    /// renamed nor deleted.
    pub default_folder: bool,
}

impl HasAudience for Folder {
    fn audience(&self) -> &Audience {
        &self.audience
    }
}

impl Owned for Folder {
    fn creator(&self) -> &UserId {
        &self.creator
    }
}
