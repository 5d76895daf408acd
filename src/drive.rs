//! Shared drive folders and file records.
//!
//! Folders carry the audience; file records inherit visibility from their
//! folder. The object-store bytes live outside this crate; only metadata
//! and access decisions are handled here.

use crate::audience::guard::AuthorizationGuard;
use crate::audience::predicate::{audience_filter, Compare, Predicate};
use crate::audience::resolver::MembershipResolver;
use crate::audience::RawAudience;
use crate::db_operations::DbOperations;
use crate::directory::GroupDirectory;
use crate::error::{TeamFoldError, TeamFoldResult};
use crate::models::{FileId, FileRecord, Folder, FolderId, User};
use log::info;
use serde_json::json;
use std::sync::Arc;

/// Longest accepted folder name at creation time, counted in characters.
const MAX_FOLDER_NAME_CREATE: usize = 21;
/// Longest accepted folder name on rename, counted in characters.
const MAX_FOLDER_NAME_RENAME: usize = 19;

/// Parameters for creating a folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub audience: RawAudience,
    pub parent: Option<FolderId>,
}

/// Parameters for registering an uploaded file.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub original_name: String,
    pub folder: FolderId,
    pub size: u64,
}

#[derive(Clone)]
pub struct DriveManager {
    db: DbOperations,
    directory: Arc<GroupDirectory>,
    resolver: MembershipResolver,
    guard: AuthorizationGuard,
}

impl DriveManager {
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

    /// Root-level folders visible to the user.
    pub fn root_folders(&self, user: &User) -> TeamFoldResult<Vec<Folder>> {
        let filter = audience_filter(&self.directory, &user.id)?.and(Predicate::field(
            "parent",
            Compare::Exists,
            json!(false),
        ));
        self.db.find_matching(&self.db.folders_tree, &filter)
    }

    /// Direct subfolders of `parent` visible to the user.
    pub fn subfolders(&self, user: &User, parent: &FolderId) -> TeamFoldResult<Vec<Folder>> {
        let filter = audience_filter(&self.directory, &user.id)?.and(Predicate::field(
            "parent",
            Compare::Eq,
            json!(parent.as_str()),
        ));
        self.db.find_matching(&self.db.folders_tree, &filter)
    }

    /// Creates a folder. The audience is validated and must cover the
    /// creator; a parent folder, when given, must itself be visible to the
    /// creator.
    pub fn create_folder(&self, creator: &User, new_folder: NewFolder) -> TeamFoldResult<Folder> {
        let name = normalize_display_text(&new_folder.name);
        if name.is_empty() {
            return Err(TeamFoldError::Validation(
                "folder name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_FOLDER_NAME_CREATE {
            return Err(TeamFoldError::Validation(format!(
                "folder name must be at most {} characters",
                MAX_FOLDER_NAME_CREATE
            )));
        }

        let audience = self.resolver.normalize(new_folder.audience)?;
        self.resolver.ensure_includes(&audience, &creator.id)?;

        if let Some(parent_id) = &new_folder.parent {
            let parent = self.load_folder(parent_id)?;
            if !self.guard.can_view(creator, &parent)? {
                return Err(TeamFoldError::PermissionDenied(format!(
                    "user {} cannot see folder {}",
                    creator.id, parent_id
                )));
            }
        }

        let folder = Folder {
            id: FolderId::random(),
            name,
            audience,
            creator: creator.id.clone(),
            parent: new_folder.parent,
            default_folder: false,
        };
        self.db
            .store_in_tree(&self.db.folders_tree, folder.id.as_str(), &folder)?;
        info!("created folder {} ({})", folder.id, folder.name);
        Ok(folder)
    }

    /// Installs a protected default folder; runs at team setup, elevated
    /// only.
    pub fn install_default_folder(
        &self,
        user: &User,
        name: &str,
        audience: RawAudience,
    ) -> TeamFoldResult<Folder> {
        if !self.guard.is_elevated(user) {
            return Err(TeamFoldError::PermissionDenied(
                "only leaders and admins can install default folders".to_string(),
            ));
        }
        let audience = self.resolver.normalize(audience)?;
        let folder = Folder {
            id: FolderId::random(),
            name: normalize_display_text(name),
            audience,
            creator: user.id.clone(),
            parent: None,
            default_folder: true,
        };
        self.db
            .store_in_tree(&self.db.folders_tree, folder.id.as_str(), &folder)?;
        info!("installed default folder {} ({})", folder.id, folder.name);
        Ok(folder)
    }

    /// Renames a folder. The folder must be visible to the caller (a folder
    /// outside their audience reads as nonexistent), default folders are
    /// immutable, and modification requires creator or elevated role.
    pub fn rename_folder(
        &self,
        user: &User,
        folder_id: &FolderId,
        new_name: &str,
    ) -> TeamFoldResult<Folder> {
        let name = normalize_display_text(new_name);
        if name.is_empty() || name.chars().count() > MAX_FOLDER_NAME_RENAME {
            return Err(TeamFoldError::Validation(format!(
                "folder name must be 1 to {} characters",
                MAX_FOLDER_NAME_RENAME
            )));
        }

        let filter = audience_filter(&self.directory, &user.id)?.and(Predicate::field(
            "id",
            Compare::Eq,
            json!(folder_id.as_str()),
        ));
        let mut folder: Folder = self
            .db
            .find_one_matching(&self.db.folders_tree, &filter)?
            .ok_or_else(|| TeamFoldError::NotFound(format!("folder {}", folder_id)))?;

        if folder.default_folder {
            return Err(TeamFoldError::PermissionDenied(
                "default folders cannot be renamed".to_string(),
            ));
        }
        if !self.guard.can_modify(user, &folder)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} may not rename folder {}",
                user.id, folder_id
            )));
        }

        folder.name = name;
        self.db
            .store_in_tree(&self.db.folders_tree, folder.id.as_str(), &folder)?;
        Ok(folder)
    }

    /// Deletes a folder and the file records inside it. Default folders are
    /// protected.
    pub fn delete_folder(&self, user: &User, folder_id: &FolderId) -> TeamFoldResult<()> {
        let folder = self.load_folder(folder_id)?;
        if folder.default_folder {
            return Err(TeamFoldError::PermissionDenied(
                "default folders cannot be deleted".to_string(),
            ));
        }
        if !self.guard.can_modify(user, &folder)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} may not delete folder {}",
                user.id, folder_id
            )));
        }

        let contents = Predicate::field("folder", Compare::Eq, json!(folder_id.as_str()));
        let files: Vec<FileRecord> = self.db.find_matching(&self.db.files_tree, &contents)?;
        for file in &files {
            self.db.delete_from_tree(&self.db.files_tree, file.id.as_str())?;
        }
        self.db
            .delete_from_tree(&self.db.folders_tree, folder_id.as_str())?;
        info!(
            "deleted folder {} and {} file records",
            folder_id,
            files.len()
        );
        Ok(())
    }

    /// Files inside a folder, gated by the folder's audience.
    pub fn files_in(&self, user: &User, folder_id: &FolderId) -> TeamFoldResult<Vec<FileRecord>> {
        let folder = self.load_folder(folder_id)?;
        if !self.guard.can_view(user, &folder)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} cannot see folder {}",
                user.id, folder_id
            )));
        }
        let filter = Predicate::field("folder", Compare::Eq, json!(folder_id.as_str()));
        self.db.find_matching(&self.db.files_tree, &filter)
    }

    /// Resolves a file for download, checking the owning folder's audience.
    pub fn file_for_download(&self, user: &User, file_id: &FileId) -> TeamFoldResult<FileRecord> {
        let file = self.load_file(file_id)?;
        let folder = self.load_folder(&file.folder)?;
        if !self.guard.can_view(user, &folder)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} cannot access file {}",
                user.id, file_id
            )));
        }
        Ok(file)
    }

    /// Registers an uploaded file. Upload requires visibility of the target
    /// folder; the mime type is derived from the original file extension.
    pub fn add_file(&self, user: &User, new_file: NewFile) -> TeamFoldResult<FileRecord> {
        let folder = self.load_folder(&new_file.folder)?;
        if !self.guard.can_view(user, &folder)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} cannot upload to folder {}",
                user.id, new_file.folder
            )));
        }

        let extension = new_file
            .original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mimetype = mime_for_extension(&extension)
            .unwrap_or("application/octet-stream")
            .to_string();

        let file = FileRecord {
            id: FileId::random(),
            name: normalize_display_text(&new_file.name),
            original_name: new_file.original_name,
            folder: new_file.folder,
            size: new_file.size,
            mimetype,
            creator: user.id.clone(),
        };
        self.db
            .store_in_tree(&self.db.files_tree, file.id.as_str(), &file)?;
        info!("added file {} ({})", file.id, file.name);
        Ok(file)
    }

    /// Deletes a file record. Creator or elevated only.
    pub fn delete_file(&self, user: &User, file_id: &FileId) -> TeamFoldResult<()> {
        let file = self.load_file(file_id)?;
        if !self.guard.can_modify(user, &file)? {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} may not delete file {}",
                user.id, file_id
            )));
        }
        self.db.delete_from_tree(&self.db.files_tree, file_id.as_str())?;
        info!("deleted file {}", file_id);
        Ok(())
    }

    fn load_folder(&self, folder_id: &FolderId) -> TeamFoldResult<Folder> {
        self.db
            .get_from_tree(&self.db.folders_tree, folder_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("folder {}", folder_id)))
    }

    fn load_file(&self, file_id: &FileId) -> TeamFoldResult<FileRecord> {
        self.db
            .get_from_tree(&self.db.files_tree, file_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("file {}", file_id)))
    }
}

/// Collapses runs of whitespace and trims, so displayed names stay tidy.
fn normalize_display_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}
