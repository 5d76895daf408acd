//! Tasks assigned to individual users.
//!
//! Tasks are scoped to an assignee and a creator rather than an audience;
//! the elevated-role gate on assignment and completion-by-others goes
//! through the same oracle as everything else.

use crate::audience::guard::AuthorizationGuard;
use crate::audience::predicate::{Compare, Predicate};
use crate::db_operations::DbOperations;
use crate::directory::GroupDirectory;
use crate::error::{TeamFoldError, TeamFoldResult};
use crate::models::{Task, TaskId, User, UserId};
use chrono::{DateTime, Utc};
use log::info;
use serde_json::json;
use std::sync::Arc;

/// Parameters for assigning a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub assignee: UserId,
    pub due_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TaskManager {
    db: DbOperations,
    directory: Arc<GroupDirectory>,
    guard: AuthorizationGuard,
}

impl TaskManager {
    pub fn new(db: DbOperations, directory: Arc<GroupDirectory>, guard: AuthorizationGuard) -> Self {
        Self {
            db,
            directory,
            guard,
        }
    }

    /// Assigns a task. Requires an elevated creator and an assignee the
    /// directory can resolve.
    pub fn assign_task(&self, creator: &User, new_task: NewTask) -> TeamFoldResult<Task> {
        if !self.guard.is_elevated(creator) {
            return Err(TeamFoldError::PermissionDenied(
                "only leaders and admins can assign tasks".to_string(),
            ));
        }
        // Resolving the assignee also surfaces UnknownUser for a bad id.
        let assignee = self.directory.get_user(&new_task.assignee)?;

        let task = Task {
            id: TaskId::random(),
            name: new_task.name.trim().to_string(),
            description: new_task
                .description
                .filter(|text| !text.trim().is_empty()),
            assignee: assignee.id,
            due_date: new_task.due_date,
            creator: creator.id.clone(),
            completed: false,
        };
        self.db
            .store_in_tree(&self.db.tasks_tree, task.id.as_str(), &task)?;
        info!("assigned task {} to {}", task.id, task.assignee);
        Ok(task)
    }

    /// Open tasks for one assignee.
    pub fn pending_tasks(&self, assignee: &UserId) -> TeamFoldResult<Vec<Task>> {
        self.tasks_with_status(assignee, false)
    }

    /// Finished tasks for one assignee.
    pub fn completed_tasks(&self, assignee: &UserId) -> TeamFoldResult<Vec<Task>> {
        self.tasks_with_status(assignee, true)
    }

    /// Marks a task completed. Allowed for the assignee themselves or an
    /// elevated user.
    pub fn complete_task(&self, actor: &User, task_id: &TaskId) -> TeamFoldResult<Task> {
        let mut task: Task = self
            .db
            .get_from_tree(&self.db.tasks_tree, task_id.as_str())?
            .ok_or_else(|| TeamFoldError::NotFound(format!("task {}", task_id)))?;

        if task.assignee != actor.id && !self.guard.is_elevated(actor) {
            return Err(TeamFoldError::PermissionDenied(format!(
                "user {} may not complete task {}",
                actor.id, task_id
            )));
        }

        task.completed = true;
        self.db
            .store_in_tree(&self.db.tasks_tree, task.id.as_str(), &task)?;
        info!("task {} completed by {}", task_id, actor.id);
        Ok(task)
    }

    fn tasks_with_status(&self, assignee: &UserId, completed: bool) -> TeamFoldResult<Vec<Task>> {
        let filter = Predicate::field("assignee", Compare::Eq, json!(assignee.as_str())).and(
            Predicate::field("completed", Compare::Eq, json!(completed)),
        );
        let mut tasks: Vec<Task> = self.db.find_matching(&self.db.tasks_tree, &filter)?;
        tasks.sort_by_key(|t| t.due_date);
        Ok(tasks)
    }
}
