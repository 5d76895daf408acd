use crate::audience::guard::{AuthorizationGuard, ElevationOracle, PositionOracle};
use crate::audience::resolver::MembershipResolver;
use crate::config::TeamFoldConfig;
use crate::db_operations::DbOperations;
use crate::directory::GroupDirectory;
use crate::drive::DriveManager;
use crate::error::TeamFoldResult;
use crate::events::EventManager;
use crate::tasks::TaskManager;
use std::sync::Arc;

/// The main coordinator wiring the store, the group directory and the
/// audience engine together.
///
/// TeamFold owns the embedded sled instance and hands out the managers the
/// request-handling layer talks to:
/// - The group directory for membership administration
/// - The membership resolver and authorization guard for direct decisions
/// - The event, drive and task managers for the domain operations
pub struct TeamFold {
    db: DbOperations,
    directory: Arc<GroupDirectory>,
    resolver: MembershipResolver,
    guard: AuthorizationGuard,
    events: EventManager,
    drive: DriveManager,
    tasks: TaskManager,
}

impl TeamFold {
    /// Opens or creates the store at the configured path with the default
    /// position-based elevation oracle.
    pub fn new(config: &TeamFoldConfig) -> TeamFoldResult<Self> {
        let db = sled::open(&config.storage_path)?;
        Self::with_oracle(db, Arc::new(PositionOracle))
    }

    /// Opens a throwaway in-memory instance, used by tests.
    pub fn temporary() -> TeamFoldResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_oracle(db, Arc::new(PositionOracle))
    }

    /// Opens a throwaway in-memory instance with a custom elevation oracle.
    pub fn temporary_with_oracle(oracle: Arc<dyn ElevationOracle>) -> TeamFoldResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_oracle(db, oracle)
    }

    /// Wires all components over an already-opened database and a custom
    /// elevation oracle.
    pub fn with_oracle(db: sled::Db, oracle: Arc<dyn ElevationOracle>) -> TeamFoldResult<Self> {
        let db = DbOperations::new(db)?;
        let directory = Arc::new(GroupDirectory::new(db.clone()));
        let resolver = MembershipResolver::new(Arc::clone(&directory));
        let guard = AuthorizationGuard::new(resolver.clone(), oracle);
        let events = EventManager::new(
            db.clone(),
            Arc::clone(&directory),
            resolver.clone(),
            guard.clone(),
        );
        let drive = DriveManager::new(
            db.clone(),
            Arc::clone(&directory),
            resolver.clone(),
            guard.clone(),
        );
        let tasks = TaskManager::new(db.clone(), Arc::clone(&directory), guard.clone());

        Ok(Self {
            db,
            directory,
            resolver,
            guard,
            events,
            drive,
            tasks,
        })
    }

    pub fn db(&self) -> &DbOperations {
        &self.db
    }

    pub fn directory(&self) -> &GroupDirectory {
        &self.directory
    }

    pub fn resolver(&self) -> &MembershipResolver {
        &self.resolver
    }

    pub fn guard(&self) -> &AuthorizationGuard {
        &self.guard
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn drive(&self) -> &DriveManager {
        &self.drive
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }
}
