pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{NewProject, NewTask, NewUser, Project, ProjectChanges, Task, TaskChanges, User};

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

/// Persistence seam for users, projects and tasks.
///
/// Every project and task operation takes the caller's user id and only ever
/// sees rows owned by that user (directly for projects, through the parent
/// project for tasks). A row outside that set behaves exactly like a missing
/// row: `None` from lookups and updates, `false` from deletes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Fails with [`StoreError::UsernameTaken`] on a duplicate username.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>, StoreError>;
    async fn find_project(&self, owner_id: i64, id: i64) -> Result<Option<Project>, StoreError>;
    async fn create_project(&self, owner_id: i64, new_project: NewProject) -> Result<Project, StoreError>;
    async fn update_project(
        &self,
        owner_id: i64,
        id: i64,
        changes: ProjectChanges,
    ) -> Result<Option<Project>, StoreError>;
    /// Removes the project and all of its tasks as one atomic unit.
    async fn delete_project(&self, owner_id: i64, id: i64) -> Result<bool, StoreError>;

    /// Tasks of the given projects, ordered by id. Projects not owned by
    /// `owner_id` contribute nothing.
    async fn tasks_for_projects(&self, owner_id: i64, project_ids: &[i64]) -> Result<Vec<Task>, StoreError>;
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError>;
    async fn find_task(&self, owner_id: i64, id: i64) -> Result<Option<Task>, StoreError>;
    /// `None` when `new_task.project_id` is missing or owned by someone else.
    async fn create_task(&self, owner_id: i64, new_task: NewTask) -> Result<Option<Task>, StoreError>;
    async fn update_task(&self, owner_id: i64, id: i64, changes: TaskChanges) -> Result<Option<Task>, StoreError>;
    async fn delete_task(&self, owner_id: i64, id: i64) -> Result<bool, StoreError>;
}

/// Build the store the configuration asks for: PostgreSQL when a database
/// URL is configured (migrations applied on connect), memory otherwise.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database.url {
        Some(url) => {
            let pool = DatabaseManager::connect(url, &config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
