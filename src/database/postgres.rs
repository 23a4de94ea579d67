use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::models::{NewProject, NewTask, NewUser, Project, ProjectChanges, Task, TaskChanges, User};
use super::{Store, StoreError};

const UNIQUE_VIOLATION: &str = "23505";

const USER_COLUMNS: &str = "id, username, email, password_hash, date_joined";
const PROJECT_COLUMNS: &str = "id, owner_id, title, description, created_at";

/// Record store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                    StoreError::UsernameTaken(new_user.username.clone())
                }
                other => other.into(),
            })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE owner_id = $1 ORDER BY id", PROJECT_COLUMNS);
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn find_project(&self, owner_id: i64, id: i64) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1 AND owner_id = $2", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn create_project(&self, owner_id: i64, new_project: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (owner_id, title, description) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .bind(&new_project.title)
            .bind(&new_project.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(project)
    }

    async fn update_project(
        &self,
        owner_id: i64,
        id: i64,
        changes: ProjectChanges,
    ) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "UPDATE projects SET title = COALESCE($3, title), description = COALESCE($4, description) \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(changes.title)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn delete_project(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM projects WHERE id = $1 AND owner_id = $2 FOR UPDATE")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Deleted project {} with {} tasks", id, tasks.rows_affected());
        Ok(true)
    }

    async fn tasks_for_projects(&self, owner_id: i64, project_ids: &[i64]) -> Result<Vec<Task>, StoreError> {
        if project_ids.is_empty() {
            return Ok(vec![]);
        }

        let tasks = sqlx::query_as::<_, Task>(
            "SELECT t.id, t.project_id, t.title, t.priority, t.is_done
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.owner_id = $1 AND t.project_id = ANY($2)
             ORDER BY t.id",
        )
        .bind(owner_id)
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT t.id, t.project_id, t.title, t.priority, t.is_done
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.owner_id = $1
             ORDER BY t.id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: i64, id: i64) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT t.id, t.project_id, t.title, t.priority, t.is_done
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND p.owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create_task(&self, owner_id: i64, new_task: NewTask) -> Result<Option<Task>, StoreError> {
        // Ownership check and insert happen in one statement
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (project_id, title, priority, is_done)
             SELECT p.id, $3, $4, $5 FROM projects p WHERE p.id = $1 AND p.owner_id = $2
             RETURNING id, project_id, title, priority, is_done",
        )
        .bind(new_task.project_id)
        .bind(owner_id)
        .bind(&new_task.title)
        .bind(new_task.priority.code())
        .bind(new_task.is_done)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, owner_id: i64, id: i64, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks t
             SET title = COALESCE($3, t.title),
                 priority = COALESCE($4, t.priority),
                 is_done = COALESCE($5, t.is_done)
             FROM projects p
             WHERE t.id = $1 AND t.project_id = p.id AND p.owner_id = $2
             RETURNING t.id, t.project_id, t.title, t.priority, t.is_done",
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.title)
        .bind(changes.priority.map(|p| p.code()))
        .bind(changes.is_done)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM tasks t USING projects p
             WHERE t.id = $1 AND t.project_id = p.id AND p.owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
