use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::{NewProject, NewTask, NewUser, Project, ProjectChanges, Task, TaskChanges, User};
use super::{Store, StoreError};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_project_id: i64,
    last_task_id: i64,
}

impl Tables {
    fn owned_project(&self, owner_id: i64, id: i64) -> Option<&Project> {
        self.projects.get(&id).filter(|p| p.owner_id == owner_id)
    }

    fn task_visible(&self, owner_id: i64, task: &Task) -> bool {
        self.owned_project(owner_id, task.project_id).is_some()
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Record store held in process memory. Every operation runs under a single
/// lock acquisition, so multi-row changes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(StoreError::UsernameTaken(new_user.username));
        }

        let user = User {
            id: next_id(&mut tables.last_user_id),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn list_projects(&self, owner_id: i64) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_project(&self, owner_id: i64, id: i64) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.owned_project(owner_id, id).cloned())
    }

    async fn create_project(&self, owner_id: i64, new_project: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let project = Project {
            id: next_id(&mut tables.last_project_id),
            owner_id,
            title: new_project.title,
            description: new_project.description,
            created_at: Utc::now(),
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        owner_id: i64,
        id: i64,
        changes: ProjectChanges,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.projects.get_mut(&id) {
            Some(project) if project.owner_id == owner_id => {
                changes.apply(project);
                Ok(Some(project.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_project(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.owned_project(owner_id, id).is_none() {
            return Ok(false);
        }

        tables.tasks.retain(|_, t| t.project_id != id);
        tables.projects.remove(&id);
        Ok(true)
    }

    async fn tasks_for_projects(&self, owner_id: i64, project_ids: &[i64]) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| project_ids.contains(&t.project_id) && tables.task_visible(owner_id, t))
            .cloned()
            .collect())
    }

    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| tables.task_visible(owner_id, t))
            .cloned()
            .collect())
    }

    async fn find_task(&self, owner_id: i64, id: i64) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&id)
            .filter(|t| tables.task_visible(owner_id, t))
            .cloned())
    }

    async fn create_task(&self, owner_id: i64, new_task: NewTask) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.owned_project(owner_id, new_task.project_id).is_none() {
            return Ok(None);
        }

        let task = Task {
            id: next_id(&mut tables.last_task_id),
            project_id: new_task.project_id,
            title: new_task.title,
            priority: new_task.priority,
            is_done: new_task.is_done,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(Some(task))
    }

    async fn update_task(&self, owner_id: i64, id: i64, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let visible = match tables.tasks.get(&id) {
            Some(task) => tables.task_visible(owner_id, task),
            None => false,
        };
        if !visible {
            return Ok(None);
        }

        Ok(tables.tasks.get_mut(&id).map(|task| {
            changes.apply(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let visible = match tables.tasks.get(&id) {
            Some(task) => tables.task_visible(owner_id, task),
            None => false,
        };
        if visible {
            tables.tasks.remove(&id);
        }
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Priority;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(NewUser {
                username: name.to_string(),
                email: String::new(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap()
    }

    async fn project(store: &MemoryStore, owner: &User, title: &str) -> Project {
        store
            .create_project(
                owner.id,
                NewProject {
                    title: title.to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap()
    }

    fn new_task(project_id: i64, title: &str) -> NewTask {
        NewTask {
            project_id,
            title: title.to_string(),
            priority: Priority::default(),
            is_done: false,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        user(&store, "alice").await;
        let err = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: String::new(),
                password_hash: "y".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "alice"));
    }

    #[tokio::test]
    async fn projects_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let trip = project(&store, &alice, "Trip").await;

        assert_eq!(store.list_projects(alice.id).await.unwrap().len(), 1);
        assert!(store.list_projects(bob.id).await.unwrap().is_empty());
        assert!(store.find_project(bob.id, trip.id).await.unwrap().is_none());

        let changes = ProjectChanges {
            title: Some("Stolen".to_string()),
            description: None,
        };
        assert!(store.update_project(bob.id, trip.id, changes).await.unwrap().is_none());
        assert!(!store.delete_project(bob.id, trip.id).await.unwrap());
        assert_eq!(store.find_project(alice.id, trip.id).await.unwrap().unwrap().title, "Trip");
    }

    #[tokio::test]
    async fn tasks_require_an_owned_project() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let trip = project(&store, &alice, "Trip").await;

        assert!(store.create_task(bob.id, new_task(trip.id, "Sneak")).await.unwrap().is_none());
        assert!(store.create_task(alice.id, new_task(999, "Nowhere")).await.unwrap().is_none());

        let task = store
            .create_task(alice.id, new_task(trip.id, "Book flight"))
            .await
            .unwrap()
            .unwrap();
        assert!(store.find_task(bob.id, task.id).await.unwrap().is_none());
        assert!(store.list_tasks(bob.id).await.unwrap().is_empty());
        assert!(!store.delete_task(bob.id, task.id).await.unwrap());

        let done = TaskChanges {
            is_done: Some(true),
            ..Default::default()
        };
        assert!(store.update_task(bob.id, task.id, done.clone()).await.unwrap().is_none());
        let updated = store.update_task(alice.id, task.id, done).await.unwrap().unwrap();
        assert!(updated.is_done);
        assert_eq!(updated.project_id, trip.id);
    }

    #[tokio::test]
    async fn deleting_a_project_removes_its_tasks() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let trip = project(&store, &alice, "Trip").await;
        let chores = project(&store, &alice, "Chores").await;

        for title in ["Book flight", "Pack"] {
            store.create_task(alice.id, new_task(trip.id, title)).await.unwrap();
        }
        let kept = store
            .create_task(alice.id, new_task(chores.id, "Dishes"))
            .await
            .unwrap()
            .unwrap();

        assert!(store.delete_project(alice.id, trip.id).await.unwrap());

        let tables = store.tables.read().await;
        assert!(tables.tasks.values().all(|t| t.project_id != trip.id));
        assert!(tables.tasks.contains_key(&kept.id));
    }
}
