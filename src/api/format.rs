use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::{Priority, Project, Task, User};

/// Wire form of a task
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub project: i64,
    pub title: String,
    pub priority: Priority,
    pub is_done: bool,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            project: task.project_id,
            title: task.title.clone(),
            priority: task.priority,
            is_done: task.is_done,
        }
    }
}

/// Wire form of a project. Tasks are always embedded and `is_completed` is
/// always derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub tasks: Vec<TaskView>,
}

impl ProjectView {
    /// `tasks` must be exactly the project's children
    pub fn new(project: &Project, owner: &str, tasks: &[Task]) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            description: project.description.clone(),
            owner: owner.to_string(),
            created_at: project.created_at,
            is_completed: is_completed(tasks),
            tasks: tasks.iter().map(TaskView::from).collect(),
        }
    }
}

/// Public account fields returned by registration
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// A project is complete when it has at least one task and every task is done
pub fn is_completed(tasks: &[Task]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|t| t.is_done)
}

/// Render several projects of one owner, distributing `tasks` to their parents
pub fn project_views(projects: &[Project], owner: &str, tasks: Vec<Task>) -> Vec<ProjectView> {
    let mut by_project: BTreeMap<i64, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        by_project.entry(task.project_id).or_default().push(task);
    }

    projects
        .iter()
        .map(|project| {
            let children = by_project.get(&project.id).map(Vec::as_slice).unwrap_or(&[]);
            ProjectView::new(project, owner, children)
        })
        .collect()
}
