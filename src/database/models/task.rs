use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::str::FromStr;

/// Task priority, stored and rendered as a one-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "L")]
    Low,
    #[default]
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    High,
}

#[derive(Debug, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct PriorityError(pub String);

impl Priority {
    pub fn code(self) -> &'static str {
        match self {
            Priority::Low => "L",
            Priority::Medium => "M",
            Priority::High => "H",
        }
    }
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Priority::Low),
            "M" => Ok(Priority::Medium),
            "H" => Ok(Priority::High),
            other => Err(PriorityError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub priority: Priority,
    pub is_done: bool,
}

impl<'r> FromRow<'r, PgRow> for Task {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let priority: String = row.try_get("priority")?;
        let priority = priority.parse::<Priority>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "priority".to_string(),
            source: Box::new(e),
        })?;

        Ok(Task {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            title: row.try_get("title")?,
            priority,
            is_done: row.try_get("is_done")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i64,
    pub title: String,
    pub priority: Priority,
    pub is_done: bool,
}

/// Fields an update may touch. The parent project is not among them.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub is_done: Option<bool>,
}

impl TaskChanges {
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
    }
}
