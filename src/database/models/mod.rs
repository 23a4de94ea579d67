pub mod project;
pub mod task;
pub mod user;

pub use project::{NewProject, Project, ProjectChanges};
pub use task::{NewTask, Priority, PriorityError, Task, TaskChanges};
pub use user::{NewUser, User};
