//! Inbound request bodies and their validation.
//!
//! Every field is optional at the serde level so that a missing field turns
//! into a `field_errors` entry naming it instead of a generic decode failure.
//! Fields the server owns (`id`, `owner`, `created_at`, ...) are not declared
//! and are therefore ignored.

use serde::Deserialize;

use crate::auth::MAX_PASSWORD_BYTES;
use crate::database::models::{NewProject, NewTask, Priority, ProjectChanges, TaskChanges};
use crate::error::{ApiError, FieldErrors};

pub const PROJECT_TITLE_MAX: usize = 200;
pub const TASK_TITLE_MAX: usize = 255;
pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProjectPayload {
    pub fn into_new(self) -> Result<NewProject, ApiError> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title, PROJECT_TITLE_MAX);
        let description = self.description.map(|d| d.trim().to_string()).unwrap_or_default();
        finish(errors)?;

        Ok(NewProject {
            title: title.unwrap_or_default(),
            description,
        })
    }

    /// `partial` is PATCH semantics; PUT must carry every required field
    pub fn into_changes(self, partial: bool) -> Result<ProjectChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let title = if partial {
            optional_text(&mut errors, "title", self.title, PROJECT_TITLE_MAX)
        } else {
            required_text(&mut errors, "title", self.title, PROJECT_TITLE_MAX)
        };
        finish(errors)?;

        Ok(ProjectChanges {
            title,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    pub project: Option<i64>,
    pub title: Option<String>,
    pub priority: Option<String>,
    pub is_done: Option<bool>,
}

impl TaskPayload {
    pub fn into_new(self) -> Result<NewTask, ApiError> {
        let mut errors = FieldErrors::new();
        if self.project.is_none() {
            errors.insert("project".to_string(), REQUIRED.to_string());
        }
        let title = required_text(&mut errors, "title", self.title, TASK_TITLE_MAX);
        let priority = parse_priority(&mut errors, self.priority);
        finish(errors)?;

        Ok(NewTask {
            project_id: self.project.unwrap_or_default(),
            title: title.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            is_done: self.is_done.unwrap_or(false),
        })
    }

    /// The parent project cannot be changed, so `project` is ignored here
    pub fn into_changes(self, partial: bool) -> Result<TaskChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let title = if partial {
            optional_text(&mut errors, "title", self.title, TASK_TITLE_MAX)
        } else {
            required_text(&mut errors, "title", self.title, TASK_TITLE_MAX)
        };
        let priority = parse_priority(&mut errors, self.priority);
        finish(errors)?;

        Ok(TaskChanges {
            title,
            priority,
            is_done: self.is_done,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input that passed validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterPayload {
    pub fn validate(self) -> Result<Registration, ApiError> {
        let mut errors = FieldErrors::new();

        let username = required_text(&mut errors, "username", self.username, USERNAME_MAX);
        if let Some(name) = &username {
            if let Err(msg) = validate_username_format(name) {
                errors.insert("username".to_string(), msg);
            }
        }

        let email = self.email.map(|e| e.trim().to_string()).unwrap_or_default();
        if !email.is_empty() {
            if let Err(msg) = validate_email_format(&email) {
                errors.insert("email".to_string(), msg);
            }
        }

        let password = required_secret(&mut errors, "password", self.password);
        if password.as_ref().is_some_and(|p| p.len() > MAX_PASSWORD_BYTES) {
            errors.insert(
                "password".to_string(),
                format!("Ensure this field has no more than {} bytes.", MAX_PASSWORD_BYTES),
            );
        }
        finish(errors)?;

        Ok(Registration {
            username: username.unwrap_or_default(),
            email,
            password: password.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenObtainPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl TokenObtainPayload {
    /// Returns `(username, password)`. The username is trimmed the same way
    /// registration trims it; the password is taken verbatim.
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut errors = FieldErrors::new();
        // No length cap: an over-long name simply matches no account
        let username = required_text(&mut errors, "username", self.username, usize::MAX);
        let password = required_secret(&mut errors, "password", self.password);
        finish(errors)?;
        Ok((username.unwrap_or_default(), password.unwrap_or_default()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRefreshPayload {
    pub refresh: Option<String>,
}

impl TokenRefreshPayload {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        let refresh = required_secret(&mut errors, "refresh", self.refresh);
        finish(errors)?;
        Ok(refresh.unwrap_or_default())
    }
}

/// Usernames: letters, digits and `@ . + - _`, at most 150 characters
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.chars().count() > USERNAME_MAX {
        return Err(format!("Ensure this field has no more than {} characters.", USERNAME_MAX));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(())
}

/// Basic shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    const INVALID: &str = "Enter a valid email address.";

    if email.chars().count() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return Err(INVALID.to_string());
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| INVALID.to_string())?;
    if local.is_empty() || domain.contains('@') {
        return Err(INVALID.to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(INVALID.to_string());
    }

    Ok(())
}

fn finish(errors: FieldErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid input", Some(errors)))
    }
}

/// Trimmed, non-blank, length-checked text that must be present
fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize) -> Option<String> {
    match value {
        None => {
            errors.insert(field.to_string(), REQUIRED.to_string());
            None
        }
        Some(v) => optional_text(errors, field, Some(v), max),
    }
}

/// Like [`required_text`] but absence is fine
fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() {
        errors.insert(field.to_string(), BLANK.to_string());
        return None;
    }
    if value.chars().count() > max {
        errors.insert(
            field.to_string(),
            format!("Ensure this field has no more than {} characters.", max),
        );
        return None;
    }
    Some(value)
}

/// Required and non-empty, but never trimmed
fn required_secret(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.insert(field.to_string(), REQUIRED.to_string());
            None
        }
        Some(v) if v.is_empty() => {
            errors.insert(field.to_string(), BLANK.to_string());
            None
        }
        Some(v) => Some(v),
    }
}

fn parse_priority(errors: &mut FieldErrors, value: Option<String>) -> Option<Priority> {
    match value?.parse::<Priority>() {
        Ok(priority) => Some(priority),
        Err(e) => {
            errors.insert("priority".to_string(), e.to_string());
            None
        }
    }
}
