//! Form Validation
//! Mission: Reject bad input at the edge, before business logic runs
//!
//! Field rules and messages mirror the signup, login and task forms. Enum
//! fields parse directly into their domain types; everything else collects
//! per-field errors surfaced inline on the form.

use crate::models::{Category, Priority, Status, TaskDraft};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A field-level validation error rendered inline on the form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub deadline: String,
    pub priority: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

pub fn validate_signup(form: &SignupForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let username = form.username.trim();

    let username_chars = username.chars().count();
    if username_chars < 3 || username_chars > 20 {
        errors.push(FieldError::new(
            "username",
            "Username must be 3-20 characters long",
        ));
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(FieldError::new(
            "username",
            "Username must contain only letters and numbers",
        ));
    }

    let password = &form.password;
    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one special character",
        ));
    }

    if form.confirm_password != form.password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    errors
}

pub fn validate_login(form: &LoginForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if form.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    errors
}

/// Validate a task form against today's calendar date (local midnight
/// granularity) and parse it into a typed draft.
pub fn validate_task(form: &TaskForm) -> Result<TaskDraft, Vec<FieldError>> {
    validate_task_at(form, Local::now().date_naive())
}

fn validate_task_at(form: &TaskForm, today: NaiveDate) -> Result<TaskDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = form.title.trim().to_string();
    if title.is_empty() || title.chars().count() > 100 {
        errors.push(FieldError::new(
            "title",
            "Title must be 1-100 characters long",
        ));
    }

    let description = form.description.trim().to_string();
    if description.is_empty() || description.chars().count() > 500 {
        errors.push(FieldError::new(
            "description",
            "Description must be 1-500 characters long",
        ));
    }

    let category = Category::from_str(&form.category);
    if category.is_none() {
        errors.push(FieldError::new("category", "Invalid category"));
    }

    let status = Status::from_str(&form.status);
    if status.is_none() {
        errors.push(FieldError::new("status", "Invalid status"));
    }

    let deadline = match form.deadline.parse::<NaiveDate>() {
        Ok(date) if date < today => {
            errors.push(FieldError::new("deadline", "Deadline cannot be in the past"));
            None
        }
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new("deadline", "Invalid date format"));
            None
        }
    };

    let priority = Priority::from_str(&form.priority);
    if priority.is_none() {
        errors.push(FieldError::new("priority", "Invalid priority"));
    }

    let latitude = match parse_optional_float(&form.latitude) {
        Ok(value) => {
            if let Some(v) = value {
                if !(-90.0..=90.0).contains(&v) {
                    errors.push(FieldError::new(
                        "latitude",
                        "Latitude must be between -90 and 90",
                    ));
                }
            }
            value
        }
        Err(()) => {
            errors.push(FieldError::new(
                "latitude",
                "Latitude must be between -90 and 90",
            ));
            None
        }
    };

    let longitude = match parse_optional_float(&form.longitude) {
        Ok(value) => {
            if let Some(v) = value {
                if !(-180.0..=180.0).contains(&v) {
                    errors.push(FieldError::new(
                        "longitude",
                        "Longitude must be between -180 and 180",
                    ));
                }
            }
            value
        }
        Err(()) => {
            errors.push(FieldError::new(
                "longitude",
                "Longitude must be between -180 and 180",
            ));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // Unwraps are safe: errors is empty only when every field parsed.
    Ok(TaskDraft {
        title,
        description,
        category: category.unwrap(),
        status: status.unwrap(),
        deadline: deadline.unwrap(),
        priority: priority.unwrap(),
        latitude,
        longitude,
    })
}

/// Empty strings count as absent, matching optional form fields.
fn parse_optional_float(value: &Option<String>) -> Result<Option<f64>, ()> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| ()),
    }
}
