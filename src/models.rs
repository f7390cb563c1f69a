//! Domain Models
//! Mission: Define the user and task records plus runtime configuration

use anyhow::Context;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// User account. Created on signup, never updated, never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
}

/// Task categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Work,
    Personal,
    Urgent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Urgent => "Urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Work" => Some(Category::Work),
            "Personal" => Some(Category::Personal),
            "Urgent" => Some(Category::Urgent),
            _ => None,
        }
    }
}

/// Task progress states. "In Progress" is the wire string for the middle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Status::Pending),
            "In Progress" => Some(Status::InProgress),
            "Completed" => Some(Status::Completed),
            _ => None,
        }
    }
}

/// Task priorities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Priority::Low),
            "Medium" => Some(Priority::Medium),
            "High" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A task owned by exactly one user.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub user_id: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Validated fields for creating a task. Owner and id are stamped at creation.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Validated fields for editing a task. Location is set once at creation.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub deadline: NaiveDate,
    pub priority: Priority,
}

/// Fresh record identifier: random positive i64, assigned at creation and
/// immutable thereafter. Collision-resistant, unlike millisecond timestamps.
pub fn fresh_id() -> i64 {
    rand::thread_rng().gen_range(1..i64::MAX)
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub port: u16,
    pub production: bool,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        // The store location and session secret are mandatory; the process
        // refuses to start without them.
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let session_secret =
            std::env::var("SESSION_SECRET").context("SESSION_SECRET is not set")?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse()
            .unwrap_or(8081);

        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            session_secret,
            port,
            production,
            cache_ttl_secs,
        })
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }
}
