//! Document Store Adapter
//! Mission: Typed access to the users, tasks and sessions collections
//!
//! Backed by SQLite behind a serialized connection; correctness relies on
//! atomic single-row operations (insert uniqueness, filtered update/delete).
//! Every task mutation filters by (id, user_id) jointly so cross-user access
//! is impossible even with a guessed id.

use crate::models::{Category, Priority, Status, Task, TaskUpdate, User};
use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Store-level failures surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique index on users.username rejected an insert. This is the
    /// authoritative duplicate signal; application-level pre-checks are only
    /// a fast path for a friendlier message.
    #[error("username already taken")]
    DuplicateUsername,
    #[error("store operation failed: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

/// Server-side session record referenced by the cookie's opaque id.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: i64,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open the store and run idempotent schema and index setup.
    pub fn open(db_path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(db_path).context("open task store")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.busy_timeout(BUSY_TIMEOUT).ok();

        Self::ensure_collections(&conn)?;
        Self::ensure_indexes(&conn)?;

        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        info!("💾 Store ready at {} ({} users)", db_path, users);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn ensure_collections(conn: &Connection) -> anyhow::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                status TEXT NOT NULL,
                deadline TEXT NOT NULL,
                priority TEXT NOT NULL,
                latitude REAL,
                longitude REAL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Index setup tolerates re-running without side effects. A pre-existing
    /// non-unique users_username index is dropped and recreated as unique.
    fn ensure_indexes(conn: &Connection) -> anyhow::Result<()> {
        match Self::index_unique(conn, "users", "users_username")? {
            Some(true) => {}
            Some(false) => {
                info!("Upgrading users_username index to unique");
                conn.execute("DROP INDEX users_username", [])?;
                conn.execute(
                    "CREATE UNIQUE INDEX users_username ON users(username)",
                    [],
                )?;
            }
            None => {
                conn.execute(
                    "CREATE UNIQUE INDEX users_username ON users(username)",
                    [],
                )?;
            }
        }

        // Compound index for owner-scoped task lookups.
        conn.execute(
            "CREATE INDEX IF NOT EXISTS tasks_user_id_id ON tasks(user_id, id)",
            [],
        )?;
        Ok(())
    }

    /// Whether the named index exists and, if so, whether it is unique.
    fn index_unique(
        conn: &Connection,
        table: &str,
        index: &str,
    ) -> anyhow::Result<Option<bool>> {
        let mut stmt = conn.prepare(&format!("PRAGMA index_list('{table}')"))?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(1)?;
            let unique: i64 = row.get(2)?;
            Ok((name, unique != 0))
        })?;
        for row in rows {
            let (name, unique) = row?;
            if name == index {
                return Ok(Some(unique));
            }
        }
        Ok(None)
    }

    pub async fn find_users(&self, username: Option<&str>) -> Result<Vec<User>, StoreError> {
        let conn = self.conn.lock().await;
        let mut out = Vec::new();

        if let Some(username) = username {
            let mut stmt = conn.prepare_cached(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
            )?;
            let rows = stmt.query_map(params![username], Self::row_to_user)?;
            for row in rows {
                out.push(row?);
            }
            return Ok(out);
        }

        let mut stmt =
            conn.prepare_cached("SELECT id, username, password_hash FROM users ORDER BY id ASC")?;
        let rows = stmt.query_map([], Self::row_to_user)?;
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![user.id, user.username, user.password_hash],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::DuplicateUsername
            }
            other => StoreError::Unavailable(other),
        })?;
        Ok(())
    }

    pub async fn find_tasks(&self, owner: Option<i64>) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().await;
        let mut out = Vec::new();

        if let Some(owner) = owner {
            let mut stmt = conn.prepare_cached(
                "SELECT id, user_id, title, description, category, status, deadline, priority, latitude, longitude \
                 FROM tasks WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![owner], Self::row_to_task)?;
            for row in rows {
                out.push(row?);
            }
            return Ok(out);
        }

        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, title, description, category, status, deadline, priority, latitude, longitude \
             FROM tasks ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_task)?;
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks \
             (id, user_id, title, description, category, status, deadline, priority, latitude, longitude) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.category.as_str(),
                task.status.as_str(),
                task.deadline.to_string(),
                task.priority.as_str(),
                task.latitude,
                task.longitude,
            ],
        )?;
        Ok(())
    }

    /// Updates at most one row matching both id and owner. Zero rows changed
    /// is not an error; foreign ids must no-op silently.
    pub async fn update_task(
        &self,
        id: i64,
        owner: i64,
        update: &TaskUpdate,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, category = ?3, status = ?4, \
             deadline = ?5, priority = ?6 WHERE id = ?7 AND user_id = ?8",
            params![
                update.title,
                update.description,
                update.category.as_str(),
                update.status.as_str(),
                update.deadline.to_string(),
                update.priority.as_str(),
                id,
                owner,
            ],
        )?;
        Ok(())
    }

    /// Deletes at most one row matching both id and owner.
    pub async fn delete_task(&self, id: i64, owner: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        Ok(())
    }

    pub async fn insert_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO sessions (id, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![record.id, record.user_id, record.expires_at],
        )?;
        Ok(())
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare_cached("SELECT id, user_id, expires_at FROM sessions WHERE id = ?1")?;
        let record = stmt.query_row(params![id], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                expires_at: row.get(2)?,
            })
        });
        match record {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
        })
    }

    fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let category: String = row.get(4)?;
        let status: String = row.get(5)?;
        let deadline: String = row.get(6)?;
        let priority: String = row.get(7)?;
        Ok(Task {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: Category::from_str(&category).unwrap_or(Category::Personal),
            status: Status::from_str(&status).unwrap_or(Status::Pending),
            deadline: deadline
                .parse::<NaiveDate>()
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            priority: Priority::from_str(&priority).unwrap_or(Priority::Low),
            latitude: row.get(8)?,
            longitude: row.get(9)?,
        })
    }
}
