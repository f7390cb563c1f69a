//! Read-Through Cache Facade
//! Mission: Serve repeated reads from memory, never serve stale data past a write
//!
//! Reads are keyed by ("users", username|ALL) or ("tasks", user_id|ALL); the
//! scoped and unscoped keys are cached independently. Every successful write
//! invalidates the unscoped key plus the scoped key for the affected record.
//! Store-layer read failures degrade to an empty result rather than failing
//! the request, so callers must not treat "no records" as authoritative for
//! existence checks; the store's own constraints are the backstop.

use crate::cache::TtlCache;
use crate::models::{Task, TaskUpdate, User};
use crate::store::db::{Db, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Cache keys: one namespace per collection, scoped or unscoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Users(Option<String>),
    Tasks(Option<i64>),
}

#[derive(Clone)]
enum CacheEntry {
    Users(Vec<User>),
    Tasks(Vec<Task>),
}

/// The store adapter behind the read-through cache. All business reads and
/// writes go through this facade.
#[derive(Clone)]
pub struct CachedStore {
    db: Db,
    cache: Arc<TtlCache<CacheKey, CacheEntry>>,
    store_reads: Arc<AtomicU64>,
}

impl CachedStore {
    pub fn new(db: Db, ttl: Duration) -> Self {
        Self {
            db,
            cache: Arc::new(TtlCache::new(ttl)),
            store_reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of reads that reached the backing store (cache misses).
    pub fn store_reads(&self) -> u64 {
        self.store_reads.load(Ordering::Relaxed)
    }

    pub async fn find_users(&self, username: Option<&str>) -> Vec<User> {
        let key = CacheKey::Users(username.map(str::to_owned));
        if let Some(CacheEntry::Users(users)) = self.cache.get(&key) {
            return users;
        }

        self.store_reads.fetch_add(1, Ordering::Relaxed);
        match self.db.find_users(username).await {
            Ok(users) => {
                self.cache.put(key, CacheEntry::Users(users.clone()));
                users
            }
            Err(err) => {
                warn!(error = %err, "users read failed, degrading to empty result");
                Vec::new()
            }
        }
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.db.insert_user(user).await?;
        self.cache.invalidate(&CacheKey::Users(None));
        self.cache
            .invalidate(&CacheKey::Users(Some(user.username.clone())));
        Ok(())
    }

    pub async fn find_tasks(&self, owner: Option<i64>) -> Vec<Task> {
        let key = CacheKey::Tasks(owner);
        if let Some(CacheEntry::Tasks(tasks)) = self.cache.get(&key) {
            return tasks;
        }

        self.store_reads.fetch_add(1, Ordering::Relaxed);
        match self.db.find_tasks(owner).await {
            Ok(tasks) => {
                self.cache.put(key, CacheEntry::Tasks(tasks.clone()));
                tasks
            }
            Err(err) => {
                warn!(error = %err, "tasks read failed, degrading to empty result");
                Vec::new()
            }
        }
    }

    pub async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.db.insert_task(task).await?;
        self.invalidate_tasks(task.user_id);
        Ok(())
    }

    pub async fn update_task(
        &self,
        id: i64,
        owner: i64,
        update: &TaskUpdate,
    ) -> Result<(), StoreError> {
        self.db.update_task(id, owner, update).await?;
        self.invalidate_tasks(owner);
        Ok(())
    }

    pub async fn delete_task(&self, id: i64, owner: i64) -> Result<(), StoreError> {
        self.db.delete_task(id, owner).await?;
        self.invalidate_tasks(owner);
        Ok(())
    }

    fn invalidate_tasks(&self, owner: i64) {
        self.cache.invalidate(&CacheKey::Tasks(None));
        self.cache.invalidate(&CacheKey::Tasks(Some(owner)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CACHE_TTL;
    use crate::models::{fresh_id, Category, Priority, Status};
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn open_test_store() -> (CachedStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Db::open(temp_file.path().to_str().unwrap()).unwrap();
        (CachedStore::new(db, CACHE_TTL), temp_file)
    }

    fn sample_task(owner: i64, title: &str) -> Task {
        Task {
            id: fresh_id(),
            title: title.to_string(),
            description: "desc".to_string(),
            category: Category::Personal,
            status: Status::Pending,
            deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            priority: Priority::Low,
            user_id: owner,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let (store, _temp) = open_test_store();
        store.insert_task(&sample_task(1, "a")).await.unwrap();

        let before = store.store_reads();
        let first = store.find_tasks(Some(1)).await;
        let second = store.find_tasks(Some(1)).await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        // One miss, then a hit: exactly one store round-trip.
        assert_eq!(store.store_reads(), before + 1);
    }

    #[tokio::test]
    async fn test_scoped_and_unscoped_keys_are_independent() {
        let (store, _temp) = open_test_store();
        store.insert_task(&sample_task(1, "a")).await.unwrap();
        store.insert_task(&sample_task(2, "b")).await.unwrap();

        let before = store.store_reads();
        assert_eq!(store.find_tasks(None).await.len(), 2);
        assert_eq!(store.find_tasks(Some(1)).await.len(), 1);
        // Separate keys: both reads hit the store.
        assert_eq!(store.store_reads(), before + 2);
    }

    #[tokio::test]
    async fn test_task_writes_invalidate_scoped_and_unscoped_keys() {
        let (store, _temp) = open_test_store();
        let task = sample_task(1, "first");
        store.insert_task(&task).await.unwrap();

        // Populate both keys.
        assert_eq!(store.find_tasks(None).await.len(), 1);
        assert_eq!(store.find_tasks(Some(1)).await.len(), 1);

        let second = sample_task(1, "second");
        store.insert_task(&second).await.unwrap();

        // The next reads reflect the write immediately, no stale hits.
        assert_eq!(store.find_tasks(Some(1)).await.len(), 2);
        assert_eq!(store.find_tasks(None).await.len(), 2);

        store.delete_task(second.id, 1).await.unwrap();
        assert_eq!(store.find_tasks(Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_visible_after_cached_read() {
        let (store, _temp) = open_test_store();
        let task = sample_task(1, "before");
        store.insert_task(&task).await.unwrap();
        assert_eq!(store.find_tasks(Some(1)).await[0].title, "before");

        let update = TaskUpdate {
            title: "after".to_string(),
            description: "desc".to_string(),
            category: Category::Personal,
            status: Status::InProgress,
            deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            priority: Priority::Low,
        };
        store.update_task(task.id, 1, &update).await.unwrap();

        let got = store.find_tasks(Some(1)).await;
        assert_eq!(got[0].title, "after");
        assert_eq!(got[0].status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_empty_result() {
        let (store, temp) = open_test_store();
        store.insert_task(&sample_task(1, "a")).await.unwrap();

        // Break the backing store out from under the facade.
        let raw = rusqlite::Connection::open(temp.path()).unwrap();
        raw.execute("DROP TABLE tasks", []).unwrap();
        raw.execute("DROP TABLE users", []).unwrap();

        // Reads come back empty instead of erroring.
        assert!(store.find_tasks(Some(1)).await.is_empty());
        assert!(store.find_users(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_user_insert_invalidates_user_keys() {
        let (store, _temp) = open_test_store();
        let user = User {
            id: fresh_id(),
            username: "alice1".to_string(),
            password_hash: "hash".to_string(),
        };

        // Prime the scoped key with an empty result (the signup pre-check).
        assert!(store.find_users(Some("alice1")).await.is_empty());

        store.insert_user(&user).await.unwrap();
        let found = store.find_users(Some("alice1")).await;
        assert_eq!(found.len(), 1);
        assert_eq!(store.find_users(None).await.len(), 1);
    }
}
