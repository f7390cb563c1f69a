//! Task Lifecycle Manager
//! Mission: Owner-scoped create/get/update/delete for task records
//!
//! Every operation is scoped by the authenticated user's id. Updates and
//! deletes of ids that do not belong to the requester no-op silently so
//! task existence never leaks across users.

use crate::models::{fresh_id, Task, TaskDraft, TaskUpdate};
use crate::store::cached::CachedStore;
use crate::store::db::StoreError;

#[derive(Clone)]
pub struct TaskManager {
    store: CachedStore,
}

impl TaskManager {
    pub fn new(store: CachedStore) -> Self {
        Self { store }
    }

    /// Create a task for the owner, assigning a fresh immutable id.
    pub async fn create(&self, owner: i64, draft: TaskDraft) -> Result<Task, StoreError> {
        let task = Task {
            id: fresh_id(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            status: draft.status,
            deadline: draft.deadline,
            priority: draft.priority,
            user_id: owner,
            latitude: draft.latitude,
            longitude: draft.longitude,
        };
        self.store.insert_task(&task).await?;
        Ok(task)
    }

    pub async fn list(&self, owner: i64) -> Vec<Task> {
        self.store.find_tasks(Some(owner)).await
    }

    pub async fn get(&self, owner: i64, id: i64) -> Option<Task> {
        self.store
            .find_tasks(Some(owner))
            .await
            .into_iter()
            .find(|task| task.id == id)
    }

    /// Updates at most the one task matching (id, owner); foreign ids no-op.
    pub async fn update(
        &self,
        owner: i64,
        id: i64,
        update: TaskUpdate,
    ) -> Result<(), StoreError> {
        self.store.update_task(id, owner, &update).await
    }

    /// Deletes at most the one task matching (id, owner); foreign ids no-op.
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), StoreError> {
        self.store.delete_task(id, owner).await
    }
}
