//! Task store abstraction shared by the CLI, the TUI and tests.

use docket_core::{Task, TaskDraft, TaskId, TaskPatch, UserProfile};
use docket_store_http::{HttpStore, HttpStoreError};

use crate::error::StoreError;

/// Persistent record of one user's tasks.
///
/// Every call is scoped to the session the store was built with.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<StoreError>;

    /// Every task in stored order.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error>;

    /// Create a task from a validated draft.
    ///
    /// # Errors
    /// Returns a store-specific error when the task cannot be created.
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// Returns a store-specific error when the task is unknown or the update fails.
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, Self::Error>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a store-specific error when the task is unknown or deletion fails.
    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error>;

    /// Persist a new relative order for `order`.
    ///
    /// # Errors
    /// Returns a store-specific error when the order is rejected.
    async fn reorder_tasks(&self, order: &[TaskId]) -> Result<(), Self::Error>;

    /// Profile of the session owner.
    ///
    /// # Errors
    /// Returns a store-specific error when the profile cannot be read.
    async fn current_user(&self) -> Result<UserProfile, Self::Error>;
}

impl TaskStore for HttpStore {
    type Error = HttpStoreError;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        Self::list_tasks(self).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error> {
        Self::create_task(self, draft).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, Self::Error> {
        Self::update_task(self, id, patch).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        Self::delete_task(self, id).await
    }

    async fn reorder_tasks(&self, order: &[TaskId]) -> Result<(), Self::Error> {
        Self::reorder_tasks(self, order).await
    }

    async fn current_user(&self) -> Result<UserProfile, Self::Error> {
        Self::current_user(self).await
    }
}
