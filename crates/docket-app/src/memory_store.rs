//! In-process task store with the server's bookkeeping rules.

use std::sync::{Mutex, MutexGuard, PoisonError};

use docket_core::{Task, TaskDraft, TaskId, TaskPatch, UserProfile, merge_subset_order};
use tracing::debug;

use crate::error::StoreError;
use crate::store::TaskStore;

/// One call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `list_tasks`
    List,
    /// `create_task` with the submitted title.
    Create(String),
    /// `update_task`
    Update(TaskId, TaskPatch),
    /// `delete_task`
    Delete(TaskId),
    /// `reorder_tasks` with the submitted ids.
    Reorder(Vec<TaskId>),
    /// `current_user`
    CurrentUser,
}

#[derive(Debug)]
struct MemoryState {
    tasks: Vec<Task>,
    next_id: u64,
    user: UserProfile,
    expired: bool,
    offline: bool,
    calls: Vec<StoreCall>,
}

/// Task store kept in memory.
///
/// Positions start at 1, new tasks go last, deletes repack positions and a
/// reorder refills the submitted ids' slots in submitted order.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(UserProfile {
            id: Some(1),
            username: "demo".into(),
            email: "demo@example.invalid".into(),
        })
    }
}

impl MemoryStore {
    /// Empty store owned by `user`.
    #[must_use]
    pub fn new(user: UserProfile) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                tasks: Vec::new(),
                next_id: 1,
                user,
                expired: false,
                offline: false,
                calls: Vec::new(),
            }),
        }
    }

    /// Store pre-populated with `tasks` in the given order.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::default();
        {
            let mut state = store.lock();
            state.next_id = tasks.iter().map(|task| task.id.0).max().unwrap_or(0) + 1;
            state.tasks = tasks;
            repack(&mut state.tasks);
        }
        store
    }

    /// Make every following call fail as if the session had expired.
    pub fn expire_session(&self) {
        self.lock().expired = true;
    }

    /// Make every following call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Stored tasks in order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Current ids in stored order.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.lock().tasks.iter().map(|task| task.id).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.expired {
            return Err(StoreError::AuthExpired);
        }
        if state.offline {
            return Err(StoreError::Transport("store offline".into()));
        }
        Ok(state)
    }
}

impl TaskStore for MemoryStore {
    type Error = StoreError;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        let state = self.begin(StoreCall::List)?;
        Ok(state.tasks.clone())
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error> {
        let mut state = self.begin(StoreCall::Create(draft.title.clone()))?;
        if draft.title.trim().is_empty() {
            return Err(StoreError::bad_request("Title is required"));
        }
        let id = TaskId(state.next_id);
        state.next_id += 1;

        let mut task = Task::new(id, draft.title.clone());
        task.description.clone_from(&draft.description);
        task.due_date = draft.due_date;
        task.important = draft.important;
        task.position = state.tasks.iter().map(|t| t.position).max().unwrap_or(0) + 1;
        state.tasks.push(task.clone());
        debug!(%id, "memory store created task");
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, Self::Error> {
        let mut state = self.begin(StoreCall::Update(id, patch.clone()))?;
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(StoreError::bad_request("Title is required"));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::not_found("Task not found"))?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        let mut state = self.begin(StoreCall::Delete(id))?;
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(StoreError::not_found("Task not found"));
        }
        repack(&mut state.tasks);
        Ok(())
    }

    async fn reorder_tasks(&self, order: &[TaskId]) -> Result<(), Self::Error> {
        let mut state = self.begin(StoreCall::Reorder(order.to_vec()))?;
        if order.is_empty() {
            return Err(StoreError::bad_request("Order list required"));
        }
        let current: Vec<TaskId> = state.tasks.iter().map(|task| task.id).collect();
        let merged = merge_subset_order(&current, order);
        let mut reordered = Vec::with_capacity(state.tasks.len());
        for id in merged {
            if let Some(task) = state.tasks.iter().find(|task| task.id == id) {
                reordered.push(task.clone());
            }
        }
        repack(&mut reordered);
        state.tasks = reordered;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, Self::Error> {
        let state = self.begin(StoreCall::CurrentUser)?;
        Ok(state.user.clone())
    }
}

fn repack(tasks: &mut [Task]) {
    for (position, task) in (1_i64..).zip(tasks.iter_mut()) {
        task.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{DraftInput, View};
    use time::macros::date;

    fn seeded(count: u64) -> MemoryStore {
        MemoryStore::with_tasks((1..=count).map(|id| Task::new(TaskId(id), format!("task {id}"))).collect())
    }

    fn ids(raw: &[u64]) -> Vec<TaskId> {
        raw.iter().copied().map(TaskId).collect()
    }

    #[tokio::test]
    async fn new_tasks_go_last() {
        let store = seeded(2);
        let draft = TaskDraft::for_view(View::All, DraftInput::titled("third"), date!(2025 - 03 - 12))
            .unwrap_or_else(|err| panic!("{err}"));
        let created = store.create_task(&draft).await.unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(created.id, TaskId(3));
        assert_eq!(created.position, 3);
        assert_eq!(store.ids(), ids(&[1, 2, 3]));
    }

    #[tokio::test]
    async fn delete_repacks_positions() {
        let store = seeded(3);
        store.delete_task(TaskId(1)).await.unwrap_or_else(|err| panic!("{err}"));
        let tasks = store.list_tasks().await.unwrap_or_else(|err| panic!("{err}"));
        let positions: Vec<i64> = tasks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = seeded(1);
        let err = store
            .delete_task(TaskId(9))
            .await
            .err()
            .unwrap_or_else(|| panic!("delete must fail"));
        assert!(matches!(err, StoreError::Server { status: 404, .. }));
    }

    #[tokio::test]
    async fn subset_reorder_keeps_other_slots() {
        let store = seeded(5);
        store
            .reorder_tasks(&ids(&[4, 2]))
            .await
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(store.ids(), ids(&[1, 4, 3, 2, 5]));
        let tasks = store.list_tasks().await.unwrap_or_else(|err| panic!("{err}"));
        assert!(tasks.iter().zip(1_i64..).all(|(task, pos)| task.position == pos));
    }

    #[tokio::test]
    async fn empty_reorder_is_rejected() {
        let store = seeded(2);
        assert!(store.reorder_tasks(&[]).await.is_err());
    }

    #[tokio::test]
    async fn expired_store_rejects_everything() {
        let store = seeded(1);
        store.expire_session();
        assert!(matches!(store.list_tasks().await, Err(StoreError::AuthExpired)));
        assert!(matches!(store.current_user().await, Err(StoreError::AuthExpired)));
        assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::CurrentUser]);
    }
}
