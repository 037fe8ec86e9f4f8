//! Client-side task state: the fetched collection, the active view and its
//! rendered list.

use docket_core::{
    DraftInput, PlannedFilter, Task, TaskDraft, TaskEdit, TaskId, TaskPatch, UserProfile, View, ViewSelection,
    important_count, select_view,
};
use time::Date;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::reorder::{ReorderController, ReorderPhase};
use crate::store::TaskStore;

/// Everything a presentation layer needs to render the task pages.
///
/// Mutations go through a [`TaskStore`] and are followed by a full refetch;
/// the visible list is always rebuilt from the fetched collection.
#[derive(Debug, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    selection: ViewSelection,
    today: Date,
    important: usize,
    profile: Option<UserProfile>,
    reorder: ReorderController,
}

impl TaskBoard {
    /// Empty board on the default view.
    #[must_use]
    pub fn new(today: Date) -> Self {
        Self {
            tasks: Vec::new(),
            selection: ViewSelection::default(),
            today,
            important: 0,
            profile: None,
            reorder: ReorderController::default(),
        }
    }

    /// Fetched collection in stored order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks shown under the active view, in display order.
    #[must_use]
    pub fn visible(&self) -> &[Task] {
        self.reorder.items()
    }

    /// Active view and sub-filter.
    #[must_use]
    pub const fn selection(&self) -> &ViewSelection {
        &self.selection
    }

    /// Reference day used by the date-based views.
    #[must_use]
    pub const fn today(&self) -> Date {
        self.today
    }

    /// Count shown on the Important badge.
    #[must_use]
    pub const fn important_count(&self) -> usize {
        self.important
    }

    /// Profile of the logged-in user, once loaded.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Phase of the most recent reorder.
    #[must_use]
    pub const fn reorder_phase(&self) -> ReorderPhase {
        self.reorder.phase()
    }

    /// Look up a fetched task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Move the reference day, e.g. after midnight.
    pub fn set_today(&mut self, today: Date) {
        self.today = today;
        self.rebuild();
    }

    /// Switch views. The Planned sub-filter resets to all planned tasks.
    pub fn set_view(&mut self, view: View) {
        self.selection = ViewSelection::new(view);
        self.rebuild();
    }

    /// Change the Planned sub-filter.
    pub fn set_planned_filter(&mut self, filter: PlannedFilter) {
        self.selection = self.selection.with_planned(filter);
        self.rebuild();
    }

    /// Pick a custom day for the Planned view, or clear it.
    pub fn set_custom_date(&mut self, day: Option<Date>) {
        self.selection = self.selection.with_custom_date(day);
        self.rebuild();
    }

    /// Drop all task state, e.g. after the session expired.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.profile = None;
        self.reorder = ReorderController::default();
        self.important = 0;
    }

    /// Fetch the collection and rebuild the visible list.
    ///
    /// On failure the previous collection is kept.
    ///
    /// # Errors
    /// Returns the store error.
    pub async fn refresh<S: TaskStore>(&mut self, store: &S) -> Result<(), StoreError> {
        match store.list_tasks().await.map_err(Into::<StoreError>::into) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list refreshed");
                self.tasks = tasks;
                self.rebuild();
                Ok(())
            }
            Err(err) => Err(abandon("refresh", err)),
        }
    }

    /// Fetch the profile of the logged-in user.
    ///
    /// # Errors
    /// Returns the store error.
    pub async fn load_profile<S: TaskStore>(&mut self, store: &S) -> Result<&UserProfile, StoreError> {
        let profile = store
            .current_user()
            .await
            .map_err(|err| abandon("load profile", err.into()))?;
        Ok(self.profile.insert(profile))
    }

    /// Create a task shaped by the active view.
    ///
    /// # Errors
    /// Returns a validation error for a blank title or an undated Planned
    /// task without calling the store.
    pub async fn create<S: TaskStore>(&mut self, store: &S, input: DraftInput) -> Result<Task, StoreError> {
        let draft = TaskDraft::for_view(self.selection.view, input, self.today)?;
        let created = store
            .create_task(&draft)
            .await
            .map_err(|err| abandon("create", err.into()))?;
        self.refresh(store).await?;
        Ok(created)
    }

    /// Flip the completed flag.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownTask`] for ids outside the collection.
    pub async fn toggle_completed<S: TaskStore>(&mut self, store: &S, id: TaskId) -> Result<(), StoreError> {
        let patch = TaskPatch::toggle_completed(self.require(id)?);
        self.apply_patch(store, id, &patch).await.map(|_| ())
    }

    /// Flip the important flag.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownTask`] for ids outside the collection.
    pub async fn toggle_important<S: TaskStore>(&mut self, store: &S, id: TaskId) -> Result<(), StoreError> {
        let patch = TaskPatch::toggle_important(self.require(id)?);
        self.apply_patch(store, id, &patch).await.map(|_| ())
    }

    /// Save an edit form. Returns false when nothing changed.
    ///
    /// # Errors
    /// Returns a validation error for a blank title without calling the store.
    pub async fn save_edit<S: TaskStore>(&mut self, store: &S, id: TaskId, edit: TaskEdit) -> Result<bool, StoreError> {
        let patch = TaskPatch::from_edit(self.require(id)?, edit);
        self.apply_patch(store, id, &patch).await
    }

    /// Send a patch and refetch. Returns false for an empty patch.
    ///
    /// # Errors
    /// Returns a validation error for a blank title without calling the store.
    pub async fn apply_patch<S: TaskStore>(&mut self, store: &S, id: TaskId, patch: &TaskPatch) -> Result<bool, StoreError> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(false);
        }
        store
            .update_task(id, patch)
            .await
            .map_err(|err| abandon("update", err.into()))?;
        self.refresh(store).await?;
        Ok(true)
    }

    /// Delete a task.
    ///
    /// # Errors
    /// Returns the store error.
    pub async fn delete<S: TaskStore>(&mut self, store: &S, id: TaskId) -> Result<(), StoreError> {
        store
            .delete_task(id)
            .await
            .map_err(|err| abandon("delete", err.into()))?;
        self.refresh(store).await
    }

    /// Apply a drag to the visible list without contacting the store.
    ///
    /// Returns true when a reorder is now waiting for [`Self::finish_drag`].
    pub fn begin_drag(&mut self, source: usize, destination: Option<usize>) -> bool {
        self.reorder.apply_local(source, destination)
    }

    /// Persist the pending drag and refetch.
    ///
    /// # Errors
    /// Returns the store error after restoring the previous order.
    pub async fn finish_drag<S: TaskStore>(&mut self, store: &S) -> Result<bool, StoreError> {
        if !self.reorder.sync(store).await? {
            return Ok(false);
        }
        if let Err(err) = self.refresh(store).await {
            self.reorder.revert();
            return Err(err);
        }
        Ok(true)
    }

    /// Apply a finished drag and persist it.
    ///
    /// Returns false when the drag changed nothing.
    ///
    /// # Errors
    /// Returns the store error after restoring the previous order.
    pub async fn on_drag_end<S: TaskStore>(
        &mut self,
        store: &S,
        source: usize,
        destination: Option<usize>,
    ) -> Result<bool, StoreError> {
        if !self.begin_drag(source, destination) {
            return Ok(false);
        }
        self.finish_drag(store).await
    }

    fn require(&self, id: TaskId) -> Result<&Task, StoreError> {
        self.task(id).ok_or(StoreError::UnknownTask(id))
    }

    fn rebuild(&mut self) {
        let visible: Vec<Task> = select_view(&self.tasks, &self.selection, self.today)
            .into_iter()
            .cloned()
            .collect();
        self.important = important_count(&self.tasks);
        self.reorder.settle(visible);
    }
}

fn abandon(operation: &str, err: StoreError) -> StoreError {
    if !err.is_auth_expired() {
        warn!("{operation} abandoned: {err}");
    }
    err
}
