use anyhow::Result;
use docket_app::{SessionGate, StoreError, TaskBoard, TaskStore, TokenStore, local_today};
use docket_core::{DraftInput, PlannedFilter, Task, TaskEdit, TaskId, UserProfile, View};
use time::Date;
use tokio::runtime::Runtime;

/// Board plus the store and session it talks to, driven from the UI thread.
///
/// Every call blocks on the runtime until the store answers. An expired
/// session is routed through the gate and clears the board.
pub(super) struct App<S, T> {
    runtime: Runtime,
    store: S,
    gate: SessionGate<T>,
    board: TaskBoard,
}

impl<S: TaskStore, T: TokenStore> App<S, T> {
    pub(super) fn new(runtime: Runtime, store: S, gate: SessionGate<T>, today: Date) -> Self {
        Self {
            runtime,
            store,
            gate,
            board: TaskBoard::new(today),
        }
    }

    pub(super) const fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub(super) fn profile(&self) -> Option<&UserProfile> {
        self.gate.profile().or_else(|| self.board.profile())
    }

    /// Initial fetch of tasks and profile.
    pub(super) fn load(&mut self) -> Result<(), StoreError> {
        self.refresh()?;
        let result = self
            .runtime
            .block_on(self.board.load_profile(&self.store))
            .cloned();
        let profile = self.settle(result)?;
        self.gate.set_profile(profile);
        Ok(())
    }

    pub(super) fn refresh(&mut self) -> Result<(), StoreError> {
        let result = self.runtime.block_on(self.board.refresh(&self.store));
        self.settle(result)
    }

    pub(super) fn set_view(&mut self, view: View) {
        self.board.set_view(view);
    }

    pub(super) fn set_planned_filter(&mut self, filter: PlannedFilter) {
        self.board.set_planned_filter(filter);
    }

    pub(super) fn set_custom_date(&mut self, day: Option<Date>) {
        self.board.set_custom_date(day);
    }

    /// Follow the local calendar past midnight. Returns true when the day changed.
    pub(super) fn roll_day(&mut self) -> bool {
        let today = local_today();
        if today == self.board.today() {
            return false;
        }
        self.board.set_today(today);
        true
    }

    pub(super) fn create(&mut self, input: DraftInput) -> Result<Task, StoreError> {
        let result = self.runtime.block_on(self.board.create(&self.store, input));
        self.settle(result)
    }

    pub(super) fn toggle_completed(&mut self, id: TaskId) -> Result<(), StoreError> {
        let result = self.runtime.block_on(self.board.toggle_completed(&self.store, id));
        self.settle(result)
    }

    pub(super) fn toggle_important(&mut self, id: TaskId) -> Result<(), StoreError> {
        let result = self.runtime.block_on(self.board.toggle_important(&self.store, id));
        self.settle(result)
    }

    pub(super) fn save_edit(&mut self, id: TaskId, edit: TaskEdit) -> Result<bool, StoreError> {
        let result = self.runtime.block_on(self.board.save_edit(&self.store, id, edit));
        self.settle(result)
    }

    pub(super) fn delete(&mut self, id: TaskId) -> Result<(), StoreError> {
        let result = self.runtime.block_on(self.board.delete(&self.store, id));
        self.settle(result)
    }

    /// Apply a drop locally. The caller redraws before [`Self::finish_drag`].
    pub(super) fn begin_drag(&mut self, source: usize, destination: Option<usize>) -> bool {
        self.board.begin_drag(source, destination)
    }

    pub(super) fn finish_drag(&mut self) -> Result<bool, StoreError> {
        let result = self.runtime.block_on(self.board.finish_drag(&self.store));
        self.settle(result)
    }

    pub(super) fn logout(&mut self) -> Result<()> {
        self.gate.logout()?;
        self.board.clear();
        Ok(())
    }

    fn settle<R>(&mut self, result: Result<R, StoreError>) -> Result<R, StoreError> {
        let result = self.gate.check(result);
        if matches!(&result, Err(err) if err.is_auth_expired()) {
            self.board.clear();
        }
        result
    }

    #[cfg(test)]
    pub(super) const fn store(&self) -> &S {
        &self.store
    }
}
