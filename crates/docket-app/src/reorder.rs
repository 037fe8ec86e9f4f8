//! Optimistic drag reordering of the displayed list.

use docket_core::{Task, TaskId, move_item};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::TaskStore;

/// Where a reorder currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderPhase {
    /// No reorder has happened since the last fetch.
    #[default]
    Idle,
    /// The move is applied locally and not yet sent.
    Local,
    /// The new order is being persisted.
    Pending,
    /// The store accepted the order and a fresh list replaced the local one.
    Reconciled,
    /// Persisting failed and the last reconciled list was restored.
    Reverted,
}

/// Locally displayed ordering plus the last list the store confirmed.
#[derive(Debug, Clone, Default)]
pub struct ReorderController {
    reconciled: Vec<Task>,
    working: Vec<Task>,
    pending: Option<Vec<TaskId>>,
    phase: ReorderPhase,
}

impl ReorderController {
    /// Controller showing `items`.
    #[must_use]
    pub fn new(items: Vec<Task>) -> Self {
        Self {
            reconciled: items.clone(),
            working: items,
            pending: None,
            phase: ReorderPhase::Idle,
        }
    }

    /// Currently displayed order.
    #[must_use]
    pub fn items(&self) -> &[Task] {
        &self.working
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ReorderPhase {
        self.phase
    }

    /// Returns true while a move is applied but not yet confirmed.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        matches!(self.phase, ReorderPhase::Local | ReorderPhase::Pending)
    }

    /// Ids that will be sent for the move applied locally.
    #[must_use]
    pub fn pending_order(&self) -> Option<&[TaskId]> {
        self.pending.as_deref()
    }

    /// Replace the displayed list with a freshly computed one.
    ///
    /// A reorder waiting on the store becomes `Reconciled`.
    pub fn settle(&mut self, items: Vec<Task>) {
        self.phase = match self.phase {
            ReorderPhase::Local | ReorderPhase::Pending => ReorderPhase::Reconciled,
            other => other,
        };
        self.pending = None;
        self.reconciled.clone_from(&items);
        self.working = items;
    }

    /// Apply a finished drag to the displayed list.
    ///
    /// Returns true when the order changed. A cancelled drag, a drop on the
    /// source slot, an out-of-range source or a drag while another reorder
    /// is in flight leaves everything untouched.
    pub fn apply_local(&mut self, source: usize, destination: Option<usize>) -> bool {
        let Some(destination) = destination else {
            return false;
        };
        if self.in_flight() {
            return false;
        }
        if !move_item(&mut self.working, source, destination) {
            return false;
        }
        self.pending = Some(self.working.iter().map(|task| task.id).collect());
        self.phase = ReorderPhase::Local;
        true
    }

    /// Send the locally applied order to `store`.
    ///
    /// On failure the displayed list reverts to the last reconciled one.
    ///
    /// # Errors
    /// Returns the store error after reverting.
    pub async fn sync<S: TaskStore>(&mut self, store: &S) -> Result<bool, StoreError> {
        let Some(order) = self.pending.clone() else {
            return Ok(false);
        };
        self.phase = ReorderPhase::Pending;
        match store.reorder_tasks(&order).await.map_err(Into::<StoreError>::into) {
            Ok(()) => {
                info!(count = order.len(), "reorder persisted");
                Ok(true)
            }
            Err(err) => {
                warn!("reorder failed, restoring previous order: {err}");
                self.revert();
                Err(err)
            }
        }
    }

    /// Restore the last reconciled list.
    pub fn revert(&mut self) {
        self.working.clone_from(&self.reconciled);
        self.pending = None;
        self.phase = ReorderPhase::Reverted;
    }
}
