use thiserror::Error;

/// Input rejected before anything is sent to the task store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Title was empty or whitespace-only.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// A Planned task was submitted without a due day.
    #[error("a planned task needs a due date")]
    MissingDueDate,
    /// Date did not start with a `YYYY-MM-DD` day string.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        /// Raw user or store input.
        input: String,
        /// Underlying parse failure.
        #[source]
        source: time::error::Parse,
    },
    /// View token did not name a known view.
    #[error("unknown view: {token}")]
    UnknownView {
        /// Raw token.
        token: String,
    },
    /// Sub-filter token did not name a known planned filter.
    #[error("unknown planned filter: {token}")]
    UnknownPlannedFilter {
        /// Raw token.
        token: String,
    },
}
