//! Domain types, view filtering and ordering rules for docket.

/// Calendar-day parsing and arithmetic.
pub mod date;
/// Creation and update payloads.
pub mod draft;
/// Validation errors.
pub mod error;
/// Identifier types.
pub mod id;
/// Order arithmetic for drag reordering.
pub mod order;
/// View filter engine.
pub mod view;

pub use crate::draft::{DraftInput, TaskDraft, TaskEdit, TaskPatch};
pub use crate::error::ValidationError;
pub use crate::id::TaskId;
pub use crate::order::{merge_subset_order, move_item};
pub use crate::view::{PlannedFilter, View, ViewSelection, important_count, select_view};

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

/// A task as reported by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Optional free-form description. Empty strings are treated as absent.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    /// Calendar day the task is due on.
    #[serde(default, with = "crate::date::option_day")]
    pub due_date: Option<Date>,
    /// Whether the task is flagged important.
    #[serde(default)]
    pub important: bool,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// Store-maintained position among the user's tasks.
    #[serde(default)]
    pub position: i64,
}

impl Task {
    /// Construct an incomplete, unimportant task without a due date.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            due_date: None,
            important: false,
            completed: false,
            position: 0,
        }
    }

    /// Returns true while the task has not been completed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Returns true when the task is due on the given calendar day.
    #[must_use]
    pub fn is_due_on(&self, day: Date) -> bool {
        self.due_date == Some(day)
    }
}

/// Identity of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Store-side user identifier, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(json: &str) -> Task {
        serde_json::from_str(json).unwrap_or_else(|err| panic!("task must parse: {err}"))
    }

    #[test]
    fn decodes_store_payload() {
        let task = parse(
            r#"{"id":7,"title":"Buy milk","description":"","completed":false,
                "position":3,"due_date":"2025-03-09","important":true}"#,
        );
        assert_eq!(task.id, TaskId(7));
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, Some(date!(2025 - 03 - 09)));
        assert!(task.important);
        assert!(task.is_pending());
        assert_eq!(task.position, 3);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let task = parse(r#"{"id":1,"title":"t","due_date":null}"#);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert!(!task.important);
        assert!(!task.completed);
    }

    #[test]
    fn timestamp_due_dates_keep_their_calendar_day() {
        let task = parse(r#"{"id":1,"title":"t","due_date":"2025-03-09T23:30:00-08:00"}"#);
        assert!(task.is_due_on(date!(2025 - 03 - 09)));
    }

    #[test]
    fn encodes_due_date_as_day_string() {
        let mut task = Task::new(TaskId(2), "Pay rent");
        task.due_date = Some(date!(2025 - 01 - 31));
        let json = serde_json::to_value(&task).unwrap_or_else(|err| panic!("encode: {err}"));
        assert_eq!(json["due_date"], "2025-01-31");
        assert_eq!(json["id"], 2);
    }

    #[test]
    fn user_profile_without_id_decodes() {
        let user: UserProfile = serde_json::from_str(r#"{"username":"ada","email":"ada@example.invalid"}"#)
            .unwrap_or_else(|err| panic!("profile must parse: {err}"));
        assert_eq!(user.username, "ada");
        assert!(user.id.is_none());
    }
}
