use serde::{Serialize, Serializer};
use time::Date;

use crate::view::View;
use crate::{Task, ValidationError};

/// Raw form fields collected for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftInput {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: Option<String>,
    /// Day picked by the user.
    pub due_date: Option<Date>,
}

impl DraftInput {
    /// Input carrying only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Body of a task creation request.
///
/// Absent fields are omitted so the store applies its defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due day.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::date::option_day::serialize"
    )]
    pub due_date: Option<Date>,
    /// Important flag, only sent when set.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
}

impl TaskDraft {
    /// Build the creation payload implied by the active view.
    ///
    /// - Today: due today, no description.
    /// - Important: flagged important, no date.
    /// - Planned: the picked day, which is required, no description.
    /// - All and Completed: title and description only.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] for a blank title and
    /// [`ValidationError::MissingDueDate`] for a Planned task without a day.
    pub fn for_view(view: View, input: DraftInput, today: Date) -> Result<Self, ValidationError> {
        let title = normalized_title(&input.title)?;
        let mut draft = Self {
            title,
            description: None,
            due_date: None,
            important: false,
        };
        match view {
            View::Today => draft.due_date = Some(today),
            View::Important => draft.important = true,
            View::Planned => draft.due_date = Some(input.due_date.ok_or(ValidationError::MissingDueDate)?),
            View::All | View::Completed => draft.description = normalized_text(input.description.as_deref()),
        }
        Ok(draft)
    }
}

/// Desired field values from an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// Desired title.
    pub title: String,
    /// Desired description; `None` or blank clears it.
    pub description: Option<String>,
    /// Desired due day; `None` clears it.
    pub due_date: Option<Date>,
}

impl TaskEdit {
    /// Edit form pre-filled from `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
        }
    }
}

/// Partial update for an existing task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description; an empty string clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` clears the due day and is sent as `null`.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "patch_day")]
    pub due_date: Option<Option<Date>>,
    /// New important flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    /// New completed flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[allow(clippy::missing_const_for_fn)]
impl TaskPatch {
    /// Flip the completed flag of `task`.
    #[must_use]
    pub fn toggle_completed(task: &Task) -> Self {
        Self {
            completed: Some(!task.completed),
            ..Self::default()
        }
    }

    /// Flip the important flag of `task`.
    #[must_use]
    pub fn toggle_important(task: &Task) -> Self {
        Self {
            important: Some(!task.important),
            ..Self::default()
        }
    }

    /// Compute the patch turning `task` into the edited values.
    #[must_use]
    pub fn from_edit(task: &Task, edit: TaskEdit) -> Self {
        let TaskEdit {
            title,
            description,
            due_date,
        } = edit;

        let mut patch = Self::default();

        let title = title.trim();
        if title != task.title {
            patch.title = Some(title.to_owned());
        }

        let description = normalized_text(description.as_deref());
        if description != task.description {
            patch.description = Some(description.unwrap_or_default());
        }

        if due_date != task.due_date {
            patch.due_date = Some(due_date);
        }

        patch
    }

    /// Returns true when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.important.is_none()
            && self.completed.is_none()
    }

    /// Reject patches that would blank the title.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] when a title is present but blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title.as_deref() {
            Some(title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }

    /// Apply the patch to a task in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_owned();
        }
        if let Some(description) = &self.description {
            task.description = normalized_text(Some(description));
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(important) = self.important {
            task.important = important;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

#[allow(clippy::ref_option)]
fn patch_day<S>(value: &Option<Option<Date>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(day) => crate::date::option_day::serialize(day, serializer),
        None => serializer.serialize_none(),
    }
}

fn normalized_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_owned())
}

fn normalized_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|text| !text.is_empty()).map(str::to_owned)
}
