//! Plain-text templates for creating and editing tasks in `$EDITOR`.

use docket_core::date::{format_day, long_day, parse_day};
use docket_core::{PlannedFilter, Task, View, ViewSelection};
use time::Date;

const DESCRIPTION_MARKER: &str = "---";

/// Fields read back from an editor buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TaskForm {
    pub(super) title: String,
    pub(super) due_date: Option<Date>,
    pub(super) description: Option<String>,
}

/// Which fields a new task collects in `view`.
const fn collects(view: View) -> (bool, bool) {
    // (due date, description)
    match view {
        View::Planned => (true, false),
        View::All | View::Completed => (false, true),
        View::Today | View::Important => (false, false),
    }
}

pub(super) fn new_task_template(selection: &ViewSelection, today: Date) -> String {
    let mut lines = vec![format!("# New task in {}.", selection.view.title())];
    match selection.view {
        View::Today => lines.push(format!("# It will be due today, {}.", long_day(today))),
        View::Important => lines.push("# It will be marked important.".to_owned()),
        View::Planned => lines.push("# Pick the day it is due on (YYYY-MM-DD).".to_owned()),
        View::All | View::Completed => {}
    }
    lines.push("# The title is required. Save an empty file to cancel.".to_owned());
    lines.push("title: ".to_owned());

    let (due, description) = collects(selection.view);
    if due {
        let prefill = match selection.planned {
            PlannedFilter::CustomDate(Some(day)) => format_day(day),
            _ => format_day(today),
        };
        lines.push(format!("due: {prefill}"));
    }
    if description {
        lines.push("# Describe the task below the marker. Leave it empty for none.".to_owned());
        lines.push(DESCRIPTION_MARKER.to_owned());
        lines.push(String::new());
    }
    lines.push(String::new());
    lines.join("\n")
}

pub(super) fn edit_task_template(task: &Task) -> String {
    let due = task.due_date.map(format_day).unwrap_or_default();
    let mut lines = vec![
        format!("# Editing task {}. The title is required.", task.id),
        "# Clear `due` to remove the due day.".to_owned(),
        "# Everything below the marker is the description. Leave it empty to remove it.".to_owned(),
        format!("title: {}", task.title),
        format!("due: {due}"),
        DESCRIPTION_MARKER.to_owned(),
    ];
    match task.description.as_deref() {
        Some(text) => lines.extend(text.lines().map(str::to_owned)),
        None => lines.push(String::new()),
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Parse an editor buffer.
///
/// Comment lines are skipped above the `---` marker only. Below it every line
/// belongs to the description verbatim.
///
/// Returns `Ok(None)` when everything was left empty.
pub(super) fn parse_task_editor_output(raw: &str) -> Result<Option<TaskForm>, String> {
    let mut title: Option<&str> = None;
    let mut due: Option<&str> = None;
    let mut description_lines = Vec::new();
    let mut in_description = false;

    for line in raw.lines() {
        if in_description {
            description_lines.push(line);
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == DESCRIPTION_MARKER {
            in_description = true;
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(format!("malformed line: {trimmed}"));
        };
        match key.trim() {
            "title" => title = Some(value.trim()),
            "due" => due = Some(value.trim()),
            unknown => return Err(format!("unknown field: {unknown}")),
        }
    }

    let title = title.unwrap_or_default();
    let due = due.unwrap_or_default();
    let description = description_lines.join("\n").trim().to_owned();

    if title.is_empty() && due.is_empty() && description.is_empty() {
        return Ok(None);
    }
    if title.is_empty() {
        return Err("the title is required".into());
    }

    let due_date = if due.is_empty() {
        None
    } else {
        Some(parse_day(due).map_err(|err| err.to_string())?)
    };

    Ok(Some(TaskForm {
        title: title.to_owned(),
        due_date,
        description: (!description.is_empty()).then_some(description),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{TaskEdit, TaskId, TaskPatch};
    use time::macros::date;

    const TODAY: Date = date!(2025 - 03 - 12);

    fn parse(raw: &str) -> Option<TaskForm> {
        parse_task_editor_output(raw).unwrap_or_else(|err| panic!("must parse: {err}"))
    }

    #[test]
    fn today_template_only_asks_for_a_title() {
        let template = new_task_template(&ViewSelection::new(View::Today), TODAY);
        assert!(template.contains("due today, Wednesday 12 March 2025"));
        assert!(template.contains("title: "));
        assert!(!template.contains("due: "));
        assert!(!template.contains(DESCRIPTION_MARKER));
    }

    #[test]
    fn planned_template_prefills_the_picked_day() {
        let selection = ViewSelection::new(View::Planned).with_custom_date(Some(date!(2025 - 04 - 01)));
        let template = new_task_template(&selection, TODAY);
        assert!(template.contains("due: 2025-04-01"));

        let template = new_task_template(&ViewSelection::new(View::Planned), TODAY);
        assert!(template.contains("due: 2025-03-12"));
    }

    #[test]
    fn all_template_collects_a_description() {
        let template = new_task_template(&ViewSelection::default(), TODAY);
        assert!(template.contains(DESCRIPTION_MARKER));
        assert!(!template.contains("due: "));
    }

    #[test]
    fn empty_buffer_cancels() {
        let template = new_task_template(&ViewSelection::default(), TODAY);
        assert_eq!(parse(&template), None);
    }

    #[test]
    fn parses_fields_and_description() {
        let form = parse("# note\ntitle: Pay rent\ndue: 2025-03-31\n---\nBank transfer\n  ref 42\n")
            .unwrap_or_else(|| panic!("form expected"));
        assert_eq!(form.title, "Pay rent");
        assert_eq!(form.due_date, Some(date!(2025 - 03 - 31)));
        assert_eq!(form.description.as_deref(), Some("Bank transfer\n  ref 42"));
    }

    #[test]
    fn hash_lines_below_the_marker_stay_in_the_description() {
        let form = parse("title: Standup\n---\n# Agenda\n  #42 review\nitem one\n")
            .unwrap_or_else(|| panic!("form expected"));
        assert_eq!(form.description.as_deref(), Some("# Agenda\n  #42 review\nitem one"));
    }

    #[test]
    fn untouched_edit_of_markdown_description_is_not_a_change() {
        let mut task = Task::new(TaskId(5), "Standup");
        task.description = Some("# Agenda\nitem one".into());
        let form = parse(&edit_task_template(&task)).unwrap_or_else(|| panic!("form expected"));
        let edit = TaskEdit {
            title: form.title,
            description: form.description,
            due_date: form.due_date,
        };
        assert!(TaskPatch::from_edit(&task, edit).is_empty());
    }

    #[test]
    fn missing_title_is_reported() {
        let err = parse_task_editor_output("title: \ndue: 2025-03-31\n")
            .err()
            .unwrap_or_else(|| panic!("blank title must fail"));
        assert!(err.contains("title"));
    }

    #[test]
    fn bad_date_and_unknown_field_are_reported() {
        assert!(parse_task_editor_output("title: x\ndue: someday\n").is_err());
        assert!(parse_task_editor_output("title: x\npriority: high\n").is_err());
        assert!(parse_task_editor_output("just text\n").is_err());
    }

    #[test]
    fn edit_template_round_trips_current_values() {
        let mut task = Task::new(TaskId(3), "Write report");
        task.due_date = Some(date!(2025 - 03 - 14));
        task.description = Some("Draft first".into());
        let form = parse(&edit_task_template(&task)).unwrap_or_else(|| panic!("form expected"));
        assert_eq!(form.title, "Write report");
        assert_eq!(form.due_date, Some(date!(2025 - 03 - 14)));
        assert_eq!(form.description.as_deref(), Some("Draft first"));
    }
}
