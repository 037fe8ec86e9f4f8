use std::io::Write;

use anyhow::Result;
use docket_app::TaskBoard;
use docket_core::date::{format_day, long_day};
use docket_core::{Task, View};
use serde::Serialize;

#[derive(Serialize)]
struct Listing<'a> {
    view: String,
    important_count: usize,
    tasks: Vec<ListedTask<'a>>,
}

#[derive(Serialize)]
struct ListedTask<'a> {
    /// 1-based row within the view.
    row: usize,
    #[serde(flatten)]
    task: &'a Task,
}

pub(super) fn task_table(out: &mut impl Write, board: &TaskBoard) -> Result<()> {
    let selection = board.selection();
    if selection.view == View::Today {
        writeln!(out, "{} ({})", selection.summary(), long_day(board.today()))?;
    } else {
        writeln!(out, "{}", selection.summary())?;
    }

    let tasks = board.visible();
    if tasks.is_empty() {
        writeln!(out, "No tasks in this view")?;
    } else {
        writeln!(out, "# | ID | Title | Due | Flags")?;
        writeln!(out, "- | -- | ----- | --- | -----")?;
        for (index, task) in tasks.iter().enumerate() {
            let due = task.due_date.map_or_else(|| "-".to_owned(), format_day);
            writeln!(
                out,
                "{} | {} | {} | {} | {}",
                index + 1,
                task.id,
                task.title,
                due,
                flags(task)
            )?;
        }
    }
    writeln!(out, "Important: {}", board.important_count())?;
    Ok(())
}

pub(super) fn task_json(out: &mut impl Write, board: &TaskBoard) -> Result<()> {
    let listing = Listing {
        view: board.selection().summary(),
        important_count: board.important_count(),
        tasks: board
            .visible()
            .iter()
            .enumerate()
            .map(|(index, task)| ListedTask { row: index + 1, task })
            .collect(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&listing)?)?;
    Ok(())
}

fn flags(task: &Task) -> &'static str {
    match (task.important, task.completed) {
        (true, true) => "★ ✓",
        (true, false) => "★",
        (false, true) => "✓",
        (false, false) => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::TaskId;
    use time::macros::date;

    fn board_with(tasks: Vec<Task>, view: View) -> TaskBoard {
        let mut board = TaskBoard::new(date!(2025 - 03 - 09));
        let store = docket_app::MemoryStore::with_tasks(tasks);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap_or_else(|err| panic!("runtime: {err}"));
        runtime
            .block_on(board.refresh(&store))
            .unwrap_or_else(|err| panic!("refresh: {err}"));
        board.set_view(view);
        board
    }

    fn render(board: &TaskBoard, json: bool) -> String {
        let mut out = Vec::new();
        let result = if json {
            task_json(&mut out, board)
        } else {
            task_table(&mut out, board)
        };
        result.unwrap_or_else(|err| panic!("render: {err}"));
        String::from_utf8(out).unwrap_or_else(|err| panic!("utf8: {err}"))
    }

    #[test]
    fn today_header_carries_long_date() {
        let mut task = Task::new(TaskId(1), "Buy milk");
        task.due_date = Some(date!(2025 - 03 - 09));
        let output = render(&board_with(vec![task], View::Today), false);
        assert!(output.starts_with("Today (Sunday 9 March 2025)"));
        assert!(output.contains("1 | 1 | Buy milk | 2025-03-09 | -"));
    }

    #[test]
    fn empty_view_says_so() {
        let output = render(&board_with(Vec::new(), View::Completed), false);
        assert!(output.contains("No tasks in this view"));
        assert!(output.ends_with("Important: 0\n"));
    }

    #[test]
    fn json_rows_are_one_based() {
        let mut starred = Task::new(TaskId(5), "Call mom");
        starred.important = true;
        let output = render(&board_with(vec![starred], View::Important), true);
        let value: serde_json::Value =
            serde_json::from_str(&output).unwrap_or_else(|err| panic!("json: {err}"));
        assert_eq!(value["view"], "Important");
        assert_eq!(value["important_count"], 1);
        assert_eq!(value["tasks"][0]["row"], 1);
        assert_eq!(value["tasks"][0]["id"], 5);
    }
}
