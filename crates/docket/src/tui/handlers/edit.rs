use anyhow::Result;
use docket_app::{TaskStore, TokenStore};
use docket_core::{DraftInput, TaskEdit, TaskId};

use super::super::editor::{edit_task_template, new_task_template, parse_task_editor_output};
use super::super::terminal::{Term, launch_editor, with_terminal_suspended};
use super::super::view::{Ui, UiAction};

pub(super) fn handle_ui_action<S: TaskStore, T: TokenStore>(
    terminal: &mut Term,
    ui: &mut Ui<S, T>,
    action: UiAction,
) -> Result<()> {
    match action {
        UiAction::CreateTask => {
            let board = ui.app.board();
            let template = new_task_template(board.selection(), board.today());
            let raw = with_terminal_suspended(terminal, || launch_editor(&template))?;
            ui.apply_new_task_input(&raw);
        }
        UiAction::EditTask { task } => {
            let Some(template) = ui.app.board().task(task).map(edit_task_template) else {
                ui.error("the task to edit is gone");
                return Ok(());
            };
            let raw = with_terminal_suspended(terminal, || launch_editor(&template))?;
            ui.apply_edit_task_input(task, &raw);
        }
        UiAction::FinishDrag => {
            // Show the dropped order before waiting on the store.
            terminal.draw(|f| ui.draw(f))?;
            ui.finish_drag();
        }
    }
    Ok(())
}

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(in crate::tui) fn apply_new_task_input(&mut self, raw: &str) {
        match parse_task_editor_output(raw) {
            Ok(Some(form)) => {
                let input = DraftInput {
                    title: form.title,
                    description: form.description,
                    due_date: form.due_date,
                };
                match self.app.create(input) {
                    Ok(task) => {
                        self.reselect(Some(task.id));
                        self.info(format!("created task {}: {}", task.id, task.title));
                    }
                    Err(err) => self.report("could not create the task", &err),
                }
            }
            Ok(None) => self.info("task creation cancelled"),
            Err(msg) => self.error(msg),
        }
    }

    pub(in crate::tui) fn apply_edit_task_input(&mut self, task: TaskId, raw: &str) {
        match parse_task_editor_output(raw) {
            Ok(Some(form)) => {
                let edit = TaskEdit {
                    title: form.title,
                    description: form.description,
                    due_date: form.due_date,
                };
                match self.app.save_edit(task, edit) {
                    Ok(true) => {
                        self.reselect(Some(task));
                        self.info(format!("updated task {task}"));
                    }
                    Ok(false) => self.info("no changes"),
                    Err(err) => self.report("could not save the task", &err),
                }
            }
            Ok(None) => self.info("edit cancelled"),
            Err(msg) => self.error(msg),
        }
    }

    pub(in crate::tui) fn finish_drag(&mut self) {
        let keep = self.selected_task_id();
        match self.app.finish_drag() {
            Ok(_) => {
                self.reselect(keep);
                self.info("order saved");
            }
            Err(err) => {
                self.reselect(keep);
                self.report("reorder failed", &err);
            }
        }
    }
}
