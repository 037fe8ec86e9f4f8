use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use docket_app::{TaskStore, TokenStore};
use docket_core::date::{format_day, parse_day};
use docket_core::{PlannedFilter, TaskId, View};

use super::super::view::{Grab, Mode, Ui, UiAction};
use crate::config::{Action, ViewType};

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> Result<Option<UiAction>> {
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }

        match self.mode.clone() {
            Mode::Browse => self.handle_task_list_key(key),
            Mode::Grab(grab) => Ok(self.handle_grab_key(grab, key)),
            Mode::ConfirmDelete { task } => {
                self.handle_confirm_key(task, key);
                Ok(None)
            }
            Mode::DateInput { buffer } => {
                self.handle_date_input_key(buffer, key);
                Ok(None)
            }
        }
    }

    fn handle_task_list_key(&mut self, key: KeyEvent) -> Result<Option<UiAction>> {
        let Some(action) = self.keybindings.action_for(ViewType::TaskList, &key) else {
            return Ok(None);
        };

        match action {
            Action::Quit => self.should_quit = true,
            Action::Down => self.select_next(),
            Action::Up => self.select_prev(),
            Action::NextView => self.switch_view(self.step_view(1)),
            Action::PrevView => self.switch_view(self.step_view(View::ALL.len() - 1)),
            Action::ShowToday => self.switch_view(View::Today),
            Action::ShowImportant => self.switch_view(View::Important),
            Action::ShowPlanned => self.switch_view(View::Planned),
            Action::ShowCompleted => self.switch_view(View::Completed),
            Action::ShowAll => self.switch_view(View::All),
            Action::ToggleCompleted => self.toggle_completed(),
            Action::ToggleImportant => self.toggle_important(),
            Action::CreateTask => return Ok(Some(UiAction::CreateTask)),
            Action::EditTask => {
                return Ok(self.selected_task_id().map_or_else(
                    || {
                        self.error("no task selected to edit");
                        None
                    },
                    |task| Some(UiAction::EditTask { task }),
                ));
            }
            Action::DeleteTask => match self.selected_task_id() {
                Some(task) => self.mode = Mode::ConfirmDelete { task },
                None => self.error("no task selected to delete"),
            },
            Action::Refresh => self.refresh(),
            Action::CyclePlanned => self.cycle_planned(),
            Action::PickDate => self.open_date_input(),
            Action::Grab => self.grab_selected(),
            Action::Logout => {
                self.app.logout()?;
                self.exit_notice = Some("logged out".to_owned());
                self.should_quit = true;
            }
            Action::Drop | Action::Cancel | Action::Confirm => {}
        }
        Ok(None)
    }

    fn handle_grab_key(&mut self, mut grab: Grab, key: KeyEvent) -> Option<UiAction> {
        match self.keybindings.action_for(ViewType::Grab, &key)? {
            Action::Down => {
                grab.slot = (grab.slot + 1).min(self.visible().len().saturating_sub(1));
                self.mode = Mode::Grab(grab);
            }
            Action::Up => {
                grab.slot = grab.slot.saturating_sub(1);
                self.mode = Mode::Grab(grab);
            }
            Action::Cancel => {
                self.mode = Mode::Browse;
                self.info("move cancelled");
            }
            Action::Drop => {
                self.mode = Mode::Browse;
                if !self.app.begin_drag(grab.source, Some(grab.slot)) {
                    self.info("order unchanged");
                    return None;
                }
                self.selected = grab.slot;
                return Some(UiAction::FinishDrag);
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, task: TaskId, key: KeyEvent) {
        match self.keybindings.action_for(ViewType::Confirm, &key) {
            Some(Action::Confirm) => {
                self.mode = Mode::Browse;
                match self.app.delete(task) {
                    Ok(()) => {
                        self.reselect(None);
                        self.info(format!("deleted task {task}"));
                    }
                    Err(err) => self.report("delete failed", &err),
                }
            }
            Some(Action::Cancel) => self.mode = Mode::Browse,
            _ => {}
        }
    }

    fn handle_date_input_key(&mut self, mut buffer: String, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let input = buffer.trim();
                if input.is_empty() {
                    return;
                }
                match parse_day(input) {
                    Ok(day) => {
                        self.app.set_custom_date(Some(day));
                        self.selected = 0;
                    }
                    Err(err) => self.error(err.to_string()),
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = Mode::DateInput { buffer };
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '-' => {
                buffer.push(ch);
                self.mode = Mode::DateInput { buffer };
            }
            _ => {}
        }
    }

    fn step_view(&self, offset: usize) -> View {
        let current = self.app.board().selection().view;
        let index = View::ALL
            .iter()
            .position(|view| *view == current)
            .unwrap_or_default();
        View::ALL[(index + offset) % View::ALL.len()]
    }

    fn switch_view(&mut self, view: View) {
        self.app.set_view(view);
        self.selected = 0;
    }

    fn toggle_completed(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            self.error("no task selected");
            return;
        };
        match self.app.toggle_completed(task.id) {
            Ok(()) => {
                self.reselect(Some(task.id));
                let verb = if task.completed { "reopened" } else { "completed" };
                self.info(format!("{verb} {}", task.title));
            }
            Err(err) => self.report("update failed", &err),
        }
    }

    fn toggle_important(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            self.error("no task selected");
            return;
        };
        match self.app.toggle_important(task.id) {
            Ok(()) => {
                self.reselect(Some(task.id));
                let verb = if task.important { "unstarred" } else { "starred" };
                self.info(format!("{verb} {}", task.title));
            }
            Err(err) => self.report("update failed", &err),
        }
    }

    fn refresh(&mut self) {
        let keep = self.selected_task_id();
        match self.app.refresh() {
            Ok(()) => {
                self.reselect(keep);
                self.info("tasks reloaded");
            }
            Err(err) => self.report("reload failed", &err),
        }
    }

    fn cycle_planned(&mut self) {
        let selection = *self.app.board().selection();
        if selection.view != View::Planned {
            self.error("sub-filters only apply to Planned");
            return;
        }
        self.app.set_planned_filter(selection.planned.next());
        self.selected = 0;
    }

    /// Prompt for a Planned day, switching to Planned first if needed.
    fn open_date_input(&mut self) {
        let selection = *self.app.board().selection();
        if selection.view != View::Planned {
            self.switch_view(View::Planned);
        }
        let prefill = match selection.planned {
            PlannedFilter::CustomDate(Some(day)) if selection.view == View::Planned => day,
            _ => self.app.board().today(),
        };
        self.mode = Mode::DateInput {
            buffer: format_day(prefill),
        };
    }

    fn grab_selected(&mut self) {
        let len = self.visible().len();
        if len < 2 {
            self.error("nothing to reorder");
            return;
        }
        let source = self.selected.min(len - 1);
        self.mode = Mode::Grab(Grab { source, slot: source });
    }
}
