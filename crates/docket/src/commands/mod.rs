use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use docket_app::{SessionGate, StoreError, TaskBoard, TaskStore, TokenStore};
use docket_core::date::parse_day;
use docket_core::{DraftInput, PlannedFilter, Task, TaskEdit, TaskId, UserProfile, View, ViewSelection};
use time::Date;

use crate::{Command, LsFormat};

pub mod auth;
mod render;

/// Printed when a protected command runs without a stored session.
pub const LOGIN_REQUIRED: &str = "login required; run `docket login`";
/// Printed after the server rejected the stored session.
pub const SESSION_EXPIRED: &str = "session expired; run `docket login`";

/// Task commands against one store, scoped by the session gate.
pub struct TaskService<S, T> {
    store: S,
    gate: SessionGate<T>,
    board: TaskBoard,
}

impl<S: TaskStore, T: TokenStore> TaskService<S, T> {
    pub fn new(store: S, gate: SessionGate<T>, today: Date) -> Self {
        Self {
            store,
            gate,
            board: TaskBoard::new(today),
        }
    }

    pub const fn board(&self) -> &TaskBoard {
        &self.board
    }

    #[cfg(test)]
    pub const fn gate(&self) -> &SessionGate<T> {
        &self.gate
    }

    #[cfg(test)]
    pub const fn store(&self) -> &S {
        &self.store
    }

    async fn whoami(&mut self) -> Result<UserProfile> {
        self.ensure_login()?;
        let result = self.board.load_profile(&self.store).await.cloned();
        let profile = self.guard(result)?;
        self.gate.set_profile(profile.clone());
        Ok(profile)
    }

    async fn select(&mut self, selection: ViewSelection) -> Result<()> {
        self.ensure_login()?;
        self.board.set_view(selection.view);
        self.board.set_planned_filter(selection.planned);
        let result = self.board.refresh(&self.store).await;
        self.guard(result)
    }

    async fn create(&mut self, view: View, input: DraftInput) -> Result<Task> {
        self.ensure_login()?;
        self.board.set_view(view);
        let result = self.board.create(&self.store, input).await;
        self.guard(result)
    }

    async fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        self.select(ViewSelection::default()).await?;
        let result = self.board.toggle_completed(&self.store, id).await;
        self.guard(result)?;
        self.flag(id, |task| task.completed)
    }

    async fn toggle_important(&mut self, id: TaskId) -> Result<bool> {
        self.select(ViewSelection::default()).await?;
        let result = self.board.toggle_important(&self.store, id).await;
        self.guard(result)?;
        self.flag(id, |task| task.important)
    }

    async fn edit(&mut self, id: TaskId, changes: EditArgs) -> Result<bool> {
        self.select(ViewSelection::default()).await?;
        let current = self
            .board
            .task(id)
            .ok_or_else(|| anyhow!("task {id} not found"))?;
        let edit = changes.apply(TaskEdit::from_task(current))?;
        let result = self.board.save_edit(&self.store, id, edit).await;
        self.guard(result)
    }

    async fn delete(&mut self, id: TaskId) -> Result<()> {
        self.ensure_login()?;
        let result = self.board.delete(&self.store, id).await;
        self.guard(result)
    }

    async fn move_task(&mut self, selection: ViewSelection, from: usize, to: usize) -> Result<bool> {
        self.select(selection).await?;
        let len = self.board.visible().len();
        let source = position_index(from, len)?;
        let destination = position_index(to, len)?;
        let result = self.board.on_drag_end(&self.store, source, Some(destination)).await;
        self.guard(result)
    }

    fn flag(&self, id: TaskId, read: impl Fn(&Task) -> bool) -> Result<bool> {
        self.board
            .task(id)
            .map(read)
            .ok_or_else(|| anyhow!("task {id} disappeared after the update"))
    }

    fn ensure_login(&self) -> Result<()> {
        if self.gate.is_authenticated() {
            Ok(())
        } else {
            bail!(LOGIN_REQUIRED)
        }
    }

    /// Route an expired session through the gate and drop the task state.
    fn guard<R>(&mut self, result: Result<R, StoreError>) -> Result<R> {
        match self.gate.check(result) {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth_expired() => {
                self.board.clear();
                Err(anyhow!(SESSION_EXPIRED))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Optional field changes from `docket edit`.
#[derive(Debug, Default)]
struct EditArgs {
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    clear_due: bool,
}

impl EditArgs {
    fn apply(self, mut edit: TaskEdit) -> Result<TaskEdit> {
        if let Some(title) = self.title {
            edit.title = title;
        }
        if let Some(description) = self.description {
            edit.description = Some(description);
        }
        if let Some(due) = self.due {
            edit.due_date = Some(parse_day(&due)?);
        }
        if self.clear_due {
            edit.due_date = None;
        }
        Ok(edit)
    }
}

pub async fn run<S: TaskStore, T: TokenStore>(
    command: Command,
    service: &mut TaskService<S, T>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Whoami => {
            let profile = service.whoami().await?;
            writeln!(out, "{} <{}>", profile.username, profile.email)?;
        }
        Command::Ls {
            view,
            when,
            date,
            format,
        } => {
            let selection = parse_selection(&view, when.as_deref(), date.as_deref())?;
            service.select(selection).await?;
            match format {
                LsFormat::Table => render::task_table(out, service.board())?,
                LsFormat::Json => render::task_json(out, service.board())?,
            }
        }
        Command::Add {
            title,
            description,
            view,
            due,
        } => {
            let view = parse_view(&view)?;
            let input = DraftInput {
                title,
                description,
                due_date: due.as_deref().map(parse_day).transpose()?,
            };
            let task = service.create(view, input).await?;
            writeln!(out, "created task {}: {}", task.id, task.title)?;
        }
        Command::Done { id } => {
            let id = parse_task_id(&id)?;
            let completed = service.toggle_completed(id).await?;
            let verb = if completed { "completed" } else { "reopened" };
            writeln!(out, "{verb} task {id}")?;
        }
        Command::Star { id } => {
            let id = parse_task_id(&id)?;
            let important = service.toggle_important(id).await?;
            let verb = if important { "starred" } else { "unstarred" };
            writeln!(out, "{verb} task {id}")?;
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            clear_due,
        } => {
            let id = parse_task_id(&id)?;
            let changes = EditArgs {
                title,
                description,
                due,
                clear_due,
            };
            if service.edit(id, changes).await? {
                writeln!(out, "updated task {id}")?;
            } else {
                writeln!(out, "task {id} unchanged")?;
            }
        }
        Command::Rm { id } => {
            let id = parse_task_id(&id)?;
            service.delete(id).await?;
            writeln!(out, "deleted task {id}")?;
        }
        Command::Mv {
            view,
            when,
            date,
            from,
            to,
        } => {
            let selection = parse_selection(&view, when.as_deref(), date.as_deref())?;
            if service.move_task(selection, from, to).await? {
                writeln!(out, "moved {from} -> {to} in {}", selection.summary())?;
            } else {
                writeln!(out, "order unchanged")?;
            }
        }
        Command::Register { .. }
        | Command::Login { .. }
        | Command::Logout
        | Command::Config { .. }
        | Command::Tui => unreachable!("Unhandled command routed to TaskService"),
    }

    Ok(())
}

fn parse_view(raw: &str) -> Result<View> {
    View::from_str(raw).with_context(|| format!("Invalid view: {raw}"))
}

fn parse_selection(view: &str, when: Option<&str>, date: Option<&str>) -> Result<ViewSelection> {
    let view = parse_view(view)?;
    if view != View::Planned && (when.is_some() || date.is_some()) {
        bail!("--when and --date only apply to the planned view");
    }
    let mut selection = ViewSelection::new(view);
    if let Some(when) = when {
        selection = selection.with_planned(PlannedFilter::from_str(when)?);
    }
    if let Some(date) = date {
        selection = selection.with_custom_date(Some(parse_day(date)?));
    }
    Ok(selection)
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}

/// Zero-based index for a 1-based position within `len` rows.
fn position_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("position {position} is outside the view (1..={len})");
    }
    Ok(position - 1)
}
