use std::time::{Duration, Instant};

use docket_app::{StoreError, TaskStore, TokenStore};
use docket_core::{Task, TaskId, move_item};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
};

use super::app::App;
use super::constants::{SIDEBAR_WIDTH, UI_MESSAGE_TTL_SECS};
use crate::commands::SESSION_EXPIRED;
use crate::config::KeyBindingsConfig;

/// Task picked up for reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Grab {
    /// Row the task was picked up from.
    pub(super) source: usize,
    /// Row it would land on if dropped now.
    pub(super) slot: usize,
}

/// What keys currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Mode {
    Browse,
    Grab(Grab),
    ConfirmDelete { task: TaskId },
    /// Typing a day for the Planned view.
    DateInput { buffer: String },
}

pub(super) struct Ui<S, T> {
    pub(super) app: App<S, T>,
    pub(super) selected: usize,
    pub(super) mode: Mode,
    pub(super) message: Option<Message>,
    pub(super) should_quit: bool,
    /// Printed on the normal screen once the TUI has exited.
    pub(super) exit_notice: Option<String>,
    pub(super) keybindings: KeyBindingsConfig,
}

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(super) const FOOTER_HEIGHT: u16 = 6;

    pub(super) const fn new(app: App<S, T>, keybindings: KeyBindingsConfig) -> Self {
        Self {
            app,
            selected: 0,
            mode: Mode::Browse,
            message: None,
            should_quit: false,
            exit_notice: None,
            keybindings,
        }
    }

    pub(super) fn visible(&self) -> &[Task] {
        self.app.board().visible()
    }

    /// Rows in display order, with a grabbed task shown at its drop slot.
    pub(super) fn display_rows(&self) -> Vec<&Task> {
        let mut rows: Vec<&Task> = self.visible().iter().collect();
        if let Mode::Grab(grab) = self.mode {
            move_item(&mut rows, grab.source, grab.slot);
        }
        rows
    }

    /// Highlighted row in [`Self::display_rows`].
    pub(super) const fn highlighted(&self) -> usize {
        match self.mode {
            Mode::Grab(grab) => grab.slot,
            _ => self.selected,
        }
    }

    pub(super) fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected)
    }

    pub(super) fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_task().map(|task| task.id)
    }

    pub(super) fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub(super) const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep `keep` selected after the list was rebuilt, else clamp.
    pub(super) fn reselect(&mut self, keep: Option<TaskId>) {
        if let Some(index) = keep.and_then(|id| self.visible().iter().position(|task| task.id == id)) {
            self.selected = index;
            return;
        }
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub(super) fn draw(&self, f: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(Self::FOOTER_HEIGHT)])
            .split(f.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(rows[0]);

        self.draw_sidebar(f, columns[0]);
        self.draw_main(f, columns[1]);
        self.draw_status(f, rows[1]);
    }

    pub(super) fn info(&mut self, message: impl Into<String>) {
        self.message = Some(Message::info(message));
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        self.message = Some(Message::error(message));
    }

    /// Surface a failed store call. An expired session ends the TUI.
    pub(super) fn report(&mut self, context: &str, err: &StoreError) {
        if err.is_auth_expired() {
            self.mode = Mode::Browse;
            self.exit_notice = Some(SESSION_EXPIRED.to_owned());
            self.should_quit = true;
        } else {
            self.error(format!("{context}: {err}"));
        }
    }

    pub(super) fn tick(&mut self) {
        if self.app.roll_day() {
            let keep = self.selected_task_id();
            self.reselect(keep);
        }
        if let Some(msg) = &self.message
            && msg.is_expired(Duration::from_secs(UI_MESSAGE_TTL_SECS))
        {
            self.message = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum UiAction {
    CreateTask,
    EditTask { task: TaskId },
    /// Persist the drop that is already shown on screen.
    FinishDrag,
}

pub(super) struct Message {
    pub(super) text: String,
    pub(super) level: MessageLevel,
    created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Error,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Info,
            created_at: Instant::now(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
            created_at: Instant::now(),
        }
    }

    pub(super) fn style(&self) -> Style {
        match self.level {
            MessageLevel::Info => Style::default().fg(Color::Green),
            MessageLevel::Error => Style::default().fg(Color::Red),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}
