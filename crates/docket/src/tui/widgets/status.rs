use std::borrow::Cow;

use docket_app::{TaskStore, TokenStore};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::super::view::{Message, Mode, Ui};
use crate::config::ViewType;

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(in crate::tui) fn draw_status(&self, f: &mut Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let instructions = Paragraph::new(self.instructions())
            .block(Block::default().title("Keys").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(instructions, rows[0]);

        let message = Paragraph::new(self.status_text())
            .block(Block::default().title("Status").borders(Borders::ALL))
            .style(self.status_style());
        f.render_widget(message, rows[1]);
    }

    /// Help line for the current mode.
    pub(in crate::tui) fn instructions(&self) -> String {
        match &self.mode {
            Mode::Browse => self.keybindings.generate_help_text(ViewType::TaskList),
            Mode::Grab(_) => self.keybindings.generate_help_text(ViewType::Grab),
            Mode::ConfirmDelete { task } => {
                let title = self
                    .app
                    .board()
                    .task(*task)
                    .map_or_else(|| task.to_string(), |task| task.title.clone());
                format!(
                    "Delete \"{title}\"? {}",
                    self.keybindings.generate_help_text(ViewType::Confirm)
                )
            }
            Mode::DateInput { buffer } => format!("Due day (YYYY-MM-DD): {buffer}_  ↵:apply Esc:cancel"),
        }
    }

    fn status_text(&self) -> Cow<'_, str> {
        self.message
            .as_ref()
            .map_or(Cow::Borrowed(""), |msg| Cow::Borrowed(msg.text.as_str()))
    }

    fn status_style(&self) -> Style {
        self.message.as_ref().map_or_else(Style::default, Message::style)
    }
}
