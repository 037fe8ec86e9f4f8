use docket_app::{TaskStore, TokenStore};
use docket_core::View;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::super::view::Ui;

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(in crate::tui) fn draw_sidebar(&self, f: &mut Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let account = self.app.profile().map_or_else(
            || vec![Line::from("not signed in")],
            |user| {
                vec![
                    Line::from(Span::styled(
                        user.username.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(user.email.clone(), Style::default().fg(Color::DarkGray))),
                ]
            },
        );
        let account = Paragraph::new(account).block(Block::default().title("docket").borders(Borders::ALL));
        f.render_widget(account, rows[0]);

        let items: Vec<ListItem<'_>> = View::ALL
            .iter()
            .map(|view| ListItem::new(self.view_label(*view)))
            .collect();
        let current = self.app.board().selection().view;
        let mut state = ListState::default();
        state.select(View::ALL.iter().position(|view| *view == current));

        let list = List::new(items)
            .block(Block::default().title("Views").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, rows[1], &mut state);
    }

    /// Sidebar entry. The Important badge is hidden while the count is zero.
    pub(in crate::tui) fn view_label(&self, view: View) -> Line<'static> {
        let count = self.app.board().important_count();
        if view == View::Important && count > 0 {
            Line::from(vec![
                Span::raw(view.title()),
                Span::styled(format!(" ({count})"), Style::default().fg(Color::Yellow)),
            ])
        } else {
            Line::from(view.title())
        }
    }
}
