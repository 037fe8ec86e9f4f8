use docket_app::{TaskStore, TokenStore};
use docket_core::date::{format_day, long_day};
use docket_core::{Task, View};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::super::constants::{GRAB_MARKER, TASK_LIST_HIGHLIGHT_SYMBOL, TITLE_MAX_GRAPHEMES};
use super::super::view::{Mode, Ui};
use super::util::{completion_marker, importance_marker, truncate_with_ellipsis};

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    pub(in crate::tui) fn draw_main(&self, f: &mut Frame<'_>, area: Rect) {
        let view = self.app.board().selection().view;
        let header_height = if view == View::Today { 4 } else { 3 };
        let mut constraints = vec![Constraint::Length(header_height)];
        if view == View::Planned {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Min(3));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let header = Paragraph::new(self.header_lines()).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, rows[0]);

        if view == View::Planned {
            self.draw_planned_filter_bar(f, rows[1]);
        }
        self.draw_task_list(f, rows[rows.len() - 1]);
    }

    /// Page title, plus the long date on Today.
    pub(in crate::tui) fn header_lines(&self) -> Vec<Line<'static>> {
        let board = self.app.board();
        let view = board.selection().view;
        let mut lines = vec![Line::from(Span::styled(
            view.title(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if view == View::Today {
            lines.push(Line::from(Span::styled(
                long_day(board.today()),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }

    fn draw_task_list(&self, f: &mut Frame<'_>, area: Rect) {
        let rows = self.display_rows();
        let grabbed = match self.mode {
            Mode::Grab(grab) => Some(grab.slot),
            _ => None,
        };

        let items: Vec<ListItem<'_>> = if rows.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "No tasks in this view",
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            rows.iter()
                .enumerate()
                .map(|(index, task)| task_row(task, grabbed == Some(index)))
                .collect()
        };

        let title = match self.mode {
            Mode::Grab(_) => "Tasks (moving)".to_owned(),
            _ => format!("Tasks ({})", rows.len()),
        };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(TASK_LIST_HIGHLIGHT_SYMBOL);
        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.highlighted()));
        }
        f.render_stateful_widget(list, area, &mut state);
    }
}

fn task_row(task: &Task, grabbed: bool) -> ListItem<'static> {
    let mut title_style = Style::default();
    if task.completed {
        title_style = title_style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
    }

    let mut spans = Vec::new();
    if grabbed {
        spans.push(Span::styled(GRAB_MARKER, Style::default().fg(Color::Cyan)));
    }
    spans.push(Span::raw(completion_marker(task)));
    spans.push(Span::styled(
        truncate_with_ellipsis(&task.title, TITLE_MAX_GRAPHEMES).into_owned(),
        title_style,
    ));
    spans.push(Span::styled(importance_marker(task), Style::default().fg(Color::Yellow)));
    if let Some(due) = task.due_date {
        spans.push(Span::styled(
            format!("  {}", format_day(due)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    ListItem::new(Line::from(spans))
}
