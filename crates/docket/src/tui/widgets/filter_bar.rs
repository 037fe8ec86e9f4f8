use docket_app::{TaskStore, TokenStore};
use docket_core::PlannedFilter;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::super::view::Ui;

impl<S: TaskStore, T: TokenStore> Ui<S, T> {
    /// Sub-filter buttons for the Planned view, active one reversed.
    pub(in crate::tui) fn draw_planned_filter_bar(&self, f: &mut Frame<'_>, area: Rect) {
        let bar = Paragraph::new(self.planned_filter_line())
            .block(Block::default().title("Show").borders(Borders::ALL));
        f.render_widget(bar, area);
    }

    pub(in crate::tui) fn planned_filter_line(&self) -> Line<'static> {
        let active = self.app.board().selection().planned;
        let custom = match active {
            PlannedFilter::CustomDate(_) => active,
            _ => PlannedFilter::CustomDate(None),
        };

        let mut spans = Vec::new();
        for filter in PlannedFilter::PRESETS.into_iter().chain([custom]) {
            let style = if filter == active {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            if !spans.is_empty() {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!(" {} ", filter.label()), style));
        }
        Line::from(spans)
    }
}
