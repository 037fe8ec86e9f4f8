use anyhow::Result;
use docket_app::{TaskStore, TokenStore};

use super::terminal::Term;
use super::view::{Ui, UiAction};

pub(super) mod edit;
pub(super) mod navigation;

pub(super) fn handle_ui_action<S: TaskStore, T: TokenStore>(
    terminal: &mut Term,
    ui: &mut Ui<S, T>,
    action: UiAction,
) -> Result<()> {
    edit::handle_ui_action(terminal, ui, action)
}
