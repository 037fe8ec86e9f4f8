use std::env;
use std::fs;
use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tempfile::Builder;

pub(super) type Term = Terminal<CrosstermBackend<Stdout>>;

pub(super) fn with_terminal_suspended<F, T>(terminal: &mut Term, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    suspend_terminal(terminal)?;
    let result = f();
    resume_terminal(terminal)?;
    result
}

fn suspend_terminal(terminal: &mut Term) -> Result<()> {
    terminal.show_cursor()?;
    terminal.flush()?;
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("failed to leave alternate screen")?;
    Ok(())
}

fn resume_terminal(terminal: &mut Term) -> Result<()> {
    execute!(terminal.backend_mut(), EnterAlternateScreen).context("failed to re-enter alternate screen")?;
    enable_raw_mode().context("failed to enable raw mode")?;
    terminal.clear()?;
    terminal.hide_cursor()?;
    terminal.flush()?;
    Ok(())
}

pub(super) fn resolve_editor_command() -> String {
    env::var("DOCKET_EDITOR")
        .or_else(|_| env::var("VISUAL"))
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".into())
}

/// Open `initial` in the user's editor and return what was saved.
pub(super) fn launch_editor(initial: &str) -> Result<String> {
    let mut tempfile = Builder::new()
        .prefix("docket-")
        .suffix(".txt")
        .tempfile()
        .context("failed to create a temporary file")?;
    tempfile
        .write_all(initial.as_bytes())
        .context("failed to write the temporary file")?;
    tempfile.flush().context("failed to flush the temporary file")?;

    let temp_path: PathBuf = tempfile.path().to_path_buf();

    let editor = resolve_editor_command();
    let mut parts = shell_words::split(&editor).map_err(|err| anyhow!("cannot parse editor command: {err}"))?;
    if parts.is_empty() {
        parts.push(editor);
    }
    let program = parts.remove(0);

    let status = Command::new(&program)
        .args(&parts)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("failed to start editor {program}"))?;
    if !status.success() {
        return Err(anyhow!("editor exited with {status}"));
    }

    fs::read_to_string(&temp_path).context("failed to read the edited file")
}
