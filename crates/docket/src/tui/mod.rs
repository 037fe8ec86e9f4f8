use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use docket_app::{SessionGate, TaskStore, TokenStore, local_today};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Runtime;
use tracing::subscriber::NoSubscriber;

use crate::commands::{LOGIN_REQUIRED, SESSION_EXPIRED};
use crate::config::keybindings::{KeyBindingsConfig, load_config, validate_tui_config};

mod app;
mod constants;
mod editor;
mod handlers;
mod terminal;
mod view;
mod widgets;

use self::app::App;
use self::constants::TUI_TICK_RATE_MS;
use self::handlers::handle_ui_action;
use self::terminal::Term;
use self::view::Ui;

/// Launch the interactive TUI.
///
/// Tasks are fetched before the terminal is taken over, so a missing or
/// expired session is reported on the normal screen.
pub fn run<S: TaskStore, T: TokenStore>(store: S, gate: SessionGate<T>, runtime: Runtime) -> Result<()> {
    if !gate.is_authenticated() {
        bail!(LOGIN_REQUIRED);
    }

    let keybindings = match load_config(None)? {
        Some(config) => {
            validate_tui_config(&config.tui)?;
            config.tui.keybindings
        }
        None => KeyBindingsConfig::default(),
    };

    let mut app = App::new(runtime, store, gate, local_today());
    if let Err(err) = app.load() {
        if err.is_auth_expired() {
            bail!(SESSION_EXPIRED);
        }
        return Err(err).context("failed to load tasks");
    }
    let mut ui = Ui::new(app, keybindings);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = tracing::subscriber::with_default(NoSubscriber::default(), || {
        run_event_loop(&mut terminal, &mut ui)
    });

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result?;
    match ui.exit_notice.take() {
        Some(notice) if notice == SESSION_EXPIRED => bail!(SESSION_EXPIRED),
        Some(notice) => {
            println!("{notice}");
            Ok(())
        }
        None => Ok(()),
    }
}

fn run_event_loop<S: TaskStore, T: TokenStore>(terminal: &mut Term, ui: &mut Ui<S, T>) -> Result<()> {
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(TUI_TICK_RATE_MS);

    loop {
        terminal.draw(|f| ui.draw(f))?;
        if ui.should_quit {
            break;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();

        if event::poll(timeout)? {
            let evt = event::read()?;
            if let CrosstermEvent::Key(key) = evt
                && let Some(action) = ui.handle_key(key)?
                && let Err(err) = handle_ui_action(terminal, ui, action)
            {
                ui.error(format!("editor failed: {err}"));
            }
        }

        if last_tick.elapsed() >= tick_rate {
            ui.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
