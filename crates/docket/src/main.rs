//! CLI entry point for docket.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use commands::TaskService;
use docket_app::{ClientConfig, FileTokenStore, SessionGate, local_today};

mod commands;
mod config;
mod tui;

/// Personal tasks with Today, Important and Planned views.
#[derive(Parser, Debug)]
#[command(
    name = "docket",
    version,
    about = "docket: a task list client with filtered views and manual ordering"
)]
struct Cli {
    /// Task server URL. Beats DOCKET_SERVER_URL and the config file.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account on the task server.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DOCKET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and keep the session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "DOCKET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// List the tasks of a view.
    Ls {
        /// Today, important, planned, completed or all.
        #[arg(long, default_value = "all")]
        view: String,
        /// Planned sub-filter: all, today, tomorrow, overdue, week.
        #[arg(long)]
        when: Option<String>,
        /// Planned tasks due on this day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Create a task. The view decides default fields.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "all")]
        view: String,
        /// Due day (YYYY-MM-DD).
        #[arg(long)]
        due: Option<String>,
    },

    /// Toggle the completed flag of a task.
    Done { id: String },

    /// Toggle the important flag of a task.
    Star { id: String },

    /// Change title, description or due day of a task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task.
    Rm { id: String },

    /// Move a task within a view (1-based positions).
    Mv {
        #[arg(long, default_value = "all")]
        view: String,
        #[arg(long)]
        when: Option<String>,
        #[arg(long)]
        date: Option<String>,
        from: usize,
        to: usize,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },

    /// Launch interactive terminal UI.
    Tui,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default keybindings to the config file.
    Init {
        /// Output path (defaults to the config directory).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Overwrite without asking.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { server, cmd } = Cli::parse();

    if should_install_tracing(&cmd) {
        install_tracing();
    }

    let config = ClientConfig::load()?.with_server_override(server.as_deref())?;
    execute_command(&config, cmd)
}

fn execute_command(config: &ClientConfig, command: Command) -> Result<()> {
    if let Command::Config {
        cmd: ConfigCommand::Init { output, force },
    } = command
    {
        return config::init_keybindings(output.as_deref(), force);
    }

    let token_path = config
        .token_path()
        .context("could not determine where to keep the session token")?;
    let gate = SessionGate::load(FileTokenStore::new(token_path))?;
    let mut store = config.http_store()?;
    store.set_token(gate.token().map(str::to_owned));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match command {
        Command::Tui => tui::run(store, gate, runtime),
        auth @ (Command::Register { .. } | Command::Login { .. } | Command::Logout) => {
            let mut gate = gate;
            runtime.block_on(commands::auth::run(auth, &store, &mut gate, &mut io::stdout().lock()))
        }
        other => {
            let mut service = TaskService::new(store, gate, local_today());
            runtime.block_on(commands::run(other, &mut service, &mut io::stdout().lock()))
        }
    }
}

const fn should_install_tracing(cmd: &Command) -> bool {
    !matches!(cmd, Command::Tui)
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO otherwise.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "docket",
            "--server",
            "http://127.0.0.1:9000",
            "add",
            "--title",
            "Buy milk",
            "--view",
            "today",
        ]);

        assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:9000"));
        match cli.cmd {
            Command::Add {
                title,
                view,
                description,
                due,
            } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(view, "today");
                assert!(description.is_none());
                assert!(due.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_ls_with_planned_filter() {
        let cli = Cli::parse_from([
            "docket", "ls", "--view", "planned", "--when", "overdue", "--format", "json",
        ]);
        match cli.cmd {
            Command::Ls {
                view, when, format, ..
            } => {
                assert_eq!(view, "planned");
                assert_eq!(when.as_deref(), Some("overdue"));
                assert_eq!(format, LsFormat::Json);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_mv_positions() {
        let cli = Cli::parse_from(["docket", "mv", "--view", "important", "3", "1"]);
        match cli.cmd {
            Command::Mv { view, from, to, .. } => {
                assert_eq!(view, "important");
                assert_eq!((from, to), (3, 1));
            }
            _ => panic!("expected mv command"),
        }
    }

    #[test]
    fn edit_rejects_due_with_clear_due() {
        let result = Cli::try_parse_from(["docket", "edit", "4", "--due", "2025-03-01", "--clear-due"]);
        assert!(result.is_err());
    }

    #[test]
    fn server_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["docket", "whoami", "--server", "http://example.invalid"]);
        assert_eq!(cli.server.as_deref(), Some("http://example.invalid"));
        assert!(matches!(cli.cmd, Command::Whoami));
    }

    #[test]
    fn parse_config_init() {
        let cli = Cli::parse_from(["docket", "config", "init", "--force"]);
        match cli.cmd {
            Command::Config {
                cmd: ConfigCommand::Init { output, force },
            } => {
                assert!(output.is_none());
                assert!(force);
            }
            _ => panic!("expected config init"),
        }
    }

    #[test]
    fn skips_tracing_in_tui_mode() {
        assert!(!should_install_tracing(&Command::Tui));
    }

    #[test]
    fn installs_tracing_for_other_commands() {
        assert!(should_install_tracing(&Command::Whoami));
    }
}
