//! Keybindings configuration for the TUI.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

macro_rules! vec_of_strings {
    ($($s:expr),* $(,)?) => {
        vec![$($s.to_string()),*]
    };
}

/// The `[tui]` part of `config.toml`. Other tables are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// TUI configuration.
    #[serde(default)]
    pub tui: TuiConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Keybindings configuration.
    #[serde(default)]
    pub keybindings: KeyBindingsConfig,
}

/// Keybindings for every TUI mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindingsConfig {
    /// Browsing the task list.
    pub task_list: TaskListKeyBindings,
    /// Moving a grabbed task to its new slot.
    pub grab: GrabKeyBindings,
    /// Yes/no prompts such as delete confirmation.
    pub confirm: ConfirmKeyBindings,
}

/// Keybindings for the task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskListKeyBindings {
    pub quit: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
    pub next_view: Vec<String>,
    pub prev_view: Vec<String>,
    pub show_today: Vec<String>,
    pub show_important: Vec<String>,
    pub show_planned: Vec<String>,
    pub show_completed: Vec<String>,
    pub show_all: Vec<String>,
    pub toggle_completed: Vec<String>,
    pub toggle_important: Vec<String>,
    pub create_task: Vec<String>,
    pub edit_task: Vec<String>,
    pub delete_task: Vec<String>,
    pub refresh: Vec<String>,
    /// Cycle the Planned sub-filter.
    pub cycle_planned: Vec<String>,
    /// Type a day for the Planned view.
    pub pick_date: Vec<String>,
    /// Pick up the selected task for reordering.
    pub grab: Vec<String>,
    pub logout: Vec<String>,
}

/// Keybindings while a task is grabbed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabKeyBindings {
    pub down: Vec<String>,
    pub up: Vec<String>,
    /// Put the task at the current slot.
    pub drop: Vec<String>,
    /// Put the task back where it was.
    pub cancel: Vec<String>,
}

/// Keybindings for confirmation prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmKeyBindings {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for TaskListKeyBindings {
    fn default() -> Self {
        Self {
            quit: vec_of_strings!["q", "Esc"],
            down: vec_of_strings!["j", "Down"],
            up: vec_of_strings!["k", "Up"],
            next_view: vec_of_strings!["Tab", "l", "Right"],
            prev_view: vec_of_strings!["BackTab", "h", "Left"],
            show_today: vec_of_strings!["1"],
            show_important: vec_of_strings!["2"],
            show_planned: vec_of_strings!["3"],
            show_completed: vec_of_strings!["4"],
            show_all: vec_of_strings!["5"],
            toggle_completed: vec_of_strings!["x", "Space"],
            toggle_important: vec_of_strings!["s", "*"],
            create_task: vec_of_strings!["n", "a"],
            edit_task: vec_of_strings!["e", "Enter"],
            delete_task: vec_of_strings!["d", "Delete"],
            refresh: vec_of_strings!["r"],
            cycle_planned: vec_of_strings!["f"],
            pick_date: vec_of_strings!["c"],
            grab: vec_of_strings!["m", "g"],
            logout: vec_of_strings!["Ctrl+o"],
        }
    }
}

impl Default for GrabKeyBindings {
    fn default() -> Self {
        Self {
            down: vec_of_strings!["j", "Down"],
            up: vec_of_strings!["k", "Up"],
            drop: vec_of_strings!["Enter", "m", "g", "Space"],
            cancel: vec_of_strings!["Esc", "q"],
        }
    }
}

impl Default for ConfirmKeyBindings {
    fn default() -> Self {
        Self {
            confirm: vec_of_strings!["y", "Enter"],
            cancel: vec_of_strings!["n", "Esc", "q"],
        }
    }
}

/// Returns the configuration file path shared with the client settings.
pub fn default_config_path() -> Option<PathBuf> {
    docket_app::config::default_config_path()
}

/// Default keybindings as a commented TOML document.
pub fn generate_default_config_toml() -> Result<String> {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).context("failed to serialize default keybindings")?;

    let header = r#"# docket configuration
#
# [server]
# base_url = "http://127.0.0.1:5000"
# timeout_secs = 30
#
# [session]
# token_file = "/path/to/token"
#
# [tui.keybindings]
# Each action can have multiple key bindings. Actions left out keep
# their defaults.
#
# Supported key formats:
# - Single characters: "j", "k", "*", "1"
# - Special keys: "Enter", "Esc", "Tab", "BackTab", "Space", "Backspace", "Delete"
# - Arrow keys: "Up", "Down", "Left", "Right"
# - Navigation keys: "Home", "End", "PageUp", "PageDown"
# - Modified keys: "Ctrl+o", "Alt+k", "Shift+Up"

"#;

    Ok(format!("{header}{toml_str}"))
}

/// Load the `[tui]` table from `path`, or the default path when `None`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Parse a key string into a `KeyEvent`.
///
/// # Examples
/// - "j" -> `KeyCode::Char('j')`
/// - "Enter" -> `KeyCode::Enter`
/// - "Ctrl+o" -> `KeyCode::Char('o')` with CONTROL modifier
pub fn parse_key(s: &str) -> Result<KeyEvent> {
    if s.is_empty() {
        bail!("Empty key string");
    }
    // A lone "+" is a key, not a separator.
    if s == "+" {
        return Ok(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE));
    }

    let parts: Vec<&str> = s.split('+').collect();
    let (key_part, modifier_parts) = parts
        .split_last()
        .ok_or_else(|| anyhow!("Empty key string"))?;

    let mut modifiers = KeyModifiers::NONE;
    for &modifier in modifier_parts {
        match modifier {
            "Ctrl" | "Control" => modifiers |= KeyModifiers::CONTROL,
            "Alt" => modifiers |= KeyModifiers::ALT,
            "Shift" => modifiers |= KeyModifiers::SHIFT,
            other => bail!("Unknown modifier: {other}"),
        }
    }

    let code = parse_key_code(key_part)?;
    Ok(KeyEvent::new(code, modifiers))
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    match s {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Tab" => Ok(KeyCode::Tab),
        "BackTab" => Ok(KeyCode::BackTab),
        "Space" => Ok(KeyCode::Char(' ')),
        "Delete" => Ok(KeyCode::Delete),
        "Insert" => Ok(KeyCode::Insert),
        s if s.chars().count() == 1 => {
            let ch = s.chars().next().ok_or_else(|| anyhow!("Empty char"))?;
            Ok(KeyCode::Char(ch))
        }
        other => bail!("Unknown key: {other}"),
    }
}

/// Validate the TUI configuration.
///
/// Checks for:
/// - Empty key bindings
/// - Invalid key expressions
/// - Key conflicts within each view
pub fn validate_tui_config(config: &TuiConfig) -> Result<()> {
    validate_keybindings_config(&config.keybindings)
}

/// Validate the keybindings configuration.
pub fn validate_keybindings_config(config: &KeyBindingsConfig) -> Result<()> {
    for view in ViewType::ALL {
        let bindings = config.bindings(view);
        for (_, name, keys) in &bindings {
            if keys.is_empty() {
                bail!("{}.{name} must have at least one key binding", view.section());
            }
            for key in *keys {
                parse_key(key)
                    .with_context(|| format!("Invalid key '{key}' in {}.{name}", view.section()))?;
            }
        }
        validate_view_keybindings(view, &bindings)?;
    }
    Ok(())
}

fn validate_view_keybindings(view: ViewType, bindings: &[Binding<'_>]) -> Result<()> {
    let mut key_to_actions: HashMap<KeyEvent, Vec<&str>> = HashMap::new();
    for (_, name, keys) in bindings {
        for key in *keys {
            let event = normalize(parse_key(key)?);
            key_to_actions.entry(event).or_default().push(*name);
        }
    }

    let mut conflicts: Vec<_> = key_to_actions
        .into_iter()
        .filter(|(_, actions)| actions.len() > 1)
        .collect();
    conflicts.sort_by(|a, b| a.1.cmp(&b.1));
    if let Some((key, actions)) = conflicts.first() {
        bail!(
            "Key '{}' is bound to multiple actions in {}: {}",
            describe_event(key),
            view.section(),
            actions.join(", ")
        );
    }
    Ok(())
}

/// Input mode a key is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    /// Browsing the task list.
    TaskList,
    /// Moving a grabbed task.
    Grab,
    /// Answering a yes/no prompt.
    Confirm,
}

impl ViewType {
    const ALL: [Self; 3] = [Self::TaskList, Self::Grab, Self::Confirm];

    const fn section(self) -> &'static str {
        match self {
            Self::TaskList => "task_list",
            Self::Grab => "grab",
            Self::Confirm => "confirm",
        }
    }
}

/// Action that can be performed in a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Down,
    Up,
    NextView,
    PrevView,
    ShowToday,
    ShowImportant,
    ShowPlanned,
    ShowCompleted,
    ShowAll,
    ToggleCompleted,
    ToggleImportant,
    CreateTask,
    EditTask,
    DeleteTask,
    Refresh,
    CyclePlanned,
    PickDate,
    Grab,
    Logout,
    Drop,
    Cancel,
    Confirm,
}

type Binding<'a> = (Action, &'static str, &'a Vec<String>);

impl KeyBindingsConfig {
    fn bindings(&self, view: ViewType) -> Vec<Binding<'_>> {
        match view {
            ViewType::TaskList => {
                let t = &self.task_list;
                vec![
                    (Action::Quit, "quit", &t.quit),
                    (Action::Down, "down", &t.down),
                    (Action::Up, "up", &t.up),
                    (Action::NextView, "next_view", &t.next_view),
                    (Action::PrevView, "prev_view", &t.prev_view),
                    (Action::ShowToday, "show_today", &t.show_today),
                    (Action::ShowImportant, "show_important", &t.show_important),
                    (Action::ShowPlanned, "show_planned", &t.show_planned),
                    (Action::ShowCompleted, "show_completed", &t.show_completed),
                    (Action::ShowAll, "show_all", &t.show_all),
                    (Action::ToggleCompleted, "toggle_completed", &t.toggle_completed),
                    (Action::ToggleImportant, "toggle_important", &t.toggle_important),
                    (Action::CreateTask, "create_task", &t.create_task),
                    (Action::EditTask, "edit_task", &t.edit_task),
                    (Action::DeleteTask, "delete_task", &t.delete_task),
                    (Action::Refresh, "refresh", &t.refresh),
                    (Action::CyclePlanned, "cycle_planned", &t.cycle_planned),
                    (Action::PickDate, "pick_date", &t.pick_date),
                    (Action::Grab, "grab", &t.grab),
                    (Action::Logout, "logout", &t.logout),
                ]
            }
            ViewType::Grab => vec![
                (Action::Down, "down", &self.grab.down),
                (Action::Up, "up", &self.grab.up),
                (Action::Drop, "drop", &self.grab.drop),
                (Action::Cancel, "cancel", &self.grab.cancel),
            ],
            ViewType::Confirm => vec![
                (Action::Confirm, "confirm", &self.confirm.confirm),
                (Action::Cancel, "cancel", &self.confirm.cancel),
            ],
        }
    }

    /// Help line for `view`.
    pub fn generate_help_text(&self, view: ViewType) -> String {
        match view {
            ViewType::TaskList => {
                let t = &self.task_list;
                format!(
                    "{}:move {}:view 1-5:jump {}:done {}:star {}:new {}:edit {}:delete {}:reorder {}:when {}:date {}:reload {}:logout {}:quit",
                    self.format_key_pair(&t.down, &t.up),
                    self.format_key_pair(&t.next_view, &t.prev_view),
                    self.format_first_key(&t.toggle_completed),
                    self.format_first_key(&t.toggle_important),
                    self.format_first_key(&t.create_task),
                    self.format_first_key(&t.edit_task),
                    self.format_first_key(&t.delete_task),
                    self.format_first_key(&t.grab),
                    self.format_first_key(&t.cycle_planned),
                    self.format_first_key(&t.pick_date),
                    self.format_first_key(&t.refresh),
                    self.format_first_key(&t.logout),
                    self.format_first_key(&t.quit),
                )
            }
            ViewType::Grab => format!(
                "{}:move slot {}:drop {}:cancel",
                self.format_key_pair(&self.grab.down, &self.grab.up),
                self.format_first_key(&self.grab.drop),
                self.format_first_key(&self.grab.cancel),
            ),
            ViewType::Confirm => format!(
                "{}:yes {}:no",
                self.format_first_key(&self.confirm.confirm),
                self.format_first_key(&self.confirm.cancel),
            ),
        }
    }

    fn format_first_key(&self, keys: &[String]) -> String {
        keys.first()
            .map_or_else(|| "?".to_string(), |k| self.format_key_display(k))
    }

    fn format_key_pair(&self, first: &[String], second: &[String]) -> String {
        format!("{}/{}", self.format_first_key(first), self.format_first_key(second))
    }

    #[allow(clippy::unused_self)]
    fn format_key_display(&self, key: &str) -> String {
        match key {
            "Enter" => "↵".to_string(),
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Left" => "←".to_string(),
            "Right" => "→".to_string(),
            "Backspace" => "BS".to_string(),
            "Delete" => "Del".to_string(),
            "BackTab" => "S-Tab".to_string(),
            "PageUp" => "PgUp".to_string(),
            "PageDown" => "PgDn".to_string(),
            other if other.starts_with("Ctrl+") || other.starts_with("Alt+") => other.replace('+', "-"),
            other => other.to_string(),
        }
    }

    /// First action in `view` that `key` is bound to.
    pub fn action_for(&self, view: ViewType, key: &KeyEvent) -> Option<Action> {
        let actual = normalize(*key);
        self.bindings(view)
            .into_iter()
            .find(|(_, _, keys)| {
                keys.iter()
                    .filter_map(|key_str| parse_key(key_str).ok())
                    .any(|expected| normalize(expected) == actual)
            })
            .map(|(action, _, _)| action)
    }
}

/// Strip what terminals disagree on: SHIFT on printable characters and
/// event kind/state flags.
fn normalize(event: KeyEvent) -> KeyEvent {
    let mut modifiers = event.modifiers;
    if matches!(event.code, KeyCode::Char(_)) {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    if event.code == KeyCode::BackTab {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    KeyEvent::new(event.code, modifiers)
}

fn describe_event(event: &KeyEvent) -> String {
    let mut prefix = String::new();
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        prefix.push_str("Ctrl+");
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        prefix.push_str("Alt+");
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) {
        prefix.push_str("Shift+");
    }
    let key = match event.code {
        KeyCode::Char(' ') => "Space".to_owned(),
        KeyCode::Char(ch) => ch.to_string(),
        other => format!("{other:?}"),
    };
    format!("{prefix}{key}")
}
