//! TUI configuration for docket.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};

pub mod keybindings;

pub use keybindings::{Action, KeyBindingsConfig, ViewType};

/// Write the default configuration file.
pub fn init_keybindings(output: Option<&Path>, force: bool) -> Result<()> {
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => keybindings::default_config_path()
            .ok_or_else(|| anyhow!("could not determine the config directory"))?,
    };

    let mut stdout = io::stdout().lock();
    if output_path.exists() && !force && !confirm_overwrite(&output_path, &mut stdout)? {
        writeln!(stdout, "Aborted.")?;
        return Ok(());
    }
    write_default_config(&output_path)?;

    writeln!(stdout, "Wrote default configuration to {}", output_path.display())?;
    writeln!(stdout, "Restart `docket tui` to pick up keybinding changes.")?;
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let content = keybindings::generate_default_config_toml()?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn confirm_overwrite(path: &Path, out: &mut impl Write) -> Result<bool> {
    write!(out, "{} already exists. Overwrite? [y/N]: ", path.display())?;
    out.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
