use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use docket_store_http::HttpStore;
use serde::Deserialize;
use url::Url;

const CONFIG_DIR: &str = "docket";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "token";

/// Environment variable overriding `server.base_url`.
pub const SERVER_URL_ENV: &str = "DOCKET_SERVER_URL";

/// Client configuration loaded from `~/.config/docket/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientConfig {
    /// Task server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[server]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Root URL of the task server.
    #[serde(default = "ServerConfig::default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "ServerConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:5000".into()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

/// `[session]` block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    /// Where the session token is kept. Defaults to the config directory.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

/// Default location of the configuration file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl ClientConfig {
    /// Load the configuration from the default path, then apply the environment.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        let config = match default_config_path() {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.with_server_override(env::var(SERVER_URL_ENV).ok().as_deref())
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the server URL when `url` is given.
    ///
    /// # Errors
    /// Returns an error when the resulting configuration is invalid.
    pub fn with_server_override(mut self, url: Option<&str>) -> Result<Self> {
        if let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) {
            url.clone_into(&mut self.server.base_url);
            self.validate()?;
        }
        Ok(self)
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    /// Location of the session token file.
    #[must_use]
    pub fn token_path(&self) -> Option<PathBuf> {
        self.session
            .token_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(TOKEN_FILE)))
    }

    /// Build an HTTP store for the configured server.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn http_store(&self) -> Result<HttpStore> {
        HttpStore::new(&self.server.base_url, self.timeout())
            .with_context(|| format!("failed to set up client for {}", self.server.base_url))
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.server.base_url)
            .with_context(|| format!("server.base_url is not a valid URL: {}", self.server.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server.base_url must use http or https: {}", self.server.base_url);
        }
        if self.server.timeout_secs == 0 {
            bail!("server.timeout_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf> {
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ClientConfig::from_path(&dir.path().join("absent.toml"))?;
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.session.token_file.is_none());
        Ok(())
    }

    #[test]
    fn reads_server_and_session_blocks() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            r#"
[server]
base_url = "https://tasks.example.invalid"
timeout_secs = 5

[session]
token_file = "/tmp/docket-token"

[tui.keybindings.task_list]
quit = ["q"]
"#,
        )?;
        let config = ClientConfig::from_path(&path)?;
        assert_eq!(config.server.base_url, "https://tasks.example.invalid");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/docket-token")));
        Ok(())
    }

    #[test]
    fn rejects_non_http_urls() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(&dir, "[server]\nbase_url = \"ftp://example.invalid\"\n")?;
        let err = ClientConfig::from_path(&path)
            .err()
            .unwrap_or_else(|| panic!("ftp must be rejected"));
        assert!(err.to_string().contains("http or https"));
        Ok(())
    }

    #[test]
    fn rejects_zero_timeout() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(&dir, "[server]\ntimeout_secs = 0\n")?;
        assert!(ClientConfig::from_path(&path).is_err());
        Ok(())
    }

    #[test]
    fn reports_parse_errors_with_path() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(&dir, "[server\n")?;
        let err = ClientConfig::from_path(&path)
            .err()
            .unwrap_or_else(|| panic!("broken toml must fail"));
        assert!(err.to_string().contains("failed to parse"));
        Ok(())
    }

    #[test]
    fn override_replaces_url_and_is_validated() -> Result<()> {
        let config = ClientConfig::default().with_server_override(Some("http://10.0.0.2:8080"))?;
        assert_eq!(config.server.base_url, "http://10.0.0.2:8080");
        let unchanged = ClientConfig::default().with_server_override(Some("  "))?;
        assert_eq!(unchanged.server.base_url, "http://127.0.0.1:5000");
        assert!(ClientConfig::default().with_server_override(Some("nope")).is_err());
        Ok(())
    }
}
