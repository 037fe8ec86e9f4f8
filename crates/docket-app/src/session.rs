//! Session state and the auth gate that guards protected calls.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use docket_core::UserProfile;
use tracing::{info, warn};

use crate::error::StoreError;

/// Persistence for the session token.
pub trait TokenStore {
    /// Stored token, if any.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error when the token cannot be written.
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the stored token.
    ///
    /// # Errors
    /// Returns an error when the token cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// Token kept in a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let token = raw.trim();
        Ok((!token.is_empty()).then(|| token.to_owned()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, token).with_context(|| format!("failed to write {}", self.path.display()))?;
        restrict_permissions(&self.path)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Token kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Store that starts out holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Who the client is acting as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No token; protected views redirect to login.
    #[default]
    Anonymous,
    /// Token accepted at login.
    Authenticated {
        /// Session token sent with every protected call.
        token: String,
        /// Profile, once fetched.
        profile: Option<UserProfile>,
    },
}

/// Owns the session and its persisted token.
#[derive(Debug)]
pub struct SessionGate<T> {
    tokens: T,
    session: Session,
}

impl<T: TokenStore> SessionGate<T> {
    /// Restore the session from `tokens`.
    ///
    /// # Errors
    /// Returns an error when the token storage cannot be read.
    pub fn load(tokens: T) -> Result<Self> {
        let session = match tokens.load()? {
            Some(token) => Session::Authenticated { token, profile: None },
            None => Session::Anonymous,
        };
        Ok(Self { tokens, session })
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns true when a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated { .. })
    }

    /// Token of the current session.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match &self.session {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    /// Profile of the current session, once fetched.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match &self.session {
            Session::Authenticated { profile, .. } => profile.as_ref(),
            Session::Anonymous => None,
        }
    }

    /// Token for a protected call.
    ///
    /// # Errors
    /// Returns [`StoreError::AuthExpired`] when no session is active.
    pub fn require_token(&self) -> Result<&str, StoreError> {
        self.token().ok_or(StoreError::AuthExpired)
    }

    /// Persist `token` and enter the authenticated state.
    ///
    /// # Errors
    /// Returns an error when the token cannot be persisted.
    pub fn login(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.tokens.save(&token)?;
        self.session = Session::Authenticated { token, profile: None };
        info!("session started");
        Ok(())
    }

    /// Attach the fetched profile. Ignored while anonymous.
    pub fn set_profile(&mut self, user: UserProfile) {
        if let Session::Authenticated { profile, .. } = &mut self.session {
            *profile = Some(user);
        }
    }

    /// Forget the token and return to the anonymous state.
    ///
    /// # Errors
    /// Returns an error when the stored token cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.session = Session::Anonymous;
        self.tokens.clear()?;
        info!("session cleared");
        Ok(())
    }

    /// Pass `result` through, logging out when it reports an expired session.
    ///
    /// # Errors
    /// Returns the original error unchanged.
    pub fn check<R>(&mut self, result: Result<R, StoreError>) -> Result<R, StoreError> {
        if let Err(StoreError::AuthExpired) = &result {
            warn!("session rejected; logging out");
            if let Err(err) = self.logout() {
                warn!("failed to clear stored token: {err:#}");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_gate(dir: &TempDir) -> SessionGate<FileTokenStore> {
        SessionGate::load(FileTokenStore::new(dir.path().join("docket").join("token")))
            .unwrap_or_else(|err| panic!("gate must load: {err}"))
    }

    #[test]
    fn starts_anonymous_without_token() -> Result<()> {
        let dir = TempDir::new()?;
        let gate = file_gate(&dir);
        assert_eq!(gate.session(), &Session::Anonymous);
        assert!(matches!(gate.require_token(), Err(StoreError::AuthExpired)));
        Ok(())
    }

    #[test]
    fn login_persists_token_across_loads() -> Result<()> {
        let dir = TempDir::new()?;
        let mut gate = file_gate(&dir);
        gate.login("tok")?;
        assert_eq!(gate.require_token().ok(), Some("tok"));

        let reloaded = file_gate(&dir);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.token(), Some("tok"));
        Ok(())
    }

    #[test]
    fn logout_removes_token_file() -> Result<()> {
        let dir = TempDir::new()?;
        let mut gate = file_gate(&dir);
        gate.login("tok")?;
        gate.logout()?;
        assert!(!gate.is_authenticated());
        assert!(!file_gate(&dir).is_authenticated());
        Ok(())
    }

    #[test]
    fn auth_expired_forces_logout() -> Result<()> {
        let mut gate = SessionGate::load(MemoryTokenStore::with_token("tok"))?;
        let result: Result<(), StoreError> = gate.check(Err(StoreError::AuthExpired));
        assert!(result.is_err());
        assert_eq!(gate.session(), &Session::Anonymous);
        assert!(gate.tokens.load()?.is_none());
        assert!(matches!(gate.require_token(), Err(StoreError::AuthExpired)));
        Ok(())
    }

    #[test]
    fn other_errors_keep_the_session() -> Result<()> {
        let mut gate = SessionGate::load(MemoryTokenStore::with_token("tok"))?;
        let result: Result<(), StoreError> = gate.check(Err(StoreError::Transport("down".into())));
        assert!(result.is_err());
        assert!(gate.is_authenticated());
        assert_eq!(gate.check(Ok(5))?, 5);
        Ok(())
    }

    #[test]
    fn profile_attaches_only_when_authenticated() -> Result<()> {
        let user = UserProfile {
            id: None,
            username: "ada".into(),
            email: "ada@example.invalid".into(),
        };
        let mut anonymous = SessionGate::load(MemoryTokenStore::default())?;
        anonymous.set_profile(user.clone());
        assert!(anonymous.profile().is_none());

        let mut gate = SessionGate::load(MemoryTokenStore::with_token("tok"))?;
        gate.set_profile(user);
        assert_eq!(gate.profile().map(|p| p.username.as_str()), Some("ada"));
        Ok(())
    }
}
