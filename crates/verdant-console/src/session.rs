//! Local session store.
//!
//! An explicit session object with a clear lifecycle: loaded on start, saved
//! on change, cleared on logout. This is the mock auth scheme the backend
//! contract assumes — credentials are compared client-side and stored in
//! plaintext. It is deliberately not a real credential store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Token value written on a successful login.
const MOCK_TOKEN: &str = "mock-token";

/// Persisted session fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// Mock auth token, present while logged in.
    #[serde(default)]
    pub token: Option<String>,

    /// Username of the logged-in user.
    #[serde(default)]
    pub username: Option<String>,

    /// Registered username (plaintext, mock auth).
    #[serde(default)]
    pub registered_user: Option<String>,

    /// Registered password (plaintext, mock auth).
    #[serde(default)]
    pub registered_pass: Option<String>,
}

/// A session file with load/save/login/logout lifecycle.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    /// The default session file path (`~/.config/verdant/session.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("verdant").join("session.toml"))
    }

    /// Load the session from a file, starting empty when the file does not
    /// exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse session file {}", path.display()))?
        } else {
            SessionData::default()
        };
        Ok(Self { path, data })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    /// Store a registered credential pair.
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            bail!("Username and password are required.");
        }
        self.data.registered_user = Some(username.to_string());
        self.data.registered_pass = Some(password.to_string());
        self.save()
    }

    /// Compare against the registered pair; on success store the mock token
    /// and username.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let matches = self.data.registered_user.as_deref() == Some(username)
            && self.data.registered_pass.as_deref() == Some(password);
        if !matches {
            bail!("Invalid username or password");
        }
        self.data.token = Some(MOCK_TOKEN.to_string());
        self.data.username = Some(username.to_string());
        self.save()
    }

    /// Clear the token and username; the registered pair is kept.
    pub fn logout(&mut self) -> Result<()> {
        self.data.token = None;
        self.data.username = None;
        self.save()
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.data.token.is_some()
    }

    /// The logged-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.data.username.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_in(dir: &tempfile::TempDir) -> Session {
        Session::load(dir.path().join("session.toml")).unwrap()
    }

    #[test]
    fn test_register_then_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        session.register("grower", "lettuce").unwrap();
        assert!(!session.is_authenticated());

        session.login("grower", "lettuce").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("grower"));
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        session.register("grower", "lettuce").unwrap();
        assert!(session.login("grower", "kale").is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_without_registration_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        assert!(session.login("anyone", "anything").is_err());
    }

    #[test]
    fn test_logout_keeps_registered_pair() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        session.register("grower", "lettuce").unwrap();
        session.login("grower", "lettuce").unwrap();
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(session.username(), None);
        // Re-login still works against the kept pair.
        session.login("grower", "lettuce").unwrap();
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_register_requires_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        assert!(session.register("  ", "x").is_err());
        assert!(session.register("grower", "").is_err());
    }

    #[test]
    fn test_session_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let mut session = Session::load(&path).unwrap();
        session.register("grower", "lettuce").unwrap();
        session.login("grower", "lettuce").unwrap();

        let reloaded = Session::load(&path).unwrap();
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.username(), Some("grower"));
    }
}
