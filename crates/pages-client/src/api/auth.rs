use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Authenticated session context attached to every backend call.
///
/// How the token is obtained (login, OAuth) is handled elsewhere; this only
/// carries and persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Get the path to the session file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pages");

        Ok(config_dir.join("session.json"))
    }

    /// Load the session from the default location
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .context("Could not read session file")?;

        let session: Self = serde_json::from_str(&contents)
            .context("Could not parse session file")?;

        Ok(Some(session))
    }

    /// Save the session to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context("Could not create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self)
            .context("Could not serialize session")?;

        fs::write(path, contents)
            .context("Could not write session file")?;

        Ok(())
    }

    /// Delete the stored session
    pub fn delete() -> Result<()> {
        Self::delete_at(&Self::default_path()?)
    }

    pub fn delete_at(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .context("Could not delete session file")?;
        }

        Ok(())
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
