//! Session token cache
//!
//! Resolves a session id to a private per-session file and stores the
//! client's auth token there. Purely a credential-cache convenience: it never
//! sees share material and sits outside the coordinator.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use zeroize::Zeroizing;

/// Directory under the root that holds per-session files
const SESSIONS_DIR: &str = "sessions";

/// Root of the per-session token files
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the token file for `session`, creating missing parent
    /// directories owner-only
    ///
    /// # Errors
    /// Returns an error if the session id is not a single plain path
    /// component or the directories cannot be created
    pub fn token_path(&self, session: &str) -> Result<PathBuf> {
        validate_session_id(session)?;
        let dir = self.root.join(SESSIONS_DIR);
        create_private_dir(&dir)?;
        Ok(dir.join(session))
    }

    /// Token cache for `session`
    ///
    /// # Errors
    /// See [`SessionStore::token_path`]
    pub fn cache(&self, session: &str) -> Result<TokenCache> {
        Ok(TokenCache {
            path: self.token_path(session)?,
        })
    }
}

/// Token file for one session
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached token, `None` when nothing is stored
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read
    pub fn get(&self) -> Result<Option<Zeroizing<String>>> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Ok(Some(Zeroizing::new(token.trim_end().to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read token {}", self.path.display()))
            }
        }
    }

    /// Stores `token`, replacing any previous one; the file is owner-only
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn store(&self, token: &str) -> Result<()> {
        let mut file = private_file(&self.path)
            .with_context(|| format!("Failed to open token {}", self.path.display()))?;
        file.write_all(token.trim_end().as_bytes())
            .with_context(|| format!("Failed to write token {}", self.path.display()))?;
        debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    /// Removes the cached token; erasing a missing token succeeds
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed
    pub fn erase(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session token erased");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to erase token {}", self.path.display()))
            }
        }
    }
}

/// Checks that `session` is a single plain path component
///
/// # Errors
/// Returns an error describing why the id is unusable
pub fn validate_session_id(session: &str) -> Result<()> {
    if session.is_empty() {
        bail!("Session id is empty");
    }
    if session == "." || session == ".." {
        bail!("Session id must not be a relative directory");
    }
    if session.contains(['/', '\\', '\0']) {
        bail!("Session id must not contain path separators");
    }
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
        .with_context(|| format!("Failed to create session directory {}", dir.display()))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create session directory {}", dir.display()))
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
