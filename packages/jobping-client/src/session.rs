//! Session credential lifecycle.
//!
//! The [`SessionStore`] is the only owner of the bearer token. It holds the
//! current value in memory and mirrors it into a durable [`CredentialStore`]
//! so the session survives process restarts. Persistence is best-effort: a
//! failed write forfeits cross-restart persistence but never fails the
//! operation that set the token.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Durable slot for the session token.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted token, if any. Absence means unauthenticated.
    fn load(&self) -> Option<String>;

    /// Persist the token, replacing any previous value.
    fn store(&self, token: &str) -> io::Result<()>;

    /// Remove the persisted token. Removing an absent token is fine.
    fn clear(&self) -> io::Result<()>;
}

/// Token persisted as a single file under the user's config directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/jobping/token`, e.g. `~/.config/jobping/token`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobping")
            .join("token")
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(token.to_string())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-memory slot shared across clones. Lets tests reconstruct a
/// [`SessionStore`] over the same slot to simulate a process restart.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.slot.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// Holds the current session token and its derived authentication state.
pub struct SessionStore {
    token: Mutex<Option<String>>,
    storage: Arc<dyn CredentialStore>,
}

impl SessionStore {
    /// Build a store over a durable slot, hydrating the in-memory token from
    /// it exactly once. An empty slot yields an unauthenticated session.
    pub fn new(storage: Arc<dyn CredentialStore>) -> Self {
        let token = storage.load();
        Self {
            token: Mutex::new(token),
            storage,
        }
    }

    /// Replace the session token. `Some` persists the new value, `None`
    /// clears memory and the durable slot. Persistence failures are logged
    /// and swallowed here; they only cost cross-restart persistence.
    pub fn set_token(&self, token: Option<String>) {
        let result = match &token {
            Some(value) => self.storage.store(value),
            None => self.storage.clear(),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist session token");
        }
        *self.token.lock().unwrap() = token;
    }

    /// The current token, if one is held.
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// True iff a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }
}
