//! Authentication context: bearer token plus the signed-in user's profile.
//!
//! A [`Session`] is created once (restored from its [`SessionStore`]) and
//! handed to the API client; nothing else reads the token. It is initialised
//! on login and torn down on logout or when the server rejects the token.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::User;

/// What gets persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    pub user: User,
}

impl StoredSession {
    /// The local authentication predicate: a token, an admin role, an active account.
    pub fn is_valid(&self) -> bool {
        !self.access_token.trim().is_empty() && self.user.is_admin() && self.user.is_active
    }
}

/// Persistence backend for the session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file store, by default `<config_dir>/kasi/session.json`.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kasi").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let content = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

/// Process-local store, used by tests and one-shot tooling.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.inner.lock().map_err(|_| anyhow::anyhow!("Session lock poisoned"))?.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.inner.lock().map_err(|_| anyhow::anyhow!("Session lock poisoned"))? =
            Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().map_err(|_| anyhow::anyhow!("Session lock poisoned"))? = None;
        Ok(())
    }
}

/// Shared authentication context. Cloning shares the same state.
#[derive(Clone)]
pub struct Session {
    current: Arc<RwLock<Option<StoredSession>>>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// An empty (signed-out) session backed by `store`.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    /// Load the persisted session. Unreadable or invalid data is cleared,
    /// leaving the session signed out.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let session = Self::new(store);
        match session.store.load() {
            Ok(Some(stored)) if stored.is_valid() => session.set(Some(stored)),
            Ok(Some(_)) => {
                tracing::warn!("Stored session is not an active admin session; clearing it");
                session.teardown();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored session; clearing it");
                session.teardown();
            }
        }
        session
    }

    fn set(&self, value: Option<StoredSession>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = value;
    }

    fn get(&self) -> Option<StoredSession> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Initialise the session after a successful login.
    ///
    /// Rejects non-admin and deactivated accounts without touching the
    /// current state.
    pub fn establish(&self, access_token: String, user: User) -> Result<(), ApiError> {
        if !user.is_admin() {
            return Err(ApiError::Unauthenticated(
                "Access denied. Only administrators can sign in.".to_string(),
            ));
        }
        if !user.is_active {
            return Err(ApiError::Unauthenticated(
                "Access denied. Your administrator account is disabled.".to_string(),
            ));
        }
        let stored = StoredSession { access_token, user };
        if let Err(e) = self.store.save(&stored) {
            tracing::warn!(error = %e, "Session could not be persisted; it will last for this run only");
        }
        self.set(Some(stored));
        Ok(())
    }

    /// Drop the in-memory and persisted session.
    pub fn teardown(&self) {
        self.set(None);
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some_and(|s| s.is_valid())
    }

    pub fn current_user(&self) -> Option<User> {
        self.get().map(|s| s.user)
    }

    /// Token for a protected request. Fails (and tears down any stale state)
    /// when the local predicate does not hold.
    pub fn bearer_token(&self) -> Result<String, ApiError> {
        match self.get() {
            Some(stored) if stored.is_valid() => Ok(stored.access_token),
            Some(_) => {
                self.teardown();
                Err(ApiError::Unauthenticated(
                    "Session is no longer valid. Run `kasi login` again.".to_string(),
                ))
            }
            None => Err(ApiError::Unauthenticated(
                "No active session. Run `kasi login` first.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn admin(active: bool) -> User {
        User {
            id: Some("u1".into()),
            email: "admin@kasi.market".into(),
            full_name: "Admin".into(),
            role: "admin".into(),
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_establish_and_bearer_token() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        session.establish("tok".into(), admin(true)).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.bearer_token().unwrap(), "tok");
        assert_eq!(session.current_user().unwrap().email, "admin@kasi.market");
    }

    #[test]
    fn test_establish_rejects_non_admin() {
        let session = Session::in_memory();
        let mut customer = admin(true);
        customer.role = "user".into();
        let err = session.establish("tok".into(), customer).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_establish_rejects_inactive_admin() {
        let session = Session::in_memory();
        let err = session.establish("tok".into(), admin(false)).unwrap_err();
        assert!(err.user_message().contains("disabled"));
    }

    #[test]
    fn test_bearer_token_without_session_fails() {
        let session = Session::in_memory();
        assert!(matches!(
            session.bearer_token(),
            Err(ApiError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_teardown_clears_state() {
        let session = Session::in_memory();
        session.establish("tok".into(), admin(true)).unwrap();
        let shared = session.clone();
        shared.teardown();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_file_store_round_trip_and_restore() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/session.json");
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&path));
        let session = Session::new(store.clone());
        session.establish("tok-file".into(), admin(true)).unwrap();
        assert!(path.exists());

        let restored = Session::restore(store);
        assert_eq!(restored.bearer_token().unwrap(), "tok-file");
    }

    #[test]
    fn test_restore_clears_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let restored = Session::restore(Arc::new(FileSessionStore::new(&path)));
        assert!(!restored.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_restore_clears_inactive_user() {
        let store = Arc::new(MemorySessionStore::default());
        store
            .save(&StoredSession {
                access_token: "tok".into(),
                user: admin(false),
            })
            .unwrap();
        let restored = Session::restore(store.clone());
        assert!(!restored.is_authenticated());
        assert!(store.load().unwrap().is_none());
    }
}
