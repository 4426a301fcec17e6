//! Session state: the access token and actor kind, mirrored to durable
//! storage on every change.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, RwLock};

use estate_core::auth::{ActorKind, Session};

use crate::error::{ClientError, Result};

/// Observable authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated(ActorKind),
    Anonymous,
}

impl AuthStatus {
    fn of(session: &Session) -> Self {
        match (&session.access_token, session.user_type) {
            (Some(_), Some(actor)) => AuthStatus::Authenticated(actor),
            _ => AuthStatus::Anonymous,
        }
    }
}

/// Durable storage for the session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Session>;
    async fn save(&self, session: &Session) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Session persisted as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| ClientError::Storage(format!("corrupt session file: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Session::default()),
            Err(e) => Err(ClientError::Storage(format!("read {}: {e}", self.path.display()))),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_vec(session)
            .map_err(|e| ClientError::Storage(format!("encode session: {e}")))?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| ClientError::Storage(format!("create {}: {e}", dir.display())))?;
            }
        }
        // write-then-rename keeps the previous file intact on a torn write
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| ClientError::Storage(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ClientError::Storage(format!("rename {}: {e}", self.path.display())))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!("remove {}: {e}", self.path.display()))),
        }
    }
}

/// Non-durable store, for tests and short-lived tools.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Session> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().await = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = Session::default();
        Ok(())
    }
}

/// Owns the in-memory session and writes every change through to the store.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    current: RwLock<Session>,
    status: watch::Sender<AuthStatus>,
}

impl SessionManager {
    /// Start anonymous, ignoring whatever the store holds.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (status, _) = watch::channel(AuthStatus::Anonymous);
        Self {
            store,
            current: RwLock::new(Session::default()),
            status,
        }
    }

    /// Resume the session persisted by a previous run. An unreadable store
    /// starts anonymous.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Self {
        let session = match store.load().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed; starting anonymous");
                Session::default()
            }
        };
        let (status, _) = watch::channel(AuthStatus::of(&session));
        Self {
            store,
            current: RwLock::new(session),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    pub async fn snapshot(&self) -> Session {
        self.current.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current.read().await.access_token.clone()
    }

    pub async fn actor(&self) -> Option<ActorKind> {
        self.current.read().await.user_type
    }

    /// Record a successful login.
    pub async fn establish(&self, access_token: impl Into<String>, actor: ActorKind) -> Result<()> {
        let session = Session::new(access_token, actor);
        self.store.save(&session).await?;
        *self.current.write().await = session;
        self.status.send_replace(AuthStatus::Authenticated(actor));
        tracing::info!(actor = %actor, "session established");
        Ok(())
    }

    /// Replace the access token after a refresh.
    pub async fn set_access_token(&self, access_token: impl Into<String>) -> Result<()> {
        let mut guard = self.current.write().await;
        let mut next = guard.clone();
        next.access_token = Some(access_token.into());
        self.store.save(&next).await?;
        *guard = next;
        let status = AuthStatus::of(&guard);
        drop(guard);
        self.status.send_replace(status);
        Ok(())
    }

    /// Forced logout. Never fails: a store error is logged and the in-memory
    /// session is cleared regardless.
    pub async fn terminate(&self) {
        *self.current.write().await = Session::default();
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.status.send_replace(AuthStatus::Anonymous);
        tracing::info!("session terminated");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[tokio::test]
    async fn file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let mgr = SessionManager::new(Arc::new(FileSessionStore::new(&path)));
        mgr.establish("tok-1", ActorKind::Owner).await.unwrap();
        mgr.set_access_token("tok-2").await.unwrap();

        let again = SessionManager::restore(Arc::new(FileSessionStore::new(&path))).await;
        assert_eq!(again.access_token().await.as_deref(), Some("tok-2"));
        assert_eq!(again.actor().await, Some(ActorKind::Owner));
        assert_eq!(again.status(), AuthStatus::Authenticated(ActorKind::Owner));
    }

    #[tokio::test]
    async fn terminate_clears_store_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(FileSessionStore::new(&path));

        let mgr = SessionManager::new(store.clone());
        mgr.establish("tok", ActorKind::Tenant).await.unwrap();
        let mut rx = mgr.subscribe();

        mgr.terminate().await;

        rx.changed().await.expect("status change");
        assert_eq!(*rx.borrow(), AuthStatus::Anonymous);
        assert!(mgr.snapshot().await.is_empty());
        assert!(!path.exists());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_restores_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let mgr = SessionManager::restore(Arc::new(FileSessionStore::new(&path))).await;
        assert_eq!(mgr.status(), AuthStatus::Anonymous);
        assert!(mgr.access_token().await.is_none());
    }
}
