use super::{Session, SessionId};
use crate::models::Asset;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// All live sessions. Each closure passed to `with`/`with_mut` runs one step of a
/// session to completion; a session is never borrowed across an await.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, Session>>,
    issued: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session watching `asset` and returns its id, e.g. "s-1"
    pub fn create(&self, asset: Asset) -> SessionId {
        let id = format!("s-{}", self.issued.fetch_add(1, Ordering::Relaxed) + 1);
        self.inner.insert(id.clone(), Session::new(id.clone(), asset));
        metrics::gauge!("desk_sessions_active").set(self.len() as f64);
        id
    }

    pub fn with<R>(&self, id: &str, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.inner.get(id).map(|r| f(r.value()))
    }

    pub fn with_mut<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.inner.get_mut(id).map(|mut r| f(r.value_mut()))
    }

    /// Hands `value` to session `id`, or gives it back if the session is gone.
    pub fn deliver<T, R>(
        &self,
        id: &str,
        value: T,
        f: impl FnOnce(&mut Session, T) -> R,
    ) -> Result<R, T> {
        match self.inner.get_mut(id) {
            Some(mut r) => Ok(f(r.value_mut(), value)),
            None => Err(value),
        }
    }

    /// Tears a session down and wakes its poller so it can exit.
    pub fn remove(&self, id: &str) -> Option<Session> {
        let (_, session) = self.inner.remove(id)?;
        session.wake().notify_one();
        metrics::gauge!("desk_sessions_active").set(self.len() as f64);
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
