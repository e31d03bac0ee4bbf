//! Shared access to one MDP from several tasks
//!
//! The invariants of [`Mdp`] span several collections, so the whole aggregate
//! sits behind a single reader/writer lock.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::Mdp;

/// Cloneable handle to an MDP guarded by one lock
#[derive(Debug, Clone, Default)]
pub struct SharedMdp {
    inner: Arc<RwLock<Mdp>>,
}

impl SharedMdp {
    /// Wrap an MDP
    #[must_use]
    pub fn new(mdp: Mdp) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mdp)),
        }
    }

    /// Acquire shared read access
    pub async fn read(&self) -> RwLockReadGuard<'_, Mdp> {
        self.inner.read().await
    }

    /// Acquire exclusive write access
    pub async fn write(&self) -> RwLockWriteGuard<'_, Mdp> {
        self.inner.write().await
    }

    /// Run `f` under the write lock, so no other task observes it half-way.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub async fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Mdp) -> Result<T>,
    {
        let mut guard = self.inner.write().await;
        f(&mut *guard)
    }

    /// Render under the read lock
    pub async fn render(&self) -> String {
        self.inner.read().await.render()
    }

    /// Take the MDP back if this is the last handle
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other handles exist.
    pub fn try_unwrap(self) -> std::result::Result<Mdp, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<Mdp> for SharedMdp {
    fn from(mdp: Mdp) -> Self {
        Self::new(mdp)
    }
}
