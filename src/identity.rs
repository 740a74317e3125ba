//! Cache of the signed-in user's identity.
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::api::Transport;
use crate::collection::fetch::get_one;
use crate::error::FetchError;
use crate::model::SessionIdentity;

pub const DEFAULT_IDENTITY_PATH: &str = "/api/user/me";

/// Single-entry cache with get-or-fetch semantics.
///
/// Only successful fetches are stored. The lock is held while fetching, so
/// concurrent first callers share one network call.
#[derive(Debug)]
pub struct IdentityCache {
    path: String,
    cell: Mutex<Option<Arc<SessionIdentity>>>,
}

impl IdentityCache {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cell: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    #[instrument(skip_all, fields(path = %self.path))]
    pub async fn get_or_fetch<C>(&self, transport: &C) -> Result<Arc<SessionIdentity>, FetchError>
    where
        C: Transport + ?Sized,
    {
        let mut cell = self.cell.lock().await;
        if let Some(identity) = cell.as_ref() {
            return Ok(Arc::clone(identity));
        }
        let identity: Arc<SessionIdentity> = Arc::new(get_one(transport, &self.path).await?);
        info!(user_id = identity.id, role = ?identity.role, "session identity cached");
        *cell = Some(Arc::clone(&identity));
        Ok(identity)
    }

    /// Cached value, without touching the network.
    pub async fn cached(&self) -> Option<Arc<SessionIdentity>> {
        self.cell.lock().await.clone()
    }

    /// Forgets the cached identity (logout, role change). Returns whether an
    /// entry was evicted.
    pub async fn invalidate(&self) -> bool {
        let evicted = self.cell.lock().await.take();
        if let Some(identity) = &evicted {
            info!(user_id = identity.id, "session identity invalidated");
        }
        evicted.is_some()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_PATH)
    }
}
