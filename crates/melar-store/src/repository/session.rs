//! # Session Repository
//!
//! Persists the auth token and a snapshot of the logged-in user so a restart
//! can resume the session without a round trip.

use melar_core::User;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::keys;
use crate::repository::kv::KvRepository;

/// What was persisted for the last session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: Option<User>,
}

#[derive(Debug, Clone)]
pub struct SessionRepository {
    kv: KvRepository,
}

impl SessionRepository {
    pub fn new(kv: KvRepository) -> Self {
        SessionRepository { kv }
    }

    /// Loads the stored session.
    ///
    /// A corrupt user snapshot is removed and reported as `user: None`, so
    /// the caller refetches it. A corrupt token drops the whole session.
    pub async fn load(&self) -> StoreResult<Option<StoredSession>> {
        let token: Option<String> = self.kv.get_json_or_discard(keys::AUTH_TOKEN).await?;
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let user: Option<User> = self.kv.get_json_or_discard(keys::USER).await?;
        debug!(has_user = user.is_some(), "Loaded stored session");
        Ok(Some(StoredSession { token, user }))
    }

    pub async fn token(&self) -> StoreResult<Option<String>> {
        self.kv.get_json_or_discard(keys::AUTH_TOKEN).await
    }

    pub async fn save_token(&self, token: &str) -> StoreResult<()> {
        self.kv.set_json(keys::AUTH_TOKEN, token).await
    }

    pub async fn user(&self) -> StoreResult<Option<User>> {
        self.kv.get_json_or_discard(keys::USER).await
    }

    /// Caches the user and mirrors it into the device's known-users list.
    pub async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.kv.set_json(keys::USER, user).await?;
        self.upsert_known_user(user).await
    }

    /// Users that have logged in on this device, most recent last.
    pub async fn known_users(&self) -> StoreResult<Vec<User>> {
        Ok(self
            .kv
            .get_json_or_discard::<Vec<User>>(keys::USERS)
            .await?
            .unwrap_or_default())
    }

    async fn upsert_known_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.known_users().await?;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.kv.set_json(keys::USERS, &users).await
    }

    /// Removes token and cached user. The known-users list is kept.
    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.remove(keys::AUTH_TOKEN).await?;
        self.kv.remove(keys::USER).await?;
        info!("Stored session cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
