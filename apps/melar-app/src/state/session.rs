//! # Session Store
//!
//! Owns the logged-in user and the API token. Views receive it explicitly
//! instead of reading ambient state.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  restore() ──► token in store? ──no──► anonymous                        │
//! │                     │ yes                                               │
//! │                     ▼                                                   │
//! │              client.set_token()                                         │
//! │              user snapshot cached? ──yes──► logged in                   │
//! │                     │ no (or corrupt, already discarded)                │
//! │                     ▼                                                   │
//! │              GET /auth/user/ ──401──► clear() ──► anonymous             │
//! │                     │ ok                                                │
//! │                     ▼                                                   │
//! │              save_user() ──► logged in                                  │
//! │                                                                         │
//! │  logout() ──► POST /auth/logout/ (best effort) ──► clear() always       │
//! │  shutdown() ──► forget in-memory state; the stored session stays        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use melar_client::ApiClient;
use melar_core::forms::{LoginForm, PasswordChangeForm, ProfileUpdate, RegistrationForm};
use melar_core::order::BuyerIdentity;
use melar_core::User;
use melar_store::Store;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

pub struct SessionStore {
    store: Store,
    client: ApiClient,
    user: RwLock<Option<User>>,
}

impl SessionStore {
    pub fn new(store: Store, client: ApiClient) -> Self {
        SessionStore {
            store,
            client,
            user: RwLock::new(None),
        }
    }

    /// Restores the stored session, if any.
    ///
    /// When the backend is unreachable and no user snapshot is cached, the
    /// token is kept and the user stays unknown until the next call.
    pub async fn restore(&self) -> AppResult<Option<User>> {
        let Some(stored) = self.store.session().load().await? else {
            debug!("No stored session");
            return Ok(None);
        };
        self.client.set_token(Some(stored.token)).await;

        let user = match stored.user {
            Some(user) => Some(user),
            None => match self.fetch_user(None).await {
                Ok(user) => {
                    self.store.session().save_user(&user).await?;
                    Some(user)
                }
                Err(e) if e.is_not_authenticated() => {
                    warn!("Stored token rejected, clearing session");
                    self.clear_local().await?;
                    return Ok(None);
                }
                Err(e) => {
                    warn!(error = %e, "Could not fetch user for restored session");
                    None
                }
            },
        };

        if let Some(user) = &user {
            info!(user_id = %user.id, username = %user.username, "Session restored");
        }
        *self.user.write().await = user.clone();
        Ok(user)
    }

    pub async fn login(&self, form: &LoginForm) -> AppResult<User> {
        form.validate()?;
        let key = self.client.auth().login(&form.payload()).await?;
        self.establish(key).await
    }

    /// Registers an account. Returns the user when the backend logs the new
    /// account in directly, `None` when a separate login is needed.
    pub async fn register(&self, form: &RegistrationForm) -> AppResult<Option<User>> {
        form.validate()?;
        match self.client.auth().register(form).await? {
            Some(key) => self.establish(key).await.map(Some),
            None => Ok(None),
        }
    }

    async fn establish(&self, key: String) -> AppResult<User> {
        self.client.set_token(Some(key.clone())).await;

        let user = match self.fetch_user(None).await {
            Ok(user) => user,
            Err(e) => {
                self.client.set_token(None).await;
                return Err(e);
            }
        };

        let session = self.store.session();
        session.save_token(&key).await?;
        session.save_user(&user).await?;
        info!(user_id = %user.id, username = %user.username, "Logged in");

        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// `GET /auth/user/`, with the shop id filled from the profile.
    async fn fetch_user(&self, known_shop: Option<String>) -> AppResult<User> {
        let mut user = self.client.auth().current_user().await?;
        match self.client.auth().my_profile().await {
            Ok(Some(profile)) => {
                user.shop_id = profile.shop_id.filter(|_| profile.has_shop);
            }
            Ok(None) => user.shop_id = known_shop,
            Err(e) => {
                warn!(error = %e, "Could not load profile, keeping known shop");
                user.shop_id = user.shop_id.or(known_shop);
            }
        }
        Ok(user)
    }

    /// Logs out. Local state is cleared even when the backend call fails.
    pub async fn logout(&self) -> AppResult<()> {
        if self.client.has_token().await {
            if let Err(e) = self.client.auth().logout().await {
                warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }
        self.clear_local().await?;
        info!("Logged out");
        Ok(())
    }

    async fn clear_local(&self) -> AppResult<()> {
        self.client.set_token(None).await;
        *self.user.write().await = None;
        self.store.session().clear().await?;
        Ok(())
    }

    /// `PATCH /auth/user/` and refresh the cached snapshot.
    pub async fn update_user(&self, update: &ProfileUpdate) -> AppResult<User> {
        update.validate()?;
        let current = self.require_user().await?;

        let mut user = self.client.auth().update_user(update).await?;
        if user.shop_id.is_none() {
            user.shop_id = current.shop_id;
        }

        self.store.session().save_user(&user).await?;
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    pub async fn change_password(&self, form: &PasswordChangeForm) -> AppResult<()> {
        form.validate()?;
        self.require_user().await?;
        self.client.auth().change_password(form).await?;
        info!("Password changed");
        Ok(())
    }

    /// Records the user's shop in the cached snapshot.
    pub async fn set_shop(&self, shop_id: Option<String>) -> AppResult<User> {
        let mut guard = self.user.write().await;
        let user = guard.as_mut().ok_or_else(AppError::not_authenticated)?;
        user.shop_id = shop_id;
        self.store.session().save_user(user).await?;
        Ok(user.clone())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some() && self.client.has_token().await
    }

    pub async fn require_user(&self) -> AppResult<User> {
        if !self.client.has_token().await {
            return Err(AppError::not_authenticated());
        }
        self.current_user()
            .await
            .ok_or_else(AppError::not_authenticated)
    }

    /// The logged-in user's shop id.
    pub async fn require_shop(&self) -> AppResult<(User, String)> {
        let user = self.require_user().await?;
        let shop_id = user
            .shop_id
            .clone()
            .ok_or_else(|| AppError::validation("Create a shop first"))?;
        Ok((user, shop_id))
    }

    pub async fn buyer_identity(&self) -> AppResult<BuyerIdentity> {
        let user = self.require_user().await?;
        Ok(BuyerIdentity {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    /// Drops in-memory state. The stored session survives for the next
    /// `restore()`.
    pub async fn shutdown(&self) {
        *self.user.write().await = None;
        self.client.set_token(None).await;
        debug!("Session store shut down");
    }
}
