//! # Melar Application Library
//!
//! The application layer of the Melar rental marketplace client: explicit
//! session and cart state, checkout orchestration, and order actions over
//! `melar-core`, `melar-store`, and `melar-client`.
//!
//! ## Module Organization
//! ```text
//! melar_app/
//! ├── lib.rs          ◄─── You are here (App wiring, tracing)
//! ├── config.rs       ◄─── melar.toml + MELAR_* overrides
//! ├── error.rs        ◄─── AppError / ErrorCode
//! ├── events.rs       ◄─── NavigationEvent between views
//! ├── state/
//! │   ├── session.rs  ◄─── SessionStore (token, user snapshot)
//! │   ├── cart.rs     ◄─── CartStore (server or local, revisions)
//! │   └── guards.rs   ◄─── ViewGuard, SubmitGuard
//! └── commands/
//!     ├── account.rs  ◄─── Login, registration, profile
//!     ├── catalog.rs  ◄─── Product browsing and seller product edits
//!     ├── shops.rs    ◄─── Shop browsing and creation
//!     ├── cart.rs     ◄─── Add to cart by product id
//!     ├── checkout.rs ◄─── CheckoutService
//!     ├── orders.rs   ◄─── Order details, cancel, status updates
//!     ├── dashboard.rs◄─── Seller figures
//!     └── reviews.rs  ◄─── Product reviews
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod state;

use std::sync::Arc;

use commands::checkout::CheckoutService;
use commands::orders::OrderActions;
use melar_client::ApiClient;
use melar_store::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorCode};
pub use events::{NavigationEvent, View};
pub use state::{CartStore, SessionStore};

/// Everything a command needs, built once at startup.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Open the local store (SQLite, migrations)                           │
/// │  2. Build the API client from the config                                │
/// │  3. Restore the session (token + user snapshot)                         │
/// │  4. Load the cart (server when logged in, local otherwise)              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub struct App {
    pub config: AppConfig,
    pub store: Store,
    pub client: ApiClient,
    pub session: Arc<SessionStore>,
    pub cart: Arc<CartStore>,
    pub checkout: CheckoutService,
    pub orders: OrderActions,
}

impl App {
    /// Opens the store from `config` and restores state.
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        let store = Store::open(config.store_config()).await?;
        Self::with_store(config, store).await
    }

    /// Like [`App::start`] with an already opened store.
    pub async fn with_store(config: AppConfig, store: Store) -> AppResult<Self> {
        let client = ApiClient::new(config.client_config())?;
        let session = Arc::new(SessionStore::new(store.clone(), client.clone()));
        let cart = Arc::new(CartStore::new(
            store.clone(),
            client.clone(),
            config.fee_schedule(),
        ));

        let app = App {
            config,
            store,
            client,
            session,
            cart,
            checkout: CheckoutService::new(),
            orders: OrderActions::new(),
        };

        app.session.restore().await?;
        if let Err(e) = app.cart.load().await {
            tracing::warn!(error = %e, "Cart could not be loaded at startup");
        }

        info!(api = %app.client.base_url(), "Application started");
        Ok(app)
    }

    /// Explicit teardown. The stored session and cart remain on disk.
    pub async fn shutdown(self) {
        self.session.shutdown().await;
        self.store.close().await;
        info!("Application stopped");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=melar_app=trace` - Trace for the app crate only
/// - Default: `info,melar=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,melar=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
