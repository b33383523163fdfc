//! # melar-store: Local Persistent Store for Melar
//!
//! A SQLite-backed key-value store holding everything the client keeps
//! between runs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Melar Data Flow                                  │
//! │                                                                         │
//! │  SessionStore / CartStore / CheckoutService (melar-app)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   melar-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │    Store      │    │ Repositories  │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ session, cart │    │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ catalog, ...  │    │ 001_kv.sql   │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/melar/melar.db (platform data dir)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use melar_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("path/to/melar.db")).await?;
//!
//! if let Some(session) = store.session().load().await? {
//!     println!("resuming as {:?}", session.user);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod keys;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

pub use repository::cart::CartRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::kv::KvRepository;
pub use repository::records::RecordRepository;
pub use repository::session::{SessionRepository, StoredSession};
