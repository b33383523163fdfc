//! # State Module
//!
//! Explicit application state, created once at startup and handed to each
//! command that needs it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐     │
//! │  │  SessionStore    │ │    CartStore     │ │  ViewGuard /         │     │
//! │  │                  │ │                  │ │  SubmitGuard         │     │
//! │  │  • token         │ │  • cart lines    │ │                      │     │
//! │  │  • user snapshot │ │  • totals        │ │  • view still open   │     │
//! │  │  • shop id       │ │  • revision      │ │  • one submit at a   │     │
//! │  │                  │ │  • server/local  │ │    time              │     │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘     │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • SessionStore: user behind tokio RwLock (read far more than written)  │
//! │  • CartStore: cart behind tokio Mutex, revision is an AtomicU64         │
//! │  • Guards: AtomicBool shared through Arc                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod guards;
mod session;

pub use cart::{CartSource, CartStore, CartView};
pub use guards::{SubmitGuard, SubmitTicket, ViewGuard};
pub use session::SessionStore;
