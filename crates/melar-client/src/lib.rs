//! # melar-client: Backend REST Client
//!
//! Typed wrappers over the marketplace backend's REST API.
//!
//! ## Endpoint Groups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiClient                                                              │
//! │   ├── auth()     /auth/login/ /auth/registration/ /auth/user/ ...       │
//! │   ├── catalog()  /products/ /categories/ /reviews/                      │
//! │   ├── shops()    /shops/ /shops/{id}/products/ /shops/{id}/orders/      │
//! │   ├── cart()     /cart/ /cart-items/                                    │
//! │   └── orders()   /orders/ /orders/{id}/cancel-order/                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use melar_client::{ApiClient, ClientConfig};
//!
//! # async fn demo() -> melar_client::ClientResult<()> {
//! let client = ApiClient::new(ClientConfig::default())?;
//! let products = client.catalog().products().await?;
//! println!("{} products", products.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;

pub use client::{ApiClient, ClientConfig, ListResponse, DEFAULT_AUTH_SCHEME, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
