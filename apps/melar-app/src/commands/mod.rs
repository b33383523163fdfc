//! # Commands
//!
//! One function per user action. Each takes the [`App`](crate::App) and
//! returns data for the view, plus a [`NavigationEvent`](crate::NavigationEvent)
//! when the action moves the user elsewhere.
//!
//! ```text
//! commands/
//! ├── account.rs   login, register, logout, profile
//! ├── catalog.rs   products, categories, seller product edits
//! ├── shops.rs     shops, shop creation
//! ├── cart.rs      add to cart by product id
//! ├── checkout.rs  CheckoutService
//! ├── orders.rs    order details, cancel, status updates
//! ├── dashboard.rs seller figures
//! └── reviews.rs   product reviews
//! ```
//!
//! ## Offline Reads
//! Listing commands cache what they fetch under the store's catalog keys and
//! serve that cache when the backend cannot be reached.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod orders;
pub mod reviews;
pub mod shops;
