//! # melar-core: Pure Business Logic for Melar
//!
//! Everything that decides *what a rental costs* and *what an order may do*
//! lives here, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Melar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  melar-app (session, cart, checkout)            │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼───────────────┐  ┌───────────────▼──────────────┐    │
//! │  │  melar-store (SQLite KV)     │  │  melar-client (REST)         │    │
//! │  └──────────────┬───────────────┘  └───────────────┬──────────────┘    │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │               ★ melar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │ pricing │ │  cart   │ │  order  │ │ status  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐            │   │
//! │  │   │  types  │ │validation│ │  forms   │ │whatsapp │            │   │
//! │  │   └─────────┘ └──────────┘ └──────────┘ └─────────┘            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point money (4 decimal places, no floating point)
//! - [`pricing`] - Day counting, line totals, fee schedule, cart aggregates
//! - [`cart`] - The cart and its line items
//! - [`catalog`] - Product search, filters, and sorting
//! - [`order`] - Partitioning a cart into one order per seller
//! - [`status`] - Order status state machine
//! - [`types`] - Backend entities (products, shops, orders, ...)
//! - [`forms`] - Form payloads (checkout, registration, product, shop)
//! - [`validation`] - Field-level validation rules
//! - [`whatsapp`] - Checkout confirmation message and link
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use melar_core::money::Money;
//! use melar_core::pricing::{FeeSchedule, RentalPeriod, line_total};
//!
//! let price = Money::parse("45.99").unwrap();
//! let period = RentalPeriod::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
//! );
//!
//! let subtotal = line_total(price, period.day_count(), 1);
//! let totals = FeeSchedule::default().totals(subtotal);
//!
//! assert_eq!(subtotal.to_decimal_string(), "137.97");
//! assert_eq!(totals.grand_total.to_decimal_string(), "158.6655");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod forms;
pub mod money;
pub mod order;
pub mod pricing;
pub mod status;
pub mod types;
pub mod validation;
pub mod whatsapp;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartTotals};
pub use catalog::{ProductFilter, ProductSort};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{partition_by_seller, OrderDraft, OrderGroup, UNKNOWN_SELLER};
pub use pricing::{checked_line_total, day_count, line_total, FeeSchedule, MoneyTotals, Rate, RentalPeriod};
pub use status::{Actor, OrderStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Platform WhatsApp number used when an order cannot be routed to one shop.
pub const DEFAULT_ADMIN_WHATSAPP: &str = "6281234567890";
