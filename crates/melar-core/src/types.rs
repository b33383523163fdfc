//! # Domain Types
//!
//! Entities exchanged with the backend REST API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌───────────┐  owns   ┌───────────┐  lists   ┌───────────┐            │
//! │  │   User    │────────►│   Shop    │─────────►│  Product  │            │
//! │  └─────┬─────┘         └───────────┘          └─────┬─────┘            │
//! │        │ places                                     │ rented as        │
//! │        ▼                                            ▼                  │
//! │  ┌───────────┐ items  ┌───────────┐         ┌──────────────┐           │
//! │  │   Order   │───────►│ OrderItem │         │ ServerCart   │           │
//! │  │ (status)  │        └───────────┘         │  └ items     │           │
//! │  └───────────┘                              └──────────────┘           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//! The backend uses integer primary keys. Everything on this side treats ids as
//! opaque strings, so every id field accepts either a JSON number or a string.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::OrderStatus;

// =============================================================================
// Id Deserialization
// =============================================================================

/// Serde helpers for ids that arrive as numbers or strings.
pub mod id {
    use serde::de::{self, Visitor};
    use serde::Deserializer;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an id as a string or integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    /// Required id.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        d.deserialize_any(IdVisitor)
    }

    /// Optional id (`null` or missing becomes `None`).
    pub fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        struct OptVisitor;

        impl<'de> Visitor<'de> for OptVisitor {
            type Value = Option<String>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an optional id")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(IdVisitor).map(Some)
            }
        }

        d.deserialize_option(OptVisitor)
    }
}

/// Ratings arrive as decimal strings (`"4.50"`) or numbers.
fn de_rating<'de, D: serde::Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(d)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Raw::Null(()) => Ok(0.0),
    }
}

// =============================================================================
// Users
// =============================================================================

/// The logged-in user, as returned by `/auth/user/`.
///
/// Cached in the local store so a restart does not need a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "pk", deserialize_with = "id::deserialize")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Shop owned by this user, if any. Filled from the profile.
    #[serde(default, deserialize_with = "id::option")]
    pub shop_id: Option<String>,
}

impl User {
    /// Full name when known, username otherwise.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn has_shop(&self) -> bool {
        self.shop_id.is_some()
    }
}

/// Public user summary nested in orders and profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// `/profiles/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub user: UserSummary,
    #[serde(default)]
    pub has_shop: bool,
    #[serde(default, deserialize_with = "id::option")]
    pub shop_id: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Shop reference embedded in a product (`owner_info`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRef {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_username: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "de_rating")]
    pub rating: f64,
    #[serde(default)]
    pub total_rentals: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub product_count: i64,
}

/// A rentable product. `price` is the price per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    /// Category name (the backend flattens the relation to its name).
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "de_rating")]
    pub rating: f64,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub total_individual_rentals: i64,
    /// Absolute image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub owner_info: Option<ShopRef>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Owning shop id, taken from `owner_info`.
    pub fn shop_id(&self) -> Option<&str> {
        self.owner_info.as_ref().map(|s| s.id.as_str())
    }

    /// Owning shop name, from either field the backend fills.
    pub fn shop_display_name(&self) -> Option<&str> {
        self.owner_info
            .as_ref()
            .map(|s| s.name.as_str())
            .or(self.shop_name.as_deref())
    }

    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// `/reviews/` entry. One per (product, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub product: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub product: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: i64,
    pub price_per_day_at_rental: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub item_total: Option<Money>,
}

/// A rental order as stored by the backend.
///
/// `total_price` is the order subtotal (sum of item totals). Fee and tax are
/// derived on display, see [`crate::pricing::FeeSchedule::totals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_price: Money,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email_at_checkout: String,
    #[serde(default)]
    pub phone_at_checkout: String,
    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub billing_city: String,
    #[serde(default)]
    pub billing_state: String,
    #[serde(default)]
    pub billing_zip: String,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

impl Order {
    /// Name typed at checkout, falling back to the account's username.
    pub fn customer_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        self.user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Server Cart
// =============================================================================

/// Product summary nested in a server cart item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProductInfo {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    /// Not every backend build sends this. Without it the shop id is looked
    /// up from the product before checkout, and lines that still have none
    /// go to the unknown-seller bucket.
    #[serde(default, deserialize_with = "id::option")]
    pub shop_id: Option<String>,
}

/// `/cart-items/` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerCartItem {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub product_detail: CartProductInfo,
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtotal: Option<Money>,
}

/// `/cart/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerCart {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<ServerCartItem>,
    #[serde(default)]
    pub total_cart_price: Option<Money>,
}

// =============================================================================
// Unit Tests
// =============================================================================
