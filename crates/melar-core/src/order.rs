//! # Order Partitioning
//!
//! Turns one cart into one order per seller.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Cart [A1, B1, A2, ?1]                                                 │
//! │        │                                                                │
//! │        ▼  partition_by_seller (first-appearance order)                  │
//! │   ┌──────────┐  ┌──────────┐  ┌──────────────┐                          │
//! │   │ A: A1 A2 │  │ B: B1    │  │ unknown: ?1  │   ◄── OrderGroup         │
//! │   └────┬─────┘  └────┬─────┘  └──────┬───────┘                          │
//! │        ▼             ▼               ▼                                  │
//! │   OrderDraft    OrderDraft      OrderDraft        ◄── uuid v4 each      │
//! │        │             │               │                                  │
//! │        ▼             ▼               ▼                                  │
//! │   POST /orders/ (one per draft, no rollback across drafts)              │
//! │        │                                                                │
//! │        ├──► UserRental       (buyer's rental history)                   │
//! │        └──► ShopOrderRecord  (seller's order list)                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartLineItem;
use crate::forms::BillingDetails;
use crate::money::Money;
use crate::pricing::RentalPeriod;
use crate::status::OrderStatus;

/// Seller key for lines whose shop is unknown.
pub const UNKNOWN_SELLER: &str = "unknown_shop";

// =============================================================================
// Grouping
// =============================================================================

/// The lines of one seller, submitted together as one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderGroup {
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub items: Vec<CartLineItem>,
    /// Subtotal of just this group's lines.
    pub total: Money,
}

impl OrderGroup {
    /// Period of the first line.
    ///
    /// Lines in one group are assumed to share a period. Mixed periods are
    /// still submitted per line, only the summary uses the first.
    pub fn rental_period(&self) -> Option<RentalPeriod> {
        self.items.first().map(CartLineItem::period)
    }

    pub fn line_ids(&self) -> Vec<String> {
        self.items.iter().map(|line| line.line_id.clone()).collect()
    }

    pub fn is_unknown_seller(&self) -> bool {
        self.seller_id == UNKNOWN_SELLER
    }
}

/// Groups lines by seller.
///
/// Groups appear in the order their seller first appears in `items`, and
/// lines keep their cart order inside a group. Lines without a seller share
/// the [`UNKNOWN_SELLER`] group.
///
/// ```rust
/// use melar_core::{partition_by_seller, Cart};
///
/// let groups = partition_by_seller(&Cart::new().items);
/// assert!(groups.is_empty());
/// ```
pub fn partition_by_seller(items: &[CartLineItem]) -> Vec<OrderGroup> {
    let mut groups: Vec<OrderGroup> = Vec::new();

    for line in items {
        let key = line.seller_key();
        match groups.iter_mut().find(|g| g.seller_id == key) {
            Some(group) => {
                group.total += line.line_total();
                if group.seller_name.is_none() {
                    group.seller_name = line.seller_name.clone();
                }
                group.items.push(line.clone());
            }
            None => groups.push(OrderGroup {
                seller_id: key.to_string(),
                seller_name: line.seller_name.clone(),
                items: vec![line.clone()],
                total: line.line_total(),
            }),
        }
    }

    groups
}

// =============================================================================
// Drafts
// =============================================================================

/// Who is placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerIdentity {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

/// One order ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Client-side reference, unique per submission. Sent as the payment
    /// reference so the backend row can be matched back to this draft.
    pub id: String,
    pub buyer: BuyerIdentity,
    pub billing: BillingDetails,
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub items: Vec<CartLineItem>,
    pub rental_period: Option<RentalPeriod>,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    pub fn from_group(group: &OrderGroup, buyer: &BuyerIdentity, billing: &BillingDetails) -> Self {
        OrderDraft {
            id: Uuid::new_v4().to_string(),
            buyer: buyer.clone(),
            billing: billing.clone(),
            seller_id: group.seller_id.clone(),
            seller_name: group.seller_name.clone(),
            items: group.items.clone(),
            rental_period: group.rental_period(),
            total: group.total,
            status: OrderStatus::PendingWhatsapp,
            created_at: Utc::now(),
        }
    }

    /// Request body for `POST /orders/`.
    pub fn to_payload(&self) -> CreateOrderPayload {
        CreateOrderPayload {
            first_name: self.billing.first_name.trim().to_string(),
            last_name: self.billing.last_name.trim().to_string(),
            email_at_checkout: self.billing.email.trim().to_string(),
            phone_at_checkout: self.billing.phone.trim().to_string(),
            billing_address: self.billing.address.clone(),
            billing_city: self.billing.city.clone(),
            billing_state: self.billing.state.clone(),
            billing_zip: self.billing.zip.clone(),
            payment_reference: Some(self.id.clone()),
            order_items_data: self
                .items
                .iter()
                .map(|line| OrderItemPayload {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    start_date: line.rental_start,
                    end_date: line.rental_end,
                })
                .collect(),
        }
    }

    pub fn line_ids(&self) -> Vec<String> {
        self.items.iter().map(|line| line.line_id.clone()).collect()
    }
}

/// Body of `POST /orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    pub first_name: String,
    pub last_name: String,
    pub email_at_checkout: String,
    pub phone_at_checkout: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub order_items_data: Vec<OrderItemPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    pub product_id: String,
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// =============================================================================
// Local Records
// =============================================================================

/// Entry in the buyer's rental history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRental {
    pub order_id: String,
    pub draft_id: String,
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub items: Vec<CartLineItem>,
    pub rental_period: Option<RentalPeriod>,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl UserRental {
    pub fn from_draft(draft: &OrderDraft, order_id: &str) -> Self {
        UserRental {
            order_id: order_id.to_string(),
            draft_id: draft.id.clone(),
            seller_id: draft.seller_id.clone(),
            seller_name: draft.seller_name.clone(),
            items: draft.items.clone(),
            rental_period: draft.rental_period,
            total: draft.total,
            status: draft.status,
            created_at: draft.created_at,
        }
    }
}

/// Entry in a seller's order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopOrderRecord {
    pub order_id: String,
    pub draft_id: String,
    pub buyer: BuyerIdentity,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub items: Vec<CartLineItem>,
    pub rental_period: Option<RentalPeriod>,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl ShopOrderRecord {
    pub fn from_draft(draft: &OrderDraft, order_id: &str) -> Self {
        ShopOrderRecord {
            order_id: order_id.to_string(),
            draft_id: draft.id.clone(),
            buyer: draft.buyer.clone(),
            customer_name: draft.billing.full_name(),
            customer_phone: draft.billing.phone.clone(),
            shipping_address: draft.billing.address_line(),
            items: draft.items.clone(),
            rental_period: draft.rental_period,
            total: draft.total,
            status: draft.status,
            created_at: draft.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
