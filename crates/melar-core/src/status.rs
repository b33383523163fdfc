//! # Order Status State Machine
//!
//! The backend assigns statuses; this module decides which changes a buyer or
//! a seller may request, and therefore which controls are offered at all.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pending_whatsapp ──► pending ──► confirmed ──► active ──► completed    │
//! │         │                │            │                      (final)    │
//! │         │                │            │                                 │
//! │         └────────────────┴────────────┴──────► cancelled (final)        │
//! │                                                                         │
//! │  Seller: any strictly-forward step, or cancel from any open state.      │
//! │  Buyer:  cancel only, and only from the three pre-rental states.        │
//! │  Nobody: anything out of `completed` or `cancelled`.                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend historically also sends `rented_out`, which is read as `active`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Status of a rental order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created at checkout, waiting for the WhatsApp confirmation.
    PendingWhatsapp,
    Pending,
    Confirmed,
    /// Items are with the renter.
    #[serde(alias = "rented_out")]
    Active,
    Completed,
    Cancelled,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Buyer,
    Seller,
}

impl OrderStatus {
    /// The forward sequence. `Cancelled` is outside it.
    pub const SEQUENCE: [OrderStatus; 5] = [
        OrderStatus::PendingWhatsapp,
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Active,
        OrderStatus::Completed,
    ];

    /// Every status, in display order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::PendingWhatsapp,
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Active,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingWhatsapp => "pending_whatsapp",
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human label.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::PendingWhatsapp => "Awaiting WhatsApp confirmation",
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Active => "Active",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    fn rank(&self) -> Option<usize> {
        Self::SEQUENCE.iter().position(|s| s == self)
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// True while the rental has not started yet (the buyer's cancel window).
    pub const fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::PendingWhatsapp | OrderStatus::Pending | OrderStatus::Confirmed
        )
    }

    /// Whether `actor` may move an order from `self` to `to`.
    pub fn allows(&self, to: OrderStatus, actor: Actor) -> bool {
        if self.is_terminal() || *self == to {
            return false;
        }
        match (actor, to) {
            (Actor::Buyer, OrderStatus::Cancelled) => self.is_cancellable(),
            (Actor::Buyer, _) => false,
            (Actor::Seller, OrderStatus::Cancelled) => true,
            (Actor::Seller, target) => match (self.rank(), target.rank()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        }
    }

    /// Validates a transition and returns the new status.
    pub fn transition(&self, to: OrderStatus, actor: Actor) -> CoreResult<OrderStatus> {
        if self.allows(to, actor) {
            return Ok(to);
        }
        if to == OrderStatus::Cancelled {
            return Err(CoreError::CancelNotAllowed { status: *self });
        }
        Err(CoreError::InvalidStatusTransition { from: *self, to })
    }

    /// Targets a seller may pick from this status. Empty for terminal states.
    ///
    /// ```rust
    /// use melar_core::OrderStatus;
    ///
    /// assert_eq!(
    ///     OrderStatus::Confirmed.seller_targets(),
    ///     vec![OrderStatus::Active, OrderStatus::Completed, OrderStatus::Cancelled],
    /// );
    /// assert_eq!(
    ///     OrderStatus::Active.seller_targets(),
    ///     vec![OrderStatus::Completed, OrderStatus::Cancelled],
    /// );
    /// assert!(OrderStatus::Completed.seller_targets().is_empty());
    /// ```
    pub fn seller_targets(&self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|to| self.allows(*to, Actor::Seller))
            .collect()
    }

    /// Actions offered to the buyer on their order page.
    pub fn buyer_actions(&self) -> BuyerActions {
        BuyerActions {
            can_cancel: self.allows(OrderStatus::Cancelled, Actor::Buyer),
            can_review: *self == OrderStatus::Completed,
        }
    }
}

/// Which buttons the buyer sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BuyerActions {
    pub can_cancel: bool,
    pub can_review: bool,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending_whatsapp" => Ok(OrderStatus::PendingWhatsapp),
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "active" | "rented_out" => Ok(OrderStatus::Active),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
