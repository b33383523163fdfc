//! # Order Record Repository
//!
//! After each successful order submission two records are written:
//!
//! ```text
//! POST /orders/ ── 201 ──┬──► melarUserRentals_<buyerId>  += UserRental
//!                        └──► melarShopOrders_<shopId>    += ShopOrderRecord
//! ```
//!
//! Both lists are keyed by the backend order id; writing the same order
//! twice replaces the earlier entry.

use melar_core::order::{ShopOrderRecord, UserRental};
use melar_core::OrderStatus;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys;
use crate::repository::kv::KvRepository;

#[derive(Debug, Clone)]
pub struct RecordRepository {
    kv: KvRepository,
}

impl RecordRepository {
    pub fn new(kv: KvRepository) -> Self {
        RecordRepository { kv }
    }

    // =========================================================================
    // Buyer side
    // =========================================================================

    pub async fn user_rentals(&self, user_id: &str) -> StoreResult<Vec<UserRental>> {
        Ok(self
            .kv
            .get_json_or_discard(&keys::user_rentals(user_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn record_user_rental(&self, user_id: &str, rental: &UserRental) -> StoreResult<()> {
        let mut rentals = self.user_rentals(user_id).await?;
        match rentals.iter_mut().find(|r| r.order_id == rental.order_id) {
            Some(existing) => *existing = rental.clone(),
            None => rentals.push(rental.clone()),
        }
        debug!(user_id = %user_id, order_id = %rental.order_id, "Recorded rental");
        self.kv.set_json(&keys::user_rentals(user_id), &rentals).await
    }

    // =========================================================================
    // Seller side
    // =========================================================================

    pub async fn shop_orders(&self, shop_id: &str) -> StoreResult<Vec<ShopOrderRecord>> {
        Ok(self
            .kv
            .get_json_or_discard(&keys::shop_orders(shop_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn record_shop_order(
        &self,
        shop_id: &str,
        record: &ShopOrderRecord,
    ) -> StoreResult<()> {
        let mut orders = self.shop_orders(shop_id).await?;
        match orders.iter_mut().find(|o| o.order_id == record.order_id) {
            Some(existing) => *existing = record.clone(),
            None => orders.push(record.clone()),
        }
        debug!(shop_id = %shop_id, order_id = %record.order_id, "Recorded shop order");
        self.kv.set_json(&keys::shop_orders(shop_id), &orders).await
    }

    /// Mirrors a backend status change into the seller's record.
    pub async fn set_shop_order_status(
        &self,
        shop_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> StoreResult<()> {
        let mut orders = self.shop_orders(shop_id).await?;
        let record = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| StoreError::not_found("Shop order", order_id))?;
        record.status = status;
        self.kv.set_json(&keys::shop_orders(shop_id), &orders).await
    }

    /// Mirrors a backend status change into the buyer's history.
    /// Unknown orders are ignored; the history is best-effort.
    pub async fn set_user_rental_status(
        &self,
        user_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> StoreResult<()> {
        let mut rentals = self.user_rentals(user_id).await?;
        if let Some(rental) = rentals.iter_mut().find(|r| r.order_id == order_id) {
            rental.status = status;
            self.kv.set_json(&keys::user_rentals(user_id), &rentals).await?;
        }
        Ok(())
    }
}
