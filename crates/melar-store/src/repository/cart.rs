//! # Cart Repository
//!
//! The cart used while logged out or while the backend is unreachable.

use melar_core::Cart;
use tracing::debug;

use crate::error::StoreResult;
use crate::keys;
use crate::repository::kv::KvRepository;

#[derive(Debug, Clone)]
pub struct CartRepository {
    kv: KvRepository,
}

impl CartRepository {
    pub fn new(kv: KvRepository) -> Self {
        CartRepository { kv }
    }

    /// The stored cart, or an empty one. A corrupt snapshot is discarded.
    pub async fn load(&self) -> StoreResult<Cart> {
        let cart: Option<Cart> = self.kv.get_json_or_discard(keys::CART).await?;
        let cart = cart.unwrap_or_default();
        debug!(lines = cart.item_count(), "Loaded local cart");
        Ok(cart)
    }

    pub async fn save(&self, cart: &Cart) -> StoreResult<()> {
        self.kv.set_json(keys::CART, cart).await
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.remove(keys::CART).await.map(|_| ())
    }
}
