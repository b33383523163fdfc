//! # Catalog Snapshot Repository
//!
//! Last-seen shops and products, so listings render offline and the seller
//! dashboard has something to show before the first refresh.

use melar_core::{Product, Shop};

use crate::error::StoreResult;
use crate::keys;
use crate::repository::kv::KvRepository;

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    kv: KvRepository,
}

impl CatalogRepository {
    pub fn new(kv: KvRepository) -> Self {
        CatalogRepository { kv }
    }

    pub async fn shops(&self) -> StoreResult<Vec<Shop>> {
        Ok(self
            .kv
            .get_json_or_discard(keys::SHOPS)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_shops(&self, shops: &[Shop]) -> StoreResult<()> {
        self.kv.set_json(keys::SHOPS, shops).await
    }

    /// Replaces the shop with the same id, or appends it.
    pub async fn upsert_shop(&self, shop: &Shop) -> StoreResult<()> {
        let mut shops = self.shops().await?;
        match shops.iter_mut().find(|s| s.id == shop.id) {
            Some(existing) => *existing = shop.clone(),
            None => shops.push(shop.clone()),
        }
        self.save_shops(&shops).await
    }

    pub async fn shop(&self, shop_id: &str) -> StoreResult<Option<Shop>> {
        Ok(self.shops().await?.into_iter().find(|s| s.id == shop_id))
    }

    pub async fn shop_products(&self, shop_id: &str) -> StoreResult<Vec<Product>> {
        Ok(self
            .kv
            .get_json_or_discard(&keys::shop_products(shop_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn save_shop_products(&self, shop_id: &str, products: &[Product]) -> StoreResult<()> {
        self.kv
            .set_json(&keys::shop_products(shop_id), products)
            .await
    }

    pub async fn all_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self
            .kv
            .get_json_or_discard(keys::ALL_PRODUCTS)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_all_products(&self, products: &[Product]) -> StoreResult<()> {
        self.kv.set_json(keys::ALL_PRODUCTS, products).await
    }

    /// Drops a deleted product from every snapshot it appears in.
    pub async fn forget_product(&self, product_id: &str) -> StoreResult<()> {
        let mut all = self.all_products().await?;
        let before = all.len();
        all.retain(|p| p.id != product_id);
        if all.len() != before {
            self.save_all_products(&all).await?;
        }

        for key in self.kv.keys_with_prefix(keys::SHOP_PRODUCTS_PREFIX).await? {
            let mut products: Vec<Product> =
                self.kv.get_json_or_discard(&key).await?.unwrap_or_default();
            let before = products.len();
            products.retain(|p| p.id != product_id);
            if products.len() != before {
                self.kv.set_json(&key, &products).await?;
            }
        }
        Ok(())
    }
}
