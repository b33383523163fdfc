//! Shops and the seller's view of their products and orders.

use melar_core::forms::ShopForm;
use melar_core::{Order, Product, Shop};
use tracing::info;

use crate::client::ApiClient;
use crate::error::ClientResult;

pub struct ShopsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ShopsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        ShopsApi { client }
    }

    /// `GET /shops/`
    pub async fn list(&self) -> ClientResult<Vec<Shop>> {
        self.client.get_list("/shops/", &[]).await
    }

    /// `GET /shops/{id}/`
    pub async fn get(&self, shop_id: &str) -> ClientResult<Shop> {
        self.client.get(&format!("/shops/{}/", shop_id)).await
    }

    /// `POST /shops/`. The backend links the shop to the caller's profile.
    pub async fn create(&self, form: &ShopForm) -> ClientResult<Shop> {
        self.client.require_token().await?;
        let shop: Shop = self.client.post("/shops/", form).await?;
        info!(shop_id = %shop.id, name = %shop.name, "Shop created");
        Ok(shop)
    }

    /// `PATCH /shops/{id}/`
    pub async fn update(&self, shop_id: &str, form: &ShopForm) -> ClientResult<Shop> {
        self.client.require_token().await?;
        self.client
            .patch(&format!("/shops/{}/", shop_id), form)
            .await
    }

    /// `GET /shops/{id}/products/`
    pub async fn products(&self, shop_id: &str) -> ClientResult<Vec<Product>> {
        self.client
            .get_list(&format!("/shops/{}/products/", shop_id), &[])
            .await
    }

    /// `GET /shops/{id}/orders/`. Owner only.
    pub async fn orders(&self, shop_id: &str) -> ClientResult<Vec<Order>> {
        self.client.require_token().await?;
        self.client
            .get_list(&format!("/shops/{}/orders/", shop_id), &[])
            .await
    }
}
