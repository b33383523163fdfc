//! The server-side cart (`/cart/`, `/cart-items/`).

use chrono::NaiveDate;
use melar_core::{RentalPeriod, ServerCart, ServerCartItem};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Serialize)]
struct AddItemBody<'a> {
    product_id: &'a str,
    quantity: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

pub struct CartApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CartApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        CartApi { client }
    }

    /// `GET /cart/`
    pub async fn get(&self) -> ClientResult<ServerCart> {
        self.client.require_token().await?;
        self.client.get("/cart/").await
    }

    /// `POST /cart-items/`
    pub async fn add_item(
        &self,
        product_id: &str,
        quantity: i64,
        period: RentalPeriod,
    ) -> ClientResult<ServerCartItem> {
        self.client.require_token().await?;
        let body = AddItemBody {
            product_id,
            quantity,
            start_date: period.start_date,
            end_date: period.end_date,
        };
        let item: ServerCartItem = self.client.post("/cart-items/", &body).await?;
        debug!(item_id = %item.id, product_id = %product_id, quantity, "Cart item added");
        Ok(item)
    }

    /// `PATCH /cart-items/{id}/`
    pub async fn update_quantity(&self, item_id: &str, quantity: i64) -> ClientResult<ServerCartItem> {
        self.client.require_token().await?;
        self.client
            .patch(
                &format!("/cart-items/{}/", item_id),
                &json!({ "quantity": quantity }),
            )
            .await
    }

    /// `DELETE /cart-items/{id}/`
    pub async fn remove_item(&self, item_id: &str) -> ClientResult<()> {
        self.client.require_token().await?;
        self.client
            .delete(&format!("/cart-items/{}/", item_id))
            .await
    }

    /// `POST /cart/clear/`
    pub async fn clear(&self) -> ClientResult<()> {
        self.client.require_token().await?;
        self.client.post_no_content("/cart/clear/", &json!({})).await
    }
}
