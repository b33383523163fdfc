//! Orders, from both sides of the rental.

use melar_core::order::CreateOrderPayload;
use melar_core::{Order, OrderStatus};
use serde_json::json;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ClientResult;

pub struct OrdersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        OrdersApi { client }
    }

    /// `GET /orders/`. Without a shop id the backend returns the caller's own
    /// rentals; with one, that shop's incoming orders.
    pub async fn list(&self, shop_id: Option<&str>) -> ClientResult<Vec<Order>> {
        self.client.require_token().await?;
        let query: Vec<(&str, String)> = shop_id
            .map(|id| vec![("shop_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_list("/orders/", &query).await
    }

    /// `GET /orders/{id}/`
    pub async fn get(&self, order_id: &str) -> ClientResult<Order> {
        self.client.require_token().await?;
        self.client.get(&format!("/orders/{}/", order_id)).await
    }

    /// `POST /orders/`. The backend prices the order itself.
    pub async fn create(&self, payload: &CreateOrderPayload) -> ClientResult<Order> {
        self.client.require_token().await?;
        let order: Order = self.client.post("/orders/", payload).await?;
        info!(
            order_id = %order.id,
            items = order.items.len(),
            total = %order.total_price,
            "Order created"
        );
        Ok(order)
    }

    /// `POST /orders/{id}/cancel-order/`
    pub async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        self.client.require_token().await?;
        let order: Order = self
            .client
            .post(&format!("/orders/{}/cancel-order/", order_id), &json!({}))
            .await?;
        info!(order_id = %order_id, "Order cancelled");
        Ok(order)
    }

    /// `PATCH /orders/{id}/` with the new status.
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        self.client.require_token().await?;
        let order: Order = self
            .client
            .patch(
                &format!("/orders/{}/", order_id),
                &json!({ "status": status.as_str() }),
            )
            .await?;
        info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(order)
    }
}
