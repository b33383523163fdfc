//! # Cart Store
//!
//! The cart a view sees, kept in one place and recomputed on every change.
//!
//! ## Backing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  logged in ──────────► /cart/, /cart-items/      (CartSource::Server)   │
//! │      │                                                                  │
//! │      └─ backend down ─► local `cart` key          (CartSource::Local)   │
//! │                                                                         │
//! │  anonymous ──────────► local `cart` key          (CartSource::Local)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Revisions
//! Every request that will replace the cart takes a revision first. A server
//! response is applied only if its revision is still the newest, so two quick
//! quantity changes can never end with the older response on screen.
//! ```text
//! update_quantity(a, 2) ──► rev 7 ──► PATCH ...............► response (dropped)
//! update_quantity(a, 3) ──────► rev 8 ──► PATCH ──► response (applied)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use melar_client::{ApiClient, ClientError};
use melar_core::validation::{validate_quantity, validate_rental_period};
use melar_core::{
    Cart, CartLineItem, CartTotals, CoreResult, FeeSchedule, Product, RentalPeriod, ServerCart,
};
use melar_store::Store;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartSource {
    Server,
    Local,
}

/// What a cart view renders.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    pub source: CartSource,
    pub revision: u64,
}

#[derive(Debug)]
struct CartState {
    cart: Cart,
    source: CartSource,
}

pub struct CartStore {
    store: Store,
    client: ApiClient,
    fees: FeeSchedule,
    state: Mutex<CartState>,
    revision: AtomicU64,
}

impl CartStore {
    pub fn new(store: Store, client: ApiClient, fees: FeeSchedule) -> Self {
        CartStore {
            store,
            client,
            fees,
            state: Mutex::new(CartState {
                cart: Cart::new(),
                source: CartSource::Local,
            }),
            revision: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Revisions
    // =========================================================================

    fn begin_request(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Replaces the cart unless a newer request was issued after `revision`.
    async fn apply_if_current(&self, revision: u64, cart: Cart, source: CartSource) -> bool {
        let mut state = self.state.lock().await;
        let latest = self.revision();
        if revision != latest {
            debug!(revision, latest, "Discarding stale cart response");
            return false;
        }
        state.cart = cart;
        state.source = source;
        true
    }

    async fn apply_server(&self, revision: u64, server: &ServerCart) -> bool {
        let cart = Cart::from_items(server.items.iter().map(CartLineItem::from_server).collect());
        self.apply_if_current(revision, cart, CartSource::Server).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn view_of(&self, state: &CartState) -> CartView {
        CartView {
            items: state.cart.items.clone(),
            totals: state.cart.totals(&self.fees),
            source: state.source,
            revision: self.revision(),
        }
    }

    pub async fn view(&self) -> CartView {
        let state = self.state.lock().await;
        self.view_of(&state)
    }

    pub async fn snapshot(&self) -> Cart {
        self.state.lock().await.cart.clone()
    }

    pub async fn source(&self) -> CartSource {
        self.state.lock().await.source
    }

    pub fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn server_backed(&self) -> bool {
        self.client.has_token().await && self.source().await == CartSource::Server
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads the server cart when logged in, the local cart otherwise.
    pub async fn load(&self) -> AppResult<CartView> {
        let revision = self.begin_request();

        if self.client.has_token().await {
            match self.client.cart().get().await {
                Ok(server) => {
                    self.apply_server(revision, &server).await;
                    return Ok(self.view().await);
                }
                Err(e) if e.is_unavailable() => {
                    warn!(error = %e, "Server cart unavailable, using local cart");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let local = self.store.cart().load().await?;
        self.apply_if_current(revision, local, CartSource::Local).await;
        Ok(self.view().await)
    }

    async fn refresh_from_server(&self, revision: u64) -> AppResult<CartView> {
        let server = self.client.cart().get().await?;
        self.apply_server(revision, &server).await;
        Ok(self.view().await)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies `mutate` to the local cart and persists it. Switches a
    /// server-backed cart over to the stored local one first.
    async fn mutate_local<F>(&self, mutate: F) -> AppResult<CartView>
    where
        F: FnOnce(&mut Cart) -> CoreResult<()>,
    {
        let mut state = self.state.lock().await;
        if state.source == CartSource::Server {
            state.cart = self.store.cart().load().await?;
            state.source = CartSource::Local;
        }
        self.begin_request();

        let mut next = state.cart.clone();
        mutate(&mut next)?;
        self.store.cart().save(&next).await?;
        state.cart = next;
        Ok(self.view_of(&state))
    }

    /// True for errors that should fall back to the local cart.
    fn fall_back(error: &ClientError, action: &str) -> bool {
        if error.is_unavailable() {
            warn!(error = %error, action, "Cart server unavailable, falling back to local cart");
            true
        } else {
            false
        }
    }

    pub async fn add(
        &self,
        product: &Product,
        period: RentalPeriod,
        quantity: i64,
    ) -> AppResult<CartView> {
        validate_quantity(quantity)?;
        validate_rental_period(&period)?;

        if self.client.has_token().await {
            let revision = self.begin_request();
            match self.client.cart().add_item(&product.id, quantity, period).await {
                Ok(item) => {
                    info!(product_id = %product.id, item_id = %item.id, quantity, "Added to cart");
                    return self.refresh_from_server(revision).await;
                }
                Err(e) if Self::fall_back(&e, "add") => {}
                Err(e) => return Err(e.into()),
            }
        }

        let line = CartLineItem::from_product(product, period, quantity);
        let view = self
            .mutate_local(|cart| cart.add_item(line).map(|_| ()))
            .await?;
        info!(product_id = %product.id, quantity, "Added to local cart");
        Ok(view)
    }

    /// Sets a line's quantity. Below 1 removes the line.
    pub async fn update_quantity(&self, line_id: &str, quantity: i64) -> AppResult<CartView> {
        if quantity < 1 {
            return self.remove(line_id).await;
        }
        validate_quantity(quantity)?;

        if self.server_backed().await {
            let revision = self.begin_request();
            match self.client.cart().update_quantity(line_id, quantity).await {
                Ok(_) => return self.refresh_from_server(revision).await,
                Err(e) if Self::fall_back(&e, "update_quantity") => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.mutate_local(|cart| cart.update_quantity(line_id, quantity))
            .await
    }

    pub async fn remove(&self, line_id: &str) -> AppResult<CartView> {
        if self.server_backed().await {
            let revision = self.begin_request();
            match self.client.cart().remove_item(line_id).await {
                Ok(()) => return self.refresh_from_server(revision).await,
                Err(e) if Self::fall_back(&e, "remove") => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.mutate_local(|cart| cart.remove_item(line_id).map(|_| ()))
            .await
    }

    pub async fn clear(&self) -> AppResult<CartView> {
        if self.server_backed().await {
            let revision = self.begin_request();
            match self.client.cart().clear().await {
                Ok(()) => {
                    info!("Server cart cleared");
                    return self.refresh_from_server(revision).await;
                }
                Err(e) if Self::fall_back(&e, "clear") => {}
                Err(e) => return Err(e.into()),
            }
        }

        let view = self
            .mutate_local(|cart| {
                cart.clear();
                Ok(())
            })
            .await?;
        info!("Local cart cleared");
        Ok(view)
    }

    /// Removes the given lines after checkout. Lines the server refuses to
    /// delete stay in the cart and are logged.
    pub async fn remove_lines(&self, line_ids: &[String]) -> AppResult<CartView> {
        if line_ids.is_empty() {
            return Ok(self.view().await);
        }

        if self.server_backed().await {
            let revision = self.begin_request();
            for line_id in line_ids {
                if let Err(e) = self.client.cart().remove_item(line_id).await {
                    warn!(line_id = %line_id, error = %e, "Could not remove checked-out line");
                }
            }
            return match self.refresh_from_server(revision).await {
                Ok(view) => Ok(view),
                Err(e) => {
                    warn!(error = %e, "Could not refresh cart after checkout");
                    Ok(self.view().await)
                }
            };
        }

        self.mutate_local(|cart| {
            cart.remove_lines(line_ids);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use melar_client::ClientConfig;
    use melar_core::Money;
    use melar_store::StoreConfig;
    use serde_json::json;

    fn period(start: u32, end: u32) -> RentalPeriod {
        RentalPeriod::new(
            NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
        )
    }

    fn product(id: &str, price: &str, shop: i64) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Product {}", id),
            "price": price,
            "owner_info": {"id": shop, "name": format!("Shop {}", shop)}
        }))
        .unwrap()
    }

    async fn local_store() -> (Store, CartStore) {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        let carts = CartStore::new(store.clone(), client, FeeSchedule::default());
        (store, carts)
    }

    #[tokio::test]
    async fn test_local_cart_totals() {
        let (_, carts) = local_store().await;

        let view = carts.add(&product("7", "45.99", 3), period(1, 3), 1).await.unwrap();

        assert_eq!(view.source, CartSource::Local);
        assert_eq!(view.totals.money.subtotal.to_decimal_string(), "137.97");
        assert_eq!(view.totals.money.service_fee, Money::parse("6.8985").unwrap());
        assert_eq!(view.totals.money.tax, Money::parse("13.797").unwrap());
        assert_eq!(view.totals.money.grand_total, Money::parse("158.6655").unwrap());
    }

    #[tokio::test]
    async fn test_local_mutations_persist() {
        let (store, carts) = local_store().await;
        let p = product("7", "10.00", 3);

        carts.add(&p, period(1, 2), 1).await.unwrap();
        let view = carts.add(&p, period(1, 2), 2).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 3);

        let line_id = view.items[0].line_id.clone();
        carts.update_quantity(&line_id, 5).await.unwrap();
        assert_eq!(store.cart().load().await.unwrap().total_quantity(), 5);

        let view = carts.update_quantity(&line_id, 0).await.unwrap();
        assert!(view.items.is_empty());
        assert!(store.cart().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_any_change() {
        let (_, carts) = local_store().await;
        let p = product("7", "10.00", 3);

        assert!(carts.add(&p, period(3, 1), 1).await.is_err());
        assert!(carts.add(&p, period(1, 3), 0).await.is_err());
        assert!(carts.add(&p, period(1, 3), 1000).await.is_err());
        assert!(carts.view().await.items.is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (_, carts) = local_store().await;

        let older = carts.begin_request();
        let newer = carts.begin_request();

        let stale = Cart::from_items(vec![CartLineItem::from_product(
            &product("1", "1.00", 1),
            period(1, 1),
            1,
        )]);
        assert!(!carts.apply_if_current(older, stale, CartSource::Server).await);
        assert!(carts.view().await.items.is_empty());

        assert!(carts.apply_if_current(newer, Cart::new(), CartSource::Server).await);
        assert_eq!(carts.source().await, CartSource::Server);
    }

    #[tokio::test]
    async fn test_load_restores_local_cart() {
        let (store, carts) = local_store().await;
        carts.add(&product("7", "10.00", 3), period(1, 2), 2).await.unwrap();

        let client = ApiClient::new(ClientConfig::default()).unwrap();
        let reopened = CartStore::new(store, client, FeeSchedule::default());
        let view = reopened.load().await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.totals.total_quantity, 2);
    }
}
