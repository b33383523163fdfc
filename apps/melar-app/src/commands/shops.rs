//! Shop commands: browsing, creation, and the seller's own shop settings.

use melar_core::catalog::search_shops;
use melar_core::forms::ShopForm;
use melar_core::{Order, Product, Shop};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::events::NavigationEvent;
use crate::App;

/// Lists shops, optionally narrowed by a search over name, location, and
/// description. Uses the last snapshot when the backend is unreachable.
pub async fn list_shops(app: &App, query: Option<&str>) -> AppResult<Vec<Shop>> {
    let shops = match app.client.shops().list().await {
        Ok(shops) => {
            if let Err(e) = app.store.catalog().save_shops(&shops).await {
                warn!(error = %e, "Could not save shop snapshot");
            }
            shops
        }
        Err(e) if e.is_unavailable() => {
            warn!(error = %e, "Shop list unavailable, using last snapshot");
            app.store.catalog().shops().await?
        }
        Err(e) => return Err(e.into()),
    };

    Ok(match query {
        Some(q) if !q.trim().is_empty() => search_shops(&shops, q),
        _ => shops,
    })
}

pub async fn get_shop(app: &App, shop_id: &str) -> AppResult<Shop> {
    match app.client.shops().get(shop_id).await {
        Ok(shop) => Ok(shop),
        Err(e) if e.is_unavailable() => {
            warn!(shop_id = %shop_id, error = %e, "Shop unavailable, checking snapshot");
            app.store
                .catalog()
                .shop(shop_id)
                .await?
                .ok_or_else(|| e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// A shop's products, with the same snapshot fallback as the listings.
pub async fn shop_products(app: &App, shop_id: &str) -> AppResult<Vec<Product>> {
    match app.client.shops().products(shop_id).await {
        Ok(products) => {
            if let Err(e) = app.store.catalog().save_shop_products(shop_id, &products).await {
                warn!(shop_id = %shop_id, error = %e, "Could not save shop products");
            }
            Ok(products)
        }
        Err(e) if e.is_unavailable() => {
            warn!(shop_id = %shop_id, error = %e, "Shop products unavailable, using snapshot");
            Ok(app.store.catalog().shop_products(shop_id).await?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Orders placed with a shop. Only its owner may ask.
pub async fn shop_orders(app: &App, shop_id: &str) -> AppResult<Vec<Order>> {
    let (_, own_shop) = app.session.require_shop().await?;
    if own_shop != shop_id {
        return Err(AppError::new(
            ErrorCode::Rejected,
            "You can only view orders of your own shop",
        ));
    }
    Ok(app.client.shops().orders(shop_id).await?)
}

/// Opens a shop for the logged-in user. A user owns at most one shop.
pub async fn create_shop(app: &App, form: &ShopForm) -> AppResult<(Shop, NavigationEvent)> {
    let user = app.session.require_user().await?;
    if user.has_shop() {
        return Err(AppError::validation("You already have a shop"));
    }
    form.validate()?;

    let shop = app.client.shops().create(form).await?;
    app.session.set_shop(Some(shop.id.clone())).await?;
    if let Err(e) = app.store.catalog().upsert_shop(&shop).await {
        warn!(shop_id = %shop.id, error = %e, "Could not save new shop to snapshot");
    }

    info!(shop_id = %shop.id, user_id = %user.id, "Shop created");
    let event = NavigationEvent::ShopCreated {
        shop_id: shop.id.clone(),
    };
    Ok((shop, event))
}

/// Updates the logged-in user's shop settings.
pub async fn update_shop(app: &App, form: &ShopForm) -> AppResult<Shop> {
    let (_, shop_id) = app.session.require_shop().await?;
    form.validate()?;

    let shop = app.client.shops().update(&shop_id, form).await?;
    if let Err(e) = app.store.catalog().upsert_shop(&shop).await {
        warn!(shop_id = %shop.id, error = %e, "Could not update shop snapshot");
    }
    info!(shop_id = %shop.id, "Shop updated");
    Ok(shop)
}
