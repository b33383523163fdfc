//! # Catalog Commands
//!
//! Product browsing for everyone, product edits for shop owners.
//!
//! ## Listing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  list_products(filter)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET /products/ ──ok──► save snapshot ──┐                               │
//! │       │                                  │                              │
//! │       └──unreachable──► last snapshot ──┤                               │
//! │                                          ▼                              │
//! │                               filter.apply() (search, category,         │
//! │                               price, availability, rating, sort)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use melar_core::forms::ProductForm;
use melar_core::{Category, Product, ProductFilter};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::events::NavigationEvent;
use crate::App;

/// Lists products matching `filter`.
///
/// Falls back to the last saved snapshot when the backend is unreachable.
pub async fn list_products(app: &App, filter: &ProductFilter) -> AppResult<Vec<Product>> {
    let start = Instant::now();

    let products = match app.client.catalog().products().await {
        Ok(products) => {
            if let Err(e) = app.store.catalog().save_all_products(&products).await {
                warn!(error = %e, "Could not save product snapshot");
            }
            products
        }
        Err(e) if e.is_unavailable() => {
            warn!(error = %e, "Product list unavailable, using last snapshot");
            app.store.catalog().all_products().await?
        }
        Err(e) => return Err(e.into()),
    };

    let total = products.len();
    let matched = filter.apply(&products);
    debug!(
        total,
        matched = matched.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Products listed"
    );
    Ok(matched)
}

pub async fn get_product(app: &App, product_id: &str) -> AppResult<Product> {
    match app.client.catalog().product(product_id).await {
        Ok(product) => Ok(product),
        Err(e) if e.is_unavailable() => {
            warn!(product_id = %product_id, error = %e, "Product unavailable, checking snapshot");
            app.store
                .catalog()
                .all_products()
                .await?
                .into_iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| e.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn categories(app: &App) -> AppResult<Vec<Category>> {
    Ok(app.client.catalog().categories().await?)
}

// =============================================================================
// Seller Edits
// =============================================================================

/// Products of the logged-in user's shop.
pub async fn my_products(app: &App) -> AppResult<Vec<Product>> {
    let (_, shop_id) = app.session.require_shop().await?;
    crate::commands::shops::shop_products(app, &shop_id).await
}

/// Creates a product in the user's shop.
pub async fn create_product(app: &App, form: &ProductForm) -> AppResult<(Product, NavigationEvent)> {
    let (_, shop_id) = app.session.require_shop().await?;
    form.validate()?;

    let mut form = form.clone();
    form.shop_id = Some(shop_id.clone());

    let product = app.client.catalog().create_product(&form).await?;
    remember_shop_product(app, &shop_id, &product).await;

    info!(product_id = %product.id, shop_id = %shop_id, "Product created");
    let event = NavigationEvent::ProductSaved {
        product_id: product.id.clone(),
    };
    Ok((product, event))
}

pub async fn update_product(
    app: &App,
    product_id: &str,
    form: &ProductForm,
) -> AppResult<(Product, NavigationEvent)> {
    let (_, shop_id) = app.session.require_shop().await?;
    form.validate()?;

    let mut form = form.clone();
    form.shop_id = Some(shop_id.clone());

    let product = app.client.catalog().update_product(product_id, &form).await?;
    remember_shop_product(app, &shop_id, &product).await;

    info!(product_id = %product.id, "Product updated");
    let event = NavigationEvent::ProductSaved {
        product_id: product.id.clone(),
    };
    Ok((product, event))
}

/// Deletes products one by one and stops at the first failure. Products
/// deleted before the failure stay deleted.
pub async fn delete_products(app: &App, product_ids: &[String]) -> AppResult<NavigationEvent> {
    app.session.require_shop().await?;
    if product_ids.is_empty() {
        return Err(AppError::validation("Select at least one product"));
    }

    for product_id in product_ids {
        app.client.catalog().delete_product(product_id).await?;
        if let Err(e) = app.store.catalog().forget_product(product_id).await {
            warn!(product_id = %product_id, error = %e, "Could not drop product from snapshots");
        }
        info!(product_id = %product_id, "Product deleted");
    }
    Ok(NavigationEvent::ProductsDeleted)
}

async fn remember_shop_product(app: &App, shop_id: &str, product: &Product) {
    let catalog = app.store.catalog();
    let result = async {
        let mut products = catalog.shop_products(shop_id).await?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => products.push(product.clone()),
        }
        catalog.save_shop_products(shop_id, &products).await
    }
    .await;

    if let Err(e) = result {
        warn!(shop_id = %shop_id, error = %e, "Could not update shop product snapshot");
    }
}
