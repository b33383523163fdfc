//! Cart commands that need more than the cart store: adding by product id.

use melar_core::RentalPeriod;
use tracing::debug;

use crate::commands::catalog::get_product;
use crate::error::{AppError, AppResult};
use crate::state::CartView;
use crate::App;

/// Looks the product up and adds it to the cart.
///
/// Unavailable products are refused before anything is sent.
pub async fn add_product(
    app: &App,
    product_id: &str,
    period: RentalPeriod,
    quantity: i64,
) -> AppResult<CartView> {
    let product = get_product(app, product_id).await?;
    if !product.available {
        return Err(AppError::validation(format!(
            "{} is not available for rent",
            product.name
        )));
    }
    debug!(product_id = %product.id, days = period.day_count(), quantity, "Adding to cart");
    app.cart.add(&product, period, quantity).await
}

/// The cart as it is now, reloaded from its backing source.
pub async fn show(app: &App) -> AppResult<CartView> {
    app.cart.load().await
}
