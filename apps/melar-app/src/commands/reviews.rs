//! Product reviews.
//!
//! A buyer may review a product once, and only after an order containing it
//! has completed.

use melar_core::forms::ReviewForm;
use melar_core::{Order, OrderStatus, Review};
use tracing::info;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::App;

pub async fn list_reviews(app: &App, product_id: Option<&str>) -> AppResult<Vec<Review>> {
    Ok(app.client.catalog().reviews(product_id).await?)
}

/// Average rating, `None` without reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i64 = reviews.iter().map(|r| r.rating).sum();
    Some(sum as f64 / reviews.len() as f64)
}

/// True when one of `orders` completed with `product_id` in it.
pub fn has_completed_rental(orders: &[Order], product_id: &str) -> bool {
    orders.iter().any(|o| {
        o.status == OrderStatus::Completed && o.items.iter().any(|i| i.product == product_id)
    })
}

pub async fn add_review(app: &App, form: &ReviewForm) -> AppResult<Review> {
    form.validate()?;
    let user = app.session.require_user().await?;

    let orders = app.client.orders().list(None).await?;
    if !has_completed_rental(&orders, &form.product) {
        return Err(AppError::new(
            ErrorCode::Rejected,
            "You can review a product after a completed rental",
        ));
    }

    let existing = app.client.catalog().reviews(Some(&form.product)).await?;
    if existing
        .iter()
        .any(|r| r.user.as_ref().is_some_and(|u| u.id == user.id))
    {
        return Err(AppError::new(
            ErrorCode::Rejected,
            "You have already reviewed this product",
        ));
    }

    let review = app.client.catalog().create_review(form).await?;
    info!(product_id = %form.product, review_id = %review.id, rating = form.rating, "Review posted");
    Ok(review)
}
