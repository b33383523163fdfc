//! Products, categories, and reviews.

use melar_core::forms::{ProductForm, ReviewForm};
use melar_core::{Category, Product, Review};
use tracing::info;

use crate::client::ApiClient;
use crate::error::ClientResult;

pub struct CatalogApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CatalogApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        CatalogApi { client }
    }

    /// `GET /products/`
    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.client.get_list("/products/", &[]).await
    }

    /// `GET /products/{id}/`
    pub async fn product(&self, product_id: &str) -> ClientResult<Product> {
        self.client
            .get(&format!("/products/{}/", product_id))
            .await
    }

    /// `POST /products/`. The form must carry the seller's `shop_id`.
    pub async fn create_product(&self, form: &ProductForm) -> ClientResult<Product> {
        self.client.require_token().await?;
        let product: Product = self.client.post("/products/", form).await?;
        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// `PATCH /products/{id}/`
    pub async fn update_product(&self, product_id: &str, form: &ProductForm) -> ClientResult<Product> {
        self.client.require_token().await?;
        self.client
            .patch(&format!("/products/{}/", product_id), form)
            .await
    }

    /// `DELETE /products/{id}/`
    pub async fn delete_product(&self, product_id: &str) -> ClientResult<()> {
        self.client.require_token().await?;
        self.client
            .delete(&format!("/products/{}/", product_id))
            .await?;
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    /// `GET /categories/`
    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.client.get_list("/categories/", &[]).await
    }

    /// `GET /reviews/`, optionally narrowed to one product.
    pub async fn reviews(&self, product_id: Option<&str>) -> ClientResult<Vec<Review>> {
        let query: Vec<(&str, String)> = product_id
            .map(|id| vec![("product_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_list("/reviews/", &query).await
    }

    /// `POST /reviews/`
    pub async fn create_review(&self, form: &ReviewForm) -> ClientResult<Review> {
        self.client.require_token().await?;
        self.client.post("/reviews/", form).await
    }
}
