//! # Catalog Browsing
//!
//! Product search, filters, and sort orders for listing pages. The backend
//! returns the full list; narrowing it happens here.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{Product, Shop};

/// Sort orders offered on the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// Highest rated first.
    Rating,
}

impl FromStr for ProductSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "price_asc" | "price" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "name_asc" | "name" => Ok(ProductSort::NameAsc),
            "name_desc" => Ok(ProductSort::NameDesc),
            "rating" => Ok(ProductSort::Rating),
            other => Err(CoreError::Validation(ValidationError::InvalidFormat {
                field: "sort".to_string(),
                reason: format!("unknown sort order '{}'", other),
            })),
        }
    }
}

/// Product listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// `Some(true)` for available only, `Some(false)` for rented-out only.
    pub available: Option<bool>,
    pub min_rating: Option<f64>,
    pub sort: Option<ProductSort>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&query);
            let in_description = product.description.to_lowercase().contains(&query);
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            let product_category = product
                .category_name
                .as_deref()
                .or(product.category.as_deref());
            if product_category != Some(category) {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.available.is_some_and(|wanted| product.available != wanted) {
            return false;
        }
        if self.min_rating.is_some_and(|min| product.rating < min) {
            return false;
        }
        true
    }

    /// Filters, then sorts, a product list.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort {
            Some(ProductSort::PriceAsc) => result.sort_by_key(|p| p.price),
            Some(ProductSort::PriceDesc) => result.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(ProductSort::NameAsc) => result.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(ProductSort::NameDesc) => result.sort_by(|a, b| b.name.cmp(&a.name)),
            Some(ProductSort::Rating) => result.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            None => {}
        }
        result
    }
}

/// Case-insensitive shop search over name, location, and description.
pub fn search_shops(shops: &[Shop], query: &str) -> Vec<Shop> {
    let query = query.trim().to_lowercase();
    shops
        .iter()
        .filter(|shop| {
            query.is_empty()
                || shop.name.to_lowercase().contains(&query)
                || shop.location.to_lowercase().contains(&query)
                || shop.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}
