//! # Cart
//!
//! The buyer's cart: rental line items plus the totals derived from them.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  add_item(line)       same product + same period?  ──► quantity += n    │
//! │                       otherwise                    ──► push new line    │
//! │                                                                         │
//! │  update_quantity(id,q) q < 1  ──► remove line                           │
//! │                        q > 999 ──► QuantityTooLarge                     │
//! │                                                                         │
//! │  remove_item(id) / remove_lines(ids) / clear()                          │
//! │                                                                         │
//! │  totals(fees) ──► item count, quantity, subtotal/fee/tax/grand total    │
//! │                   (recomputed every call, never cached)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - No two lines share (product, rental period)
//! - Every quantity is in 1..=999
//! - At most 100 lines

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::UNKNOWN_SELLER;
use crate::pricing::{checked_line_total, line_total, FeeSchedule, MoneyTotals, RentalPeriod};
use crate::types::{Product, ServerCartItem};
use crate::validation::{validate_price, validate_quantity, validate_rental_period};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Line Items
// =============================================================================

/// One product rented for one period.
///
/// ## Snapshot
/// Name, price, and seller are frozen when the line is added, so the cart
/// keeps showing what the buyer agreed to even if the product changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Local uuid, or the server's cart-item id when backed by `/cart-items/`.
    pub line_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_per_day: Money,
    pub quantity: i64,
    pub rental_start: NaiveDate,
    pub rental_end: NaiveDate,
    /// Owning shop. `None` lands in the unknown-seller group at checkout.
    pub seller_id: Option<String>,
    pub seller_name: Option<String>,
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Snapshots a product into a new line with a fresh local id.
    pub fn from_product(product: &Product, period: RentalPeriod, quantity: i64) -> Self {
        CartLineItem {
            line_id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price_per_day: product.price,
            quantity,
            rental_start: period.start_date,
            rental_end: period.end_date,
            seller_id: product.shop_id().map(str::to_string),
            seller_name: product.shop_display_name().map(str::to_string),
            image: product.main_image().map(str::to_string),
            added_at: Utc::now(),
        }
    }

    /// Converts a server cart entry. The server's item id becomes the line id.
    ///
    /// Server entries usually carry only the shop name. A name is not a shop
    /// key (two shops may share one), so `seller_id` stays `None` unless the
    /// entry sends a real id. See [`Self::resolve_seller`].
    pub fn from_server(item: &ServerCartItem) -> Self {
        let product = &item.product_detail;
        CartLineItem {
            line_id: item.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price_per_day: product.price,
            quantity: item.quantity,
            rental_start: item.start_date,
            rental_end: item.end_date,
            seller_id: product.shop_id.clone(),
            seller_name: product.shop_name.clone(),
            image: product.main_image.clone(),
            added_at: item.added_at.unwrap_or_else(Utc::now),
        }
    }

    /// Fills in the owning shop from the full product record.
    pub fn resolve_seller(&mut self, product: &Product) {
        if let Some(id) = product.shop_id() {
            self.seller_id = Some(id.to_string());
            if let Some(name) = product.shop_display_name() {
                self.seller_name = Some(name.to_string());
            }
        }
    }

    pub fn period(&self) -> RentalPeriod {
        RentalPeriod::new(self.rental_start, self.rental_end)
    }

    pub fn day_count(&self) -> i64 {
        self.period().day_count()
    }

    /// `unit price × days × quantity`.
    pub fn line_total(&self) -> Money {
        line_total(self.unit_price_per_day, self.day_count(), self.quantity)
    }

    /// Grouping key for checkout.
    pub fn seller_key(&self) -> &str {
        self.seller_id.as_deref().unwrap_or(UNKNOWN_SELLER)
    }

    /// True when `other` should merge into this line instead of being added.
    pub fn same_rental(&self, product_id: &str, period: &RentalPeriod) -> bool {
        self.product_id == product_id && self.period() == *period
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartLineItem>,
    /// When the cart was created or last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builds a cart from lines that were already validated elsewhere
    /// (the server, or a stored snapshot).
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Cart {
            items,
            created_at: Utc::now(),
        }
    }

    /// Adds a line, or merges it into an existing line for the same product
    /// and the same rental period.
    ///
    /// ## Errors
    /// - `Validation` for quantity out of range, negative price, or an
    ///   inverted rental period
    /// - `QuantityTooLarge` if merging would pass 999
    /// - `CartTooLarge` if a new line would be line 101
    ///
    /// ## Returns
    /// The id of the line that now holds the item.
    pub fn add_item(&mut self, item: CartLineItem) -> CoreResult<String> {
        validate_quantity(item.quantity)?;
        validate_price(item.unit_price_per_day)?;
        let period = item.period();
        validate_rental_period(&period)?;

        let merge = self
            .items
            .iter()
            .position(|line| line.same_rental(&item.product_id, &period));
        if let Some(index) = merge {
            let new_qty = self.items[index].quantity + item.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            let line_id = self.items[index].line_id.clone();
            self.ensure_priceable(Some(&line_id), &item, new_qty)?;
            self.items[index].quantity = new_qty;
            return Ok(line_id);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        self.ensure_priceable(None, &item, item.quantity)?;

        let line_id = item.line_id.clone();
        self.items.push(item);
        Ok(line_id)
    }

    /// Sets a line's quantity. A quantity below 1 removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return self.remove_item(line_id).map(|_| ());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let index = self
            .items
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))?;
        self.ensure_priceable(Some(line_id), &self.items[index], quantity)?;
        self.items[index].quantity = quantity;
        Ok(())
    }

    /// Checks that `line` at `quantity`, in place of `replacing`, keeps the
    /// line total and the cart subtotal inside the money range.
    fn ensure_priceable(
        &self,
        replacing: Option<&str>,
        line: &CartLineItem,
        quantity: i64,
    ) -> CoreResult<()> {
        let candidate = checked_line_total(line.unit_price_per_day, line.day_count(), quantity)
            .ok_or_else(|| CoreError::AmountTooLarge {
                field: "line_total".to_string(),
            })?;
        self.items
            .iter()
            .filter(|other| Some(other.line_id.as_str()) != replacing)
            .try_fold(candidate, |sum, other| sum.checked_add(other.line_total()))
            .map(|_| ())
            .ok_or_else(|| CoreError::AmountTooLarge {
                field: "subtotal".to_string(),
            })
    }

    /// Removes one line and returns it.
    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<CartLineItem> {
        let index = self
            .items
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Removes every listed line. Unknown ids are ignored.
    pub fn remove_lines(&mut self, line_ids: &[String]) {
        self.items
            .retain(|line| !line_ids.iter().any(|id| id == &line.line_id));
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn get(&self, line_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.line_id == line_id)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn totals(&self, fees: &FeeSchedule) -> CartTotals {
        CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            money: fees.totals(self.subtotal()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when every line comes from the same (known) seller.
    pub fn single_seller(&self) -> Option<&str> {
        let first = self.items.first()?.seller_id.as_deref()?;
        self.items
            .iter()
            .all(|line| line.seller_id.as_deref() == Some(first))
            .then_some(first)
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    #[serde(flatten)]
    pub money: MoneyTotals,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShopRef;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn product(id: &str, cents: i64, shop: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            price: Money::from_cents(cents),
            category: None,
            category_name: None,
            rating: 0.0,
            available: true,
            total_individual_rentals: 0,
            images: vec![],
            shop_name: shop.map(|s| format!("Shop {}", s)),
            owner_info: shop.map(|s| ShopRef {
                id: s.to_string(),
                name: format!("Shop {}", s),
            }),
        }
    }

    fn line(id: &str, cents: i64, qty: i64, start: u32, end: u32) -> CartLineItem {
        CartLineItem::from_product(
            &product(id, cents, Some("A")),
            RentalPeriod::new(d(start), d(end)),
            qty,
        )
    }

    #[test]
    fn test_add_and_totals() {
        let mut cart = Cart::new();
        cart.add_item(line("1", 4599, 1, 1, 3)).unwrap();

        let totals = cart.totals(&FeeSchedule::default());
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 1);
        assert_eq!(totals.money.subtotal.to_decimal_string(), "137.97");
        assert_eq!(totals.money.grand_total.to_decimal_string(), "158.6655");
    }

    #[test]
    fn test_same_product_same_period_merges() {
        let mut cart = Cart::new();
        let first = cart.add_item(line("1", 1000, 2, 1, 2)).unwrap();
        let second = cart.add_item(line("1", 1000, 3, 1, 2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_same_product_other_period_is_new_line() {
        let mut cart = Cart::new();
        cart.add_item(line("1", 1000, 1, 1, 2)).unwrap();
        cart.add_item(line("1", 1000, 1, 5, 6)).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_rejects_inverted_period_and_bad_quantity() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(line("1", 1000, 1, 5, 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.add_item(line("1", 1000, 0, 1, 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_cannot_exceed_max_quantity() {
        let mut cart = Cart::new();
        cart.add_item(line("1", 1000, 999, 1, 1)).unwrap();
        assert!(matches!(
            cart.add_item(line("1", 1000, 1, 1, 1)),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(line(&i.to_string(), 100, 1, 1, 1)).unwrap();
        }
        assert!(matches!(
            cart.add_item(line("overflow", 100, 1, 1, 1)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_update_quantity_below_one_removes() {
        let mut cart = Cart::new();
        let id = cart.add_item(line("1", 1000, 2, 1, 1)).unwrap();

        cart.update_quantity(&id, 4).unwrap();
        assert_eq!(cart.get(&id).unwrap().quantity, 4);

        cart.update_quantity(&id, 0).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.update_quantity(&id, 2),
            Err(CoreError::CartLineNotFound(_))
        ));
    }

    #[test]
    fn test_remove_lines_keeps_others() {
        let mut cart = Cart::new();
        let a = cart.add_item(line("1", 1000, 1, 1, 1)).unwrap();
        let b = cart.add_item(line("2", 1000, 1, 1, 1)).unwrap();

        cart.remove_lines(&[a]);
        assert_eq!(cart.item_count(), 1);
        assert!(cart.get(&b).is_some());
    }

    #[test]
    fn test_single_seller() {
        let mut cart = Cart::new();
        assert_eq!(cart.single_seller(), None);

        cart.add_item(line("1", 1000, 1, 1, 1)).unwrap();
        cart.add_item(line("2", 1000, 1, 1, 1)).unwrap();
        assert_eq!(cart.single_seller(), Some("A"));

        let other = CartLineItem::from_product(
            &product("3", 1000, Some("B")),
            RentalPeriod::new(d(1), d(1)),
            1,
        );
        cart.add_item(other).unwrap();
        assert_eq!(cart.single_seller(), None);
    }

    #[test]
    fn test_unknown_seller_key() {
        let item = CartLineItem::from_product(
            &product("1", 1000, None),
            RentalPeriod::new(d(1), d(1)),
            1,
        );
        assert_eq!(item.seller_key(), UNKNOWN_SELLER);
    }

    #[test]
    fn test_huge_line_is_refused_and_totals_never_overflow() {
        let far = RentalPeriod::new(
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
        );
        let mut pricey = product("1", 0, Some("A"));
        pricey.price = Money::parse("1000000.00").unwrap();

        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(CartLineItem::from_product(&pricey, far, 999)),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert!(cart.is_empty());

        // Each line fits alone; together they do not.
        let id = cart
            .add_item(CartLineItem::from_product(&pricey, far, 200))
            .unwrap();
        let mut twin = product("2", 0, Some("A"));
        twin.price = pricey.price;
        assert!(matches!(
            cart.add_item(CartLineItem::from_product(&twin, far, 200)),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert!(matches!(
            cart.update_quantity(&id, 999),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert_eq!(cart.get(&id).unwrap().quantity, 200);

        // Lines that bypass add_item (server carts) still total without panicking.
        cart.items.push(CartLineItem::from_product(&twin, far, 999));
        let totals = cart.totals(&FeeSchedule::default());
        assert_eq!(totals.money.subtotal, Money::from_units(i64::MAX));
        assert_eq!(totals.money.grand_total, Money::from_units(i64::MAX));
    }

    #[test]
    fn test_server_line_without_shop_id_has_unknown_seller() {
        let item: ServerCartItem = serde_json::from_value(serde_json::json!({
            "id": 90,
            "product_detail": {
                "id": 7,
                "name": "Sony A7 III",
                "price": "45.99",
                "shop_name": "Kamera Bandung"
            },
            "quantity": 1,
            "start_date": "2024-01-01",
            "end_date": "2024-01-02"
        }))
        .unwrap();

        let mut line = CartLineItem::from_server(&item);
        assert_eq!(line.line_id, "90");
        assert_eq!(line.seller_id, None);
        assert_eq!(line.seller_name.as_deref(), Some("Kamera Bandung"));
        assert_eq!(line.seller_key(), UNKNOWN_SELLER);

        line.resolve_seller(&product("7", 4599, Some("3")));
        assert_eq!(line.seller_id.as_deref(), Some("3"));
        assert_eq!(line.seller_name.as_deref(), Some("Shop 3"));
    }
}
