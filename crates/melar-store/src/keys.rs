//! # Storage Keys
//!
//! Fixed key names and per-entity key prefixes.
//!
//! ```text
//! authToken                    session token
//! user                         cached logged-in user
//! cart                         offline cart
//! melarUsers                   users seen on this device
//! melarUserShops               shops known locally
//! melarAllDisplayProducts      catalog snapshot
//! melarShopProducts_<shopId>   one shop's products
//! melarShopOrders_<shopId>     one shop's order records
//! melarUserRentals_<userId>    one buyer's rental history
//! ```

pub const AUTH_TOKEN: &str = "authToken";
pub const USER: &str = "user";
pub const CART: &str = "cart";
pub const USERS: &str = "melarUsers";
pub const SHOPS: &str = "melarUserShops";
pub const ALL_PRODUCTS: &str = "melarAllDisplayProducts";

pub const SHOP_PRODUCTS_PREFIX: &str = "melarShopProducts_";
pub const SHOP_ORDERS_PREFIX: &str = "melarShopOrders_";
pub const USER_RENTALS_PREFIX: &str = "melarUserRentals_";

pub fn shop_products(shop_id: &str) -> String {
    format!("{}{}", SHOP_PRODUCTS_PREFIX, shop_id)
}

pub fn shop_orders(shop_id: &str) -> String {
    format!("{}{}", SHOP_ORDERS_PREFIX, shop_id)
}

pub fn user_rentals(user_id: &str) -> String {
    format!("{}{}", USER_RENTALS_PREFIX, user_id)
}
