//! # Repository Module
//!
//! Typed views over the key-value table.
//!
//! ```text
//! Store
//!  ├── kv()       KvRepository       get/set/remove JSON by key
//!  ├── session()  SessionRepository  authToken, user, melarUsers
//!  ├── cart()     CartRepository     cart
//!  ├── catalog()  CatalogRepository  melarUserShops, melar*Products*
//!  └── records()  RecordRepository   melarUserRentals_*, melarShopOrders_*
//! ```
//!
//! Every repository except [`kv::KvRepository`] is a thin typed wrapper that
//! owns its keys; nothing outside this module builds key strings.

pub mod cart;
pub mod catalog;
pub mod kv;
pub mod records;
pub mod session;
