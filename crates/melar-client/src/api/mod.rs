//! Endpoint groups. Each borrows the [`ApiClient`](crate::ApiClient) and
//! maps one backend resource.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod shops;
