//! Module for the restaurant domain API.
//!
//! Floor layout, menu, point-of-sale orders and billing.

pub mod handlers;
pub mod models;
pub mod routes;
