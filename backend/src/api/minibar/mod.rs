//! Module for the minibar domain API.
//!
//! Product catalog, per-room minibars, consumption tracking and billing.

pub mod handlers;
pub mod models;
pub mod routes;
