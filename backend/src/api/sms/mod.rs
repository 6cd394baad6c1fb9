//! Module for the SMS domain API.
//!
//! Templates, automation rules, the outbound message queue, opt-outs and
//! usage statistics. Actual delivery happens in `services::dispatcher`.

pub mod handlers;
pub mod models;
pub mod routes;
