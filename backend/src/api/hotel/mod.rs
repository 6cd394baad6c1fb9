//! Module for the hotel domain API.
//!
//! Rooms and room types, guest records, reservations and their payments.

pub mod handlers;
pub mod models;
pub mod routes;
