//! Module for the employees domain API.
//!
//! HR records, attendance, leave management and payroll.

pub mod handlers;
pub mod models;
pub mod routes;
