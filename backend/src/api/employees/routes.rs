//! Defines the HTTP routes for the employees domain.
//!
//! Mounted under `/api/employees`.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/departments",
            get(handlers::list_departments).post(handlers::create_department),
        )
        .route(
            "/positions",
            get(handlers::list_positions).post(handlers::create_position),
        )
        .route(
            "/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route("/employees/:id", get(handlers::get_employee))
        .route("/employees/:id/terminate", post(handlers::terminate_employee))
        .route(
            "/attendance",
            get(handlers::list_attendance).post(handlers::record_attendance),
        )
        .route(
            "/leave-types",
            get(handlers::list_leave_types).post(handlers::create_leave_type),
        )
        .route(
            "/leave-requests",
            get(handlers::list_leave_requests).post(handlers::create_leave_request),
        )
        .route("/leave-requests/:id/approve", post(handlers::approve_leave_request))
        .route("/leave-requests/:id/reject", post(handlers::reject_leave_request))
        .route("/leave-requests/:id/cancel", post(handlers::cancel_leave_request))
        .route(
            "/payrolls",
            get(handlers::list_payrolls).post(handlers::create_payroll),
        )
        .route("/payrolls/:id", get(handlers::get_payroll))
        .route("/payrolls/:id/approve", post(handlers::approve_payroll))
        .route("/payrolls/:id/pay", post(handlers::pay_payroll))
}
