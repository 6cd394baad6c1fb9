//! End-to-end API tests over the assembled router with an in-memory
//! database: auth enforcement and the main flows of each domain.

mod common;

use axum::http::StatusCode;
use backend::build_router;
use chrono::{Duration, Utc};
use serde_json::json;

use common::{delete, get, post, post_empty, put, ADMIN_TOKEN};

#[tokio::test]
async fn health_endpoint_is_open() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);
    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (status, _) = get(&app, "/api/hotel/rooms", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/hotel/rooms", Some("ik_bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/hotel/rooms", Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn staff_management_requires_admin_role() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (status, created) = post(
        &app,
        "/api/auth/staff",
        Some(ADMIN_TOKEN),
        json!({ "username": "frontdesk", "display_name": "Front Desk", "role": "staff" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let staff_token = created["api_token"].as_str().expect("token").to_string();

    // The fresh staff token works for domain routes but not for staff admin.
    let (status, _) = get(&app, "/api/hotel/rooms", Some(&staff_token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/api/auth/staff", Some(&staff_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

async fn seed_reservation(app: &axum::Router) -> (String, String, i64) {
    let (status, room_type) = post(
        app,
        "/api/hotel/room-types",
        Some(ADMIN_TOKEN),
        json!({ "name": "Deluxe", "description": "Sea view", "base_price": 150.0, "capacity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, room) = post(
        app,
        "/api/hotel/rooms",
        Some(ADMIN_TOKEN),
        json!({ "number": "302", "room_type_id": room_type["id"], "floor": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, customer) = post(
        app,
        "/api/hotel/customers",
        Some(ADMIN_TOKEN),
        json!({
            "first_name": "Ada",
            "last_name": "Wong",
            "email": "ada@example.com",
            "phone": "+15550100",
            "id_type": "passport",
            "id_number": "P1234567"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let check_in = (Utc::now() + Duration::days(7)).date_naive();
    let check_out = check_in + Duration::days(3);
    let (status, reservation) = post(
        app,
        "/api/hotel/reservations",
        Some(ADMIN_TOKEN),
        json!({
            "customer_id": customer["id"],
            "room_id": room["id"],
            "check_in_date": check_in,
            "check_out_date": check_out,
            "adults": 2
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        reservation["id"].as_str().expect("reservation id").to_string(),
        customer["id"].as_str().expect("customer id").to_string(),
        room["id"].as_i64().expect("room id"),
    )
}

#[tokio::test]
async fn reservation_flow_prices_guards_and_transitions() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (reservation_id, customer_id, room_id) = seed_reservation(&app).await;

    // 3 nights at the room type's base price.
    let (_, reservation) = get(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(reservation["total_amount"], json!(450.0));
    assert_eq!(reservation["status"], "pending");
    let number = reservation["reservation_number"].as_str().expect("number");
    assert!(number.starts_with("RES"));

    // Overlapping dates on the same room are rejected.
    let check_in = (Utc::now() + Duration::days(8)).date_naive();
    let check_out = check_in + Duration::days(2);
    let (status, _) = post(
        &app,
        "/api/hotel/reservations",
        Some(ADMIN_TOKEN),
        json!({
            "customer_id": customer_id,
            "room_id": room_id,
            "check_in_date": check_in,
            "check_out_date": check_out
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Inverted dates are a validation error.
    let (status, _) = post(
        &app,
        "/api/hotel/reservations",
        Some(ADMIN_TOKEN),
        json!({
            "customer_id": customer_id,
            "room_id": room_id,
            "check_in_date": check_out,
            "check_out_date": check_in
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Check-in requires a confirmed reservation.
    let (status, _) = post_empty(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}/check-in"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post_empty(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}/confirm"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, checked_in) = post_empty(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}/check-in"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked_in["status"], "checked_in");
    assert!(checked_in["actual_check_in"].is_string());

    let (_, room) = get(&app, &format!("/api/hotel/rooms/{room_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(room["status"], "occupied");

    // Record and complete a payment.
    let (status, payment) = post(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}/payments"),
        Some(ADMIN_TOKEN),
        json!({ "amount": 450.0, "payment_method": "credit_card" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let payment_id = payment["id"].as_str().expect("payment id");
    let (status, completed) = post_empty(
        &app,
        &format!("/api/hotel/payments/{payment_id}/complete"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    // Check-out frees the room into cleaning.
    let (status, checked_out) = post_empty(
        &app,
        &format!("/api/hotel/reservations/{reservation_id}/check-out"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked_out["status"], "checked_out");
    let (_, room) = get(&app, &format!("/api/hotel/rooms/{room_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(room["status"], "cleaning");
}

#[tokio::test]
async fn employee_numbers_and_payroll_math() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (_, department) = post(
        &app,
        "/api/employees/departments",
        Some(ADMIN_TOKEN),
        json!({ "name": "Housekeeping" }),
    )
    .await;
    let (_, position) = post(
        &app,
        "/api/employees/positions",
        Some(ADMIN_TOKEN),
        json!({
            "title": "Room Attendant",
            "department_id": department["id"],
            "base_salary": 2200.0
        }),
    )
    .await;

    let mut employee_ids = Vec::new();
    for (index, name) in ["Maya", "Jonas"].iter().enumerate() {
        let (status, employee) = post(
            &app,
            "/api/employees/employees",
            Some(ADMIN_TOKEN),
            json!({
                "position_id": position["id"],
                "hire_date": "2024-02-01",
                "phone": "+15550200",
                "date_of_birth": "1994-05-12",
                "national_id": format!("NID-{index}"),
                "salary": 2200.0,
                "first_name": name,
                "last_name": "Krebs"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        employee_ids.push(employee["id"].as_str().expect("employee id").to_string());
        let number = employee["employee_number"].as_str().expect("employee number");
        let year = Utc::now().date_naive().format("%Y").to_string();
        assert_eq!(
            number,
            &format!("EMP{year}{:04}", index + 1),
            "numbers continue within the year"
        );
    }

    // Attendance with an overtime shift.
    let (status, attendance) = post(
        &app,
        "/api/employees/attendance",
        Some(ADMIN_TOKEN),
        json!({
            "employee_id": employee_ids[0],
            "date": "2026-08-03",
            "check_in": "08:00:00",
            "check_out": "18:30:00"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attendance["hours_worked"], json!(8.0));
    assert_eq!(attendance["overtime_hours"], json!(2.5));

    // Duplicate attendance for the same day conflicts.
    let (status, _) = post(
        &app,
        "/api/employees/attendance",
        Some(ADMIN_TOKEN),
        json!({
            "employee_id": employee_ids[0],
            "date": "2026-08-03",
            "check_in": "09:00:00",
            "check_out": "17:00:00"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Payroll computes net server-side and walks draft -> approved -> paid.
    let (status, payroll) = post(
        &app,
        "/api/employees/payrolls",
        Some(ADMIN_TOKEN),
        json!({
            "employee_id": employee_ids[0],
            "period_start": "2026-07-01",
            "period_end": "2026-07-31",
            "overtime_amount": 180.0,
            "allowances": 120.0,
            "deductions": 75.0,
            "tax_deduction": 310.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payroll["basic_salary"], json!(2200.0));
    assert_eq!(payroll["net_salary"], json!(2115.0));
    assert_eq!(payroll["status"], "draft");

    let payroll_id = payroll["id"].as_str().expect("payroll id");
    let (status, _) = post_empty(
        &app,
        &format!("/api/employees/payrolls/{payroll_id}/pay"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "draft cannot be paid directly");
    let (status, approved) = post_empty(
        &app,
        &format!("/api/employees/payrolls/{payroll_id}/approve"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    let (status, paid) = post_empty(
        &app,
        &format!("/api/employees/payrolls/{payroll_id}/pay"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    // Leave request derives the day count and approves.
    let (_, leave_type) = post(
        &app,
        "/api/employees/leave-types",
        Some(ADMIN_TOKEN),
        json!({ "name": "Annual Leave", "max_days_per_year": 25 }),
    )
    .await;
    let (status, request) = post(
        &app,
        "/api/employees/leave-requests",
        Some(ADMIN_TOKEN),
        json!({
            "employee_id": employee_ids[1],
            "leave_type_id": leave_type["id"],
            "start_date": "2026-09-01",
            "end_date": "2026-09-05",
            "reason": "family visit"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["days_requested"], json!(5));
    let request_id = request["id"].as_str().expect("request id");
    let (status, approved) = post(
        &app,
        &format!("/api/employees/leave-requests/{request_id}/approve"),
        Some(ADMIN_TOKEN),
        json!({ "approved_by": "hr.manager" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
}

#[tokio::test]
async fn order_totals_and_bill_settlement() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (_, area) = post(
        &app,
        "/api/restaurant/areas",
        Some(ADMIN_TOKEN),
        json!({ "name": "Terrace", "capacity": 40 }),
    )
    .await;
    let (_, table) = post(
        &app,
        "/api/restaurant/tables",
        Some(ADMIN_TOKEN),
        json!({ "number": "T5", "area_id": area["id"], "capacity": 4 }),
    )
    .await;
    let (_, category) = post(
        &app,
        "/api/restaurant/menu/categories",
        Some(ADMIN_TOKEN),
        json!({ "name": "Mains" }),
    )
    .await;
    let (_, pasta) = post(
        &app,
        "/api/restaurant/menu/items",
        Some(ADMIN_TOKEN),
        json!({
            "name": "Tagliatelle",
            "category_id": category["id"],
            "price": 18.5,
            "cost": 6.0,
            "preparation_minutes": 15
        }),
    )
    .await;
    let (_, wine) = post(
        &app,
        "/api/restaurant/menu/items",
        Some(ADMIN_TOKEN),
        json!({ "name": "House Red", "category_id": category["id"], "price": 7.0 }),
    )
    .await;

    let (status, order) = post(
        &app,
        "/api/restaurant/orders",
        Some(ADMIN_TOKEN),
        json!({ "order_type": "dine_in", "table_id": table["id"], "customer_name": "walk-in" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = order["id"].as_str().expect("order id").to_string();

    let (status, detail) = post(
        &app,
        &format!("/api/restaurant/orders/{order_id}/items"),
        Some(ADMIN_TOKEN),
        json!({ "menu_item_id": pasta["id"], "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["subtotal"], json!(37.0));

    let (_, detail) = post(
        &app,
        &format!("/api/restaurant/orders/{order_id}/items"),
        Some(ADMIN_TOKEN),
        json!({ "menu_item_id": wine["id"], "quantity": 2 }),
    )
    .await;
    assert_eq!(detail["subtotal"], json!(51.0));
    assert_eq!(detail["total_amount"], json!(51.0));
    let wine_item_id = detail["items"][1]["id"].as_i64().expect("item id");

    // Removing a line recomputes totals.
    let (status, detail) = delete(
        &app,
        &format!("/api/restaurant/orders/{order_id}/items/{wine_item_id}"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["subtotal"], json!(37.0));

    let (status, bill) = post(
        &app,
        &format!("/api/restaurant/orders/{order_id}/bill"),
        Some(ADMIN_TOKEN),
        json!({ "tax_rate": 10.0, "service_charge_rate": 5.0, "discount_percentage": 0.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["subtotal"], json!(37.0));
    assert_eq!(bill["tax_amount"], json!(3.7));
    assert_eq!(bill["service_charge"], json!(1.85));
    let total = bill["total_amount"].as_f64().expect("total");
    assert!((total - 42.55).abs() < 1e-9);
    let bill_id = bill["id"].as_str().expect("bill id");

    // Underpayment is rejected.
    let (status, _) = post(
        &app,
        &format!("/api/restaurant/bills/{bill_id}/settle"),
        Some(ADMIN_TOKEN),
        json!({ "payment_method": "cash", "payment_received": 40.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, settled) = post(
        &app,
        &format!("/api/restaurant/bills/{bill_id}/settle"),
        Some(ADMIN_TOKEN),
        json!({ "payment_method": "cash", "payment_received": 50.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["status"], "paid");
    let change = settled["change_amount"].as_f64().expect("change");
    assert!((change - 7.45).abs() < 1e-9);

    let (_, closed_order) = get(
        &app,
        &format!("/api/restaurant/orders/{order_id}"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(closed_order["status"], "completed");
}

#[tokio::test]
async fn minibar_consumption_inventory_and_billing() {
    let (state, _) = common::test_state().await;
    let app = build_router(state);

    let (reservation_id, _, room_id) = seed_reservation(&app).await;

    let (_, water) = post(
        &app,
        "/api/minibar/products",
        Some(ADMIN_TOKEN),
        json!({ "name": "Still Water", "product_type": "water", "price": 4.0, "cost_price": 1.0 }),
    )
    .await;
    let (status, minibar) = post(
        &app,
        "/api/minibar/minibars",
        Some(ADMIN_TOKEN),
        json!({ "room_id": room_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let minibar_id = minibar["id"].as_i64().expect("minibar id");

    let (status, _) = put(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}/inventory"),
        Some(ADMIN_TOKEN),
        json!({ "product_id": water["id"], "quantity": 4, "par_level": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Consumption decrements stock and derives the charge.
    let (status, consumption) = post(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}/consumptions"),
        Some(ADMIN_TOKEN),
        json!({ "reservation_id": reservation_id, "product_id": water["id"], "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(consumption["unit_price"], json!(4.0));
    assert_eq!(consumption["total_amount"], json!(8.0));
    let consumption_id = consumption["id"].as_str().expect("consumption id");

    let (_, detail) = get(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(detail["inventory"][0]["quantity"], json!(2));
    assert_eq!(detail["needs_restocking"], json!(true));

    // Over-consuming what is left conflicts.
    let (status, _) = post(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}/consumptions"),
        Some(ADMIN_TOKEN),
        json!({ "reservation_id": reservation_id, "product_id": water["id"], "quantity": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Confirm, then the reservation billing summary carries 10% tax.
    let (status, _) = post_empty(
        &app,
        &format!("/api/minibar/consumptions/{consumption_id}/confirm"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, summary) = get(
        &app,
        &format!("/api/minibar/reservations/{reservation_id}/billing"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(summary["consumption_count"], json!(1));
    assert_eq!(summary["subtotal"], json!(8.0));
    let tax = summary["tax_amount"].as_f64().expect("tax");
    assert!((tax - 0.8).abs() < 1e-9);
    let total = summary["total_amount"].as_f64().expect("total");
    assert!((total - 8.8).abs() < 1e-9);

    // Restocking tops the inventory back to par.
    let (status, restock) = post_empty(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}/restock"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restock["restocked"][0]["quantity_added"], json!(2));
    let (_, detail) = get(
        &app,
        &format!("/api/minibar/minibars/{minibar_id}"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(detail["inventory"][0]["quantity"], json!(4));
    assert_eq!(detail["needs_restocking"], json!(false));
}
