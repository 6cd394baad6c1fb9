//! Handler functions for the employees API.
//!
//! Departments, positions, employee records with generated employee numbers,
//! attendance with derived hours, leave management and payroll.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::AppState;

use super::models::{
    ApproveLeaveRequest, Attendance, AttendanceFilter, CreateDepartment, CreateEmployee,
    CreateLeaveRequest, CreateLeaveType, CreatePayroll, CreatePosition, Department, Employee,
    EmployeeStatus, LeaveRequest, LeaveStatus, LeaveType, Payroll, PayrollStatus, Position,
    RecordAttendance, RejectLeaveRequest, net_salary, worked_hours,
};

pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, ApiError> {
    let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(departments))
}

pub async fn create_department(
    State(state): State<AppState>,
    Json(body): Json<CreateDepartment>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    body.validate()?;
    let now = Utc::now();
    let department = sqlx::query_as::<_, Department>(
        r#"
        INSERT INTO departments (name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn list_positions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Position>>, ApiError> {
    let positions = sqlx::query_as::<_, Position>("SELECT * FROM positions ORDER BY title")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(positions))
}

pub async fn create_position(
    State(state): State<AppState>,
    Json(body): Json<CreatePosition>,
) -> Result<(StatusCode, Json<Position>), ApiError> {
    body.validate()?;
    let department_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE id = ?")
        .bind(body.department_id)
        .fetch_one(&state.pool)
        .await?;
    if department_exists == 0 {
        return Err(ApiError::NotFound("department"));
    }
    let now = Utc::now();
    let position = sqlx::query_as::<_, Position>(
        r#"
        INSERT INTO positions (title, department_id, description, base_salary, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.title)
    .bind(body.department_id)
    .bind(&body.description)
    .bind(body.base_salary)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(position)))
}

/// Next employee number for the year, continuing from the stored maximum.
async fn next_employee_number(pool: &sqlx::SqlitePool, year: i32) -> Result<String, sqlx::Error> {
    let prefix = format!("EMP{year}");
    let last: Option<String> = sqlx::query_scalar(
        "SELECT employee_number FROM employees WHERE employee_number LIKE ? ORDER BY employee_number DESC LIMIT 1",
    )
    .bind(format!("{prefix}%"))
    .fetch_optional(pool)
    .await?;
    let next = last
        .and_then(|number| number[prefix.len()..].parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    Ok(format!("{prefix}{next:04}"))
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY employee_number")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(employees))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<CreateEmployee>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    body.validate()?;
    let position_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM positions WHERE id = ?")
        .bind(body.position_id)
        .fetch_one(&state.pool)
        .await?;
    if position_exists == 0 {
        return Err(ApiError::NotFound("position"));
    }
    let now = Utc::now();
    let employee_number = next_employee_number(&state.pool, now.year()).await?;
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees
            (id, employee_number, position_id, employment_type, hire_date, phone,
             emergency_contact_name, emergency_contact_phone, address, date_of_birth,
             national_id, bank_account, salary, first_name, last_name, notes,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&employee_number)
    .bind(body.position_id)
    .bind(body.employment_type)
    .bind(body.hire_date)
    .bind(&body.phone)
    .bind(&body.emergency_contact_name)
    .bind(&body.emergency_contact_phone)
    .bind(&body.address)
    .bind(body.date_of_birth)
    .bind(&body.national_id)
    .bind(&body.bank_account)
    .bind(body.salary)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn employee_by_id(pool: &sqlx::SqlitePool, id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    employee_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("employee"))
}

pub async fn terminate_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    let employee = employee_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;
    if employee.status == EmployeeStatus::Terminated {
        return Err(ApiError::Conflict("employee is already terminated".into()));
    }
    let now = Utc::now();
    let updated = sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees
        SET status = 'terminated', termination_date = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(now.date_naive())
    .bind(now)
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Query(filter): Query<AttendanceFilter>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    let mut sql = String::from("SELECT * FROM attendance WHERE 1 = 1");
    if filter.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if filter.date.is_some() {
        sql.push_str(" AND date = ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut query = sqlx::query_as::<_, Attendance>(&sql);
    if let Some(employee_id) = filter.employee_id {
        query = query.bind(employee_id);
    }
    if let Some(date) = filter.date {
        query = query.bind(date);
    }
    Ok(Json(query.fetch_all(&state.pool).await?))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    Json(body): Json<RecordAttendance>,
) -> Result<(StatusCode, Json<Attendance>), ApiError> {
    body.validate()?;
    if employee_by_id(&state.pool, body.employee_id).await?.is_none() {
        return Err(ApiError::NotFound("employee"));
    }
    let (hours, overtime) = match (body.check_in, body.check_out) {
        (Some(check_in), Some(check_out)) => worked_hours(check_in, check_out),
        _ => (0.0, 0.0),
    };
    let now = Utc::now();
    let attendance = sqlx::query_as::<_, Attendance>(
        r#"
        INSERT INTO attendance
            (employee_id, date, check_in, check_out, status, hours_worked,
             overtime_hours, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(body.employee_id)
    .bind(body.date)
    .bind(body.check_in)
    .bind(body.check_out)
    .bind(body.status)
    .bind(hours)
    .bind(overtime)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

pub async fn list_leave_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaveType>>, ApiError> {
    let leave_types = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(leave_types))
}

pub async fn create_leave_type(
    State(state): State<AppState>,
    Json(body): Json<CreateLeaveType>,
) -> Result<(StatusCode, Json<LeaveType>), ApiError> {
    body.validate()?;
    let leave_type = sqlx::query_as::<_, LeaveType>(
        r#"
        INSERT INTO leave_types
            (name, description, max_days_per_year, is_paid, requires_approval, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.max_days_per_year)
    .bind(body.is_paid)
    .bind(body.requires_approval)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(leave_type)))
}

pub async fn list_leave_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaveRequest>>, ApiError> {
    let requests =
        sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(requests))
}

pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(body): Json<CreateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequest>), ApiError> {
    body.validate()?;
    if body.end_date < body.start_date {
        return Err(ApiError::Validation("end date precedes start date".into()));
    }
    if employee_by_id(&state.pool, body.employee_id).await?.is_none() {
        return Err(ApiError::NotFound("employee"));
    }
    let type_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leave_types WHERE id = ?")
        .bind(body.leave_type_id)
        .fetch_one(&state.pool)
        .await?;
    if type_exists == 0 {
        return Err(ApiError::NotFound("leave type"));
    }
    let days_requested = body
        .days_requested
        .unwrap_or((body.end_date - body.start_date).num_days() + 1);
    let now = Utc::now();
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        INSERT INTO leave_requests
            (id, employee_id, leave_type_id, start_date, end_date, days_requested,
             reason, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.employee_id)
    .bind(body.leave_type_id)
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(days_requested)
    .bind(&body.reason)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn leave_request_by_id(
    pool: &sqlx::SqlitePool,
    id: Uuid,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn approve_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveLeaveRequest>,
) -> Result<Json<LeaveRequest>, ApiError> {
    let request = leave_request_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("leave request"))?;
    if request.status != LeaveStatus::Pending {
        return Err(ApiError::Conflict("only pending requests can be approved".into()));
    }
    let updated = sqlx::query_as::<_, LeaveRequest>(
        r#"
        UPDATE leave_requests
        SET status = 'approved', approved_by = ?, approval_date = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&body.approved_by)
    .bind(Utc::now())
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn reject_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectLeaveRequest>,
) -> Result<Json<LeaveRequest>, ApiError> {
    body.validate()?;
    let request = leave_request_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("leave request"))?;
    if request.status != LeaveStatus::Pending {
        return Err(ApiError::Conflict("only pending requests can be rejected".into()));
    }
    let updated = sqlx::query_as::<_, LeaveRequest>(
        r#"
        UPDATE leave_requests
        SET status = 'rejected', rejection_reason = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&body.rejection_reason)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn cancel_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveRequest>, ApiError> {
    let request = leave_request_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("leave request"))?;
    if !matches!(request.status, LeaveStatus::Pending | LeaveStatus::Approved) {
        return Err(ApiError::Conflict(
            "only pending or approved requests can be cancelled".into(),
        ));
    }
    let updated = sqlx::query_as::<_, LeaveRequest>(
        "UPDATE leave_requests SET status = 'cancelled', updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn list_payrolls(
    State(state): State<AppState>,
) -> Result<Json<Vec<Payroll>>, ApiError> {
    let payrolls =
        sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls ORDER BY period_end DESC")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(payrolls))
}

pub async fn create_payroll(
    State(state): State<AppState>,
    Json(body): Json<CreatePayroll>,
) -> Result<(StatusCode, Json<Payroll>), ApiError> {
    body.validate()?;
    if body.period_end < body.period_start {
        return Err(ApiError::Validation("period end precedes period start".into()));
    }
    let employee = employee_by_id(&state.pool, body.employee_id)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;
    let basic_salary = body.basic_salary.unwrap_or(employee.salary);
    if basic_salary < 0.0 {
        return Err(ApiError::Validation("basic salary must not be negative".into()));
    }
    let net = net_salary(
        basic_salary,
        body.overtime_amount,
        body.allowances,
        body.deductions,
        body.tax_deduction,
    );
    let payroll = sqlx::query_as::<_, Payroll>(
        r#"
        INSERT INTO payrolls
            (id, employee_id, period_start, period_end, basic_salary, overtime_amount,
             allowances, deductions, tax_deduction, net_salary, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.employee_id)
    .bind(body.period_start)
    .bind(body.period_end)
    .bind(basic_salary)
    .bind(body.overtime_amount)
    .bind(body.allowances)
    .bind(body.deductions)
    .bind(body.tax_deduction)
    .bind(net)
    .bind(&body.notes)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(payroll)))
}

pub async fn get_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payroll>, ApiError> {
    sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("payroll"))
}

async fn transition_payroll(
    state: &AppState,
    id: Uuid,
    from: PayrollStatus,
    to: PayrollStatus,
) -> Result<Payroll, ApiError> {
    let payroll = sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("payroll"))?;
    if payroll.status != from {
        return Err(ApiError::Conflict(format!(
            "payroll is {:?}, expected {:?}",
            payroll.status, from
        )));
    }
    let updated = sqlx::query_as::<_, Payroll>(
        "UPDATE payrolls SET status = ?, processed_at = ? WHERE id = ? RETURNING *",
    )
    .bind(to)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(updated)
}

pub async fn approve_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payroll>, ApiError> {
    let payroll = transition_payroll(&state, id, PayrollStatus::Draft, PayrollStatus::Approved).await?;
    Ok(Json(payroll))
}

pub async fn pay_payroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payroll>, ApiError> {
    let payroll = transition_payroll(&state, id, PayrollStatus::Approved, PayrollStatus::Paid).await?;
    Ok(Json(payroll))
}
