//! Rust structs that represent the employees domain tables.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Hours in a standard working day; anything beyond is overtime.
pub const STANDARD_WORK_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Intern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Suspended,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    OnLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: i64,
    pub title: String,
    pub department_id: i64,
    pub description: String,
    pub base_salary: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub employee_number: String,
    pub position_id: i64,
    pub employment_type: EmploymentType,
    pub status: EmployeeStatus,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub phone: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub national_id: String,
    pub bank_account: String,
    pub salary: f64,
    pub first_name: String,
    pub last_name: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub max_days_per_year: i64,
    pub is_paid: bool,
    pub requires_approval: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: String,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub basic_salary: f64,
    pub overtime_amount: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub tax_deduction: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Net pay: gross earnings minus every deduction.
pub fn net_salary(
    basic_salary: f64,
    overtime_amount: f64,
    allowances: f64,
    deductions: f64,
    tax_deduction: f64,
) -> f64 {
    (basic_salary + overtime_amount + allowances) - (deductions + tax_deduction)
}

/// Splits a shift into regular and overtime hours.
///
/// A check-out earlier than the check-in is an overnight shift and wraps to
/// the next day.
pub fn worked_hours(check_in: NaiveTime, check_out: NaiveTime) -> (f64, f64) {
    let mut duration = check_out - check_in;
    if duration < chrono::Duration::zero() {
        duration = duration + chrono::Duration::hours(24);
    }
    let hours = duration.num_seconds() as f64 / 3600.0;
    if hours > STANDARD_WORK_HOURS {
        (STANDARD_WORK_HOURS, hours - STANDARD_WORK_HOURS)
    } else {
        (hours, 0.0)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartment {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePosition {
    #[validate(length(min = 1))]
    pub title: String,
    pub department_id: i64,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub base_salary: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployee {
    pub position_id: i64,
    #[serde(default = "default_employment_type")]
    pub employment_type: EmploymentType,
    pub hire_date: NaiveDate,
    #[validate(length(min = 3))]
    pub phone: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub address: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1))]
    pub national_id: String,
    #[serde(default)]
    pub bank_account: String,
    #[validate(range(min = 0.0))]
    pub salary: f64,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[serde(default)]
    pub notes: String,
}

fn default_employment_type() -> EmploymentType {
    EmploymentType::FullTime
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttendance {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    #[serde(default = "default_attendance_status")]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: String,
}

fn default_attendance_status() -> AttendanceStatus {
    AttendanceStatus::Present
}

#[derive(Debug, Deserialize)]
pub struct AttendanceFilter {
    pub employee_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeaveType {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub max_days_per_year: i64,
    #[serde(default = "default_true")]
    pub is_paid: bool,
    #[serde(default = "default_true")]
    pub requires_approval: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeaveRequest {
    pub employee_id: Uuid,
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day count; derived from the range when absent.
    pub days_requested: Option<i64>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectLeaveRequest {
    #[validate(length(min = 1))]
    pub rejection_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveLeaveRequest {
    #[serde(default)]
    pub approved_by: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePayroll {
    pub employee_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Basic salary override; the employee's salary when absent.
    pub basic_salary: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub overtime_amount: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub allowances: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub deductions: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub tax_deduction: f64,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_salary_subtracts_all_deductions() {
        let net = net_salary(3000.0, 250.0, 100.0, 80.0, 420.0);
        assert!((net - 2850.0).abs() < f64::EPSILON);
    }

    #[test]
    fn worked_hours_splits_overtime() {
        let check_in = NaiveTime::from_hms_opt(8, 0, 0).expect("valid time");
        let check_out = NaiveTime::from_hms_opt(18, 30, 0).expect("valid time");
        let (regular, overtime) = worked_hours(check_in, check_out);
        assert!((regular - STANDARD_WORK_HOURS).abs() < 1e-9);
        assert!((overtime - 2.5).abs() < 1e-9);
    }

    #[test]
    fn worked_hours_handles_overnight_shift() {
        let check_in = NaiveTime::from_hms_opt(22, 0, 0).expect("valid time");
        let check_out = NaiveTime::from_hms_opt(4, 0, 0).expect("valid time");
        let (regular, overtime) = worked_hours(check_in, check_out);
        assert!((regular - 6.0).abs() < 1e-9);
        assert!(overtime.abs() < 1e-9);
    }
}
