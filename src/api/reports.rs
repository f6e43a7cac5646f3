use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceQuery, AttendanceStatus};
use crate::model::staff_change::ChangeAction;
use crate::service::reports::{self, DashboardStats};
use crate::store::{AttendanceStore, EmployeeFilter, EmployeeStore, Store};
use crate::utils::time::{days_before, now_local, parse_date};

fn optional_date(raw: &Option<String>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_date(v)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("Invalid {}: expected YYYY-MM-DD", field))),
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportFilter {
    /// Inclusive, `YYYY-MM-DD`
    #[schema(example = "2026-03-01")]
    pub start_date: Option<String>,
    /// Inclusive, `YYYY-MM-DD`
    #[schema(example = "2026-03-31")]
    pub end_date: Option<String>,
    #[schema(example = "NJ-0042")]
    pub employee_id: Option<String>,
    #[schema(example = "late")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportRow {
    pub employee_id: String,
    pub employee_name: String,
    pub department: Option<String>,
    #[schema(example = "2026-03-02 08:05:00 AM")]
    pub clock_in_time: String,
    pub clock_out_time: Option<String>,
    #[schema(example = "2026-03-02")]
    pub date: String,
    #[schema(example = "08:05 AM")]
    pub time: String,
    pub status: AttendanceStatus,
    pub location: String,
}

impl From<AttendanceEntry> for ReportRow {
    fn from(entry: AttendanceEntry) -> Self {
        let r = entry.record;
        Self {
            employee_id: r.employee_id,
            employee_name: entry.employee_name,
            department: entry.department,
            clock_in_time: r.clock_in_time.format("%Y-%m-%d %I:%M:%S %p").to_string(),
            clock_out_time: r
                .clock_out_time
                .map(|t| t.format("%Y-%m-%d %I:%M:%S %p").to_string()),
            date: r.date_only.format("%Y-%m-%d").to_string(),
            time: r.clock_in_time.format("%I:%M %p").to_string(),
            status: r.status,
            location: r.location,
        }
    }
}

/// Attendance across all staff
#[utoipa::path(
    get,
    path = "/api/attendance-report",
    params(ReportFilter),
    responses(
        (status = 200, description = "Matching records, newest day first", body = [ReportRow]),
        (status = 400, description = "Bad date or status filter")
    ),
    tag = "Reports"
)]
pub async fn attendance_report(
    store: web::Data<dyn Store>,
    filter: web::Query<ReportFilter>,
) -> Result<impl Responder, AppError> {
    let status = match filter.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<AttendanceStatus>()
                .map_err(|_| AppError::validation(format!("Unknown status: {}", raw)))?,
        ),
        None => None,
    };
    let query = AttendanceQuery {
        start_date: optional_date(&filter.start_date, "start_date")?,
        end_date: optional_date(&filter.end_date, "end_date")?,
        employee_id: filter.employee_id.clone().filter(|id| !id.trim().is_empty()),
        status,
        ..AttendanceQuery::default()
    };

    let rows: Vec<ReportRow> = store
        .attendance_report(&query)
        .await?
        .into_iter()
        .map(ReportRow::from)
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

/// Today's headline numbers
#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    responses((status = 200, description = "Counts for today", body = DashboardStats)),
    tag = "Reports"
)]
pub async fn dashboard_stats(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let stats = reports::dashboard(store.get_ref(), now_local().date()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Departments with active staff
#[utoipa::path(
    get,
    path = "/api/departments",
    responses((status = 200, description = "Sorted department names", body = Object, example = json!({
        "departments": ["Finance", "Works"],
        "total_departments": 2
    }))),
    tag = "Reports"
)]
pub async fn departments(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let departments = store.departments().await?;
    Ok(HttpResponse::Ok().json(json!({
        "total_departments": departments.len(),
        "departments": departments,
    })))
}

/// Active staff of one department
#[utoipa::path(
    get,
    path = "/api/departments/{department}/staff",
    params(("department" = String, Path, description = "Department name")),
    responses((status = 200, description = "Staff list", body = Object)),
    tag = "Reports"
)]
pub async fn department_staff(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let department = path.into_inner();
    let staff = store
        .list_employees(&EmployeeFilter {
            department: Some(department.clone()),
            active_only: true,
        })
        .await?;

    let rows: Vec<_> = staff
        .iter()
        .map(|e| {
            json!({
                "employee_id": e.employee_id,
                "name": e.name,
                "email": e.email,
                "contact": e.contact,
                "date_added": e.date_added.format("%Y-%m-%d").to_string(),
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "department": department,
        "total_staff": rows.len(),
        "staff": rows,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Attendance of one department's active staff
#[utoipa::path(
    get,
    path = "/api/departments/{department}/attendance-report",
    params(("department" = String, Path, description = "Department name"), DateRange),
    responses(
        (status = 200, description = "Department records", body = Object),
        (status = 400, description = "Bad date")
    ),
    tag = "Reports"
)]
pub async fn department_report(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    range: web::Query<DateRange>,
) -> Result<impl Responder, AppError> {
    let department = path.into_inner();
    let query = AttendanceQuery {
        start_date: optional_date(&range.start_date, "start_date")?,
        end_date: optional_date(&range.end_date, "end_date")?,
        department: Some(department.clone()),
        active_only: true,
        ..AttendanceQuery::default()
    };
    let rows: Vec<ReportRow> = store
        .attendance_report(&query)
        .await?
        .into_iter()
        .map(ReportRow::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "department": department,
        "total_records": rows.len(),
        "attendance_records": rows,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct Period {
    /// Look-back window in days
    pub days: Option<i64>,
}

/// Roster changes over the last `days` (default 30)
#[utoipa::path(
    get,
    path = "/api/analytics/staff-changes",
    params(Period),
    responses((status = 200, description = "Change log and per-type totals", body = Object, example = json!({
        "analytics": [],
        "summary": {"added": 0, "modified": 0, "transferred": 0, "deleted": 0},
        "period_days": 30,
        "total_changes": 0
    }))),
    tag = "Reports"
)]
pub async fn staff_changes(
    store: web::Data<dyn Store>,
    period: web::Query<Period>,
) -> Result<impl Responder, AppError> {
    let days = period.days.unwrap_or(30).max(0);
    let since = days_before(now_local(), days)
        .ok_or_else(|| AppError::validation("days out of range"))?;
    let changes = store.staff_changes_since(since).await?;

    let count = |action: ChangeAction| changes.iter().filter(|c| c.action_type == action).count();
    let summary = json!({
        "added": count(ChangeAction::Added),
        "modified": count(ChangeAction::Modified),
        "transferred": count(ChangeAction::Transferred),
        "deleted": count(ChangeAction::Deleted),
    });
    let analytics: Vec<_> = changes
        .iter()
        .map(|c| {
            json!({
                "employee_id": c.employee_id,
                "action_type": c.action_type,
                "action_date": c.action_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                "performed_by": c.performed_by,
                "details": c.details,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "total_changes": analytics.len(),
        "analytics": analytics,
        "summary": summary,
        "period_days": days,
    })))
}
