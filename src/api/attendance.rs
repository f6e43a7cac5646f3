use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::service::absence::mark_daily_absences;
use crate::service::clock::{AttendanceClock, ClockState};
use crate::service::geo::GeoPoint;
use crate::service::reports::{self, MonthlySummary, REPORT_DAYS};
use crate::service::settings::SettingsCache;
use crate::service::staff::find_listed;
use crate::store::{AttendanceStore, Store};
use crate::utils::time::{clock_face, describe_duration, now_local, parse_timestamp};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReportedLocation {
    #[schema(example = 6.673)]
    pub latitude: Option<f64>,
    #[schema(example = json!(-0.52))]
    pub longitude: Option<f64>,
    /// Browser-reported accuracy in metres; informational only.
    #[schema(example = 12.0)]
    pub accuracy: Option<f64>,
}

impl ReportedLocation {
    fn point(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockInRequest {
    #[serde(rename = "employeeId")]
    #[schema(example = "NJ-0042")]
    pub employee_id: Option<String>,
    #[serde(rename = "clockInTime")]
    #[schema(example = "2026-03-02T08:05:00")]
    pub clock_in_time: Option<String>,
    #[serde(default)]
    pub location: Option<ReportedLocation>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockOutRequest {
    #[serde(rename = "employeeId")]
    #[schema(example = "NJ-0042")]
    pub employee_id: Option<String>,
    #[serde(rename = "clockOutTime")]
    #[schema(example = "2026-03-02T17:00:00")]
    pub clock_out_time: Option<String>,
}

/// Both fields present and non-blank, with a parsable timestamp.
fn required_fields(
    employee_id: &Option<String>,
    time: &Option<String>,
) -> Result<(String, chrono::NaiveDateTime), AppError> {
    let employee_id = employee_id.as_deref().map(str::trim).unwrap_or_default();
    let time = time.as_deref().map(str::trim).unwrap_or_default();
    if employee_id.is_empty() || time.is_empty() {
        return Err(AppError::validation("Missing employee ID or time"));
    }
    let at = parse_timestamp(time).ok_or_else(|| AppError::validation("Invalid time format"))?;
    Ok((employee_id.to_string(), at))
}

#[derive(Serialize, ToSchema)]
pub struct ClockInResponse {
    #[schema(example = "Clock-in successful for Ama Mensah at 08:05 AM!")]
    pub message: String,
    pub employee_name: String,
    pub employee_id: String,
    #[schema(example = "EN-010-4770")]
    pub location: String,
    pub status: AttendanceStatus,
}

/// Clock in for today
#[utoipa::path(
    post,
    path = "/api/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 200, description = "Clock-in recorded", body = ClockInResponse),
        (status = 400, description = "Missing fields, bad time, deadline passed or already clocked in", body = Object, example = json!({
            "error": "You have already clocked in today at 08:05 AM"
        })),
        (status = 403, description = "Outside the premises", body = Object, example = json!({
            "error": "You are not within the premises (EN-010-4770). Distance: 1.11 km"
        })),
        (status = 404, description = "Unknown or inactive employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
    payload: web::Json<ClockInRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let (employee_id, at) = required_fields(&payload.employee_id, &payload.clock_in_time)?;
    let location = payload.location.as_ref().and_then(ReportedLocation::point);

    let settings = cache.attendance(store.get_ref()).await?;
    let done = AttendanceClock::new(store.get_ref(), &settings)
        .clock_in(&employee_id, at, location)
        .await?;

    let mut message = format!(
        "Clock-in successful for {} at {}!",
        done.employee.name,
        clock_face(&done.record.clock_in_time)
    );
    if settings.require_gps {
        message.push_str(" Location verified within premises.");
    }

    Ok(HttpResponse::Ok().json(ClockInResponse {
        message,
        employee_name: done.employee.name,
        employee_id: done.employee.employee_id,
        location: done.record.location,
        status: done.record.status,
    }))
}

#[derive(Serialize, ToSchema)]
pub struct ClockOutResponse {
    pub message: String,
    pub employee_name: String,
    pub employee_id: String,
    #[schema(example = "08:05 AM")]
    pub clock_in_time: String,
    #[schema(example = "05:00 PM")]
    pub clock_out_time: String,
    #[schema(example = "8 hours and 55 minutes")]
    pub work_duration: String,
    #[schema(example = "completed")]
    pub status: String,
}

/// Clock out of today's record
#[utoipa::path(
    post,
    path = "/api/clock-out",
    request_body = ClockOutRequest,
    responses(
        (status = 200, description = "Clock-out recorded", body = ClockOutResponse),
        (status = 400, description = "No clock-in, already clocked out, or time not after clock-in", body = Object, example = json!({
            "error": "No clock-in record found for today. Please clock in first before clocking out."
        })),
        (status = 404, description = "Unknown or inactive employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
    payload: web::Json<ClockOutRequest>,
) -> Result<HttpResponse, AppError> {
    let (employee_id, at) = required_fields(&payload.employee_id, &payload.clock_out_time)?;

    let settings = cache.attendance(store.get_ref()).await?;
    let done = AttendanceClock::new(store.get_ref(), &settings)
        .clock_out(&employee_id, at)
        .await?;

    Ok(HttpResponse::Ok().json(ClockOutResponse {
        message: format!(
            "Clock-out successful for {} at {}!",
            done.employee.name,
            clock_face(&at)
        ),
        employee_name: done.employee.name,
        employee_id: done.employee.employee_id,
        clock_in_time: clock_face(&done.record.clock_in_time),
        clock_out_time: clock_face(&at),
        work_duration: describe_duration(done.worked),
        status: "completed".to_string(),
    }))
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub employee_name: String,
    pub employee_id: String,
    #[schema(example = "clocked_in")]
    pub status: String,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_in_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_out_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<String>,
    pub message: String,
}

/// Today's clock state for one employee
#[utoipa::path(
    get,
    path = "/api/status/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Current state", body = StatusResponse),
        (status = 404, description = "Unknown or inactive employee")
    ),
    tag = "Attendance"
)]
pub async fn status(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let now = now_local();

    let settings = cache.attendance(store.get_ref()).await?;
    let day = AttendanceClock::new(store.get_ref(), &settings)
        .status(&employee_id, now.date(), now)
        .await?;

    let message = match day.state {
        ClockState::NotClockedIn => "Employee has not clocked in today",
        ClockState::ClockedIn => "Employee is clocked in and can now clock out",
        ClockState::ClockedOut => "Employee has completed attendance for today",
        ClockState::Absent => "Employee has been marked absent for today",
    };
    let attended = day.record.as_ref().filter(|r| r.status.attended());

    Ok(HttpResponse::Ok().json(StatusResponse {
        employee_name: day.employee.name,
        employee_id,
        status: day.state.as_str().to_string(),
        can_clock_in: day.state.can_clock_in(),
        can_clock_out: day.state.can_clock_out(),
        clock_in_time: attended.map(|r| clock_face(&r.clock_in_time)),
        clock_out_time: attended.and_then(|r| r.clock_out_time.as_ref().map(clock_face)),
        work_duration: day.worked.map(describe_duration),
        message: message.to_string(),
    }))
}

/// Today's record for the staff dashboard
#[utoipa::path(
    get,
    path = "/api/attendance/today/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Today's record or an absent placeholder", body = Object, example = json!({
            "employee_id": "NJ-0042",
            "date": "2026-03-02",
            "clock_in_time": "08:05:00",
            "clock_out_time": null,
            "status": "present"
        })),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff dashboard"
)]
pub async fn today(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let employee = find_listed(store.get_ref(), &path).await?;
    let today = now_local().date();
    let record = store
        .attendance_for_day(&employee.employee_id, today)
        .await?
        .filter(|r| r.status.attended());

    Ok(HttpResponse::Ok().json(json!({
        "employee_id": employee.employee_id,
        "date": today.format("%Y-%m-%d").to_string(),
        "clock_in_time": record.as_ref().map(|r| r.clock_in_time.format("%H:%M:%S").to_string()),
        "clock_out_time": record
            .as_ref()
            .and_then(|r| r.clock_out_time)
            .map(|t| t.format("%H:%M:%S").to_string()),
        "status": record.as_ref().map_or(AttendanceStatus::Absent, |r| r.status),
    })))
}

/// Attendance summary for the current month
#[utoipa::path(
    get,
    path = "/api/attendance/monthly-summary/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Month to date", body = MonthlySummary),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff dashboard"
)]
pub async fn monthly_summary(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let employee = find_listed(store.get_ref(), &path).await?;
    let summary =
        reports::monthly_summary(store.get_ref(), &employee.employee_id, now_local().date()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Serialize, ToSchema)]
pub struct DayRow {
    #[schema(example = "2026-03-02")]
    pub date: String,
    #[schema(example = "08:05:00")]
    pub clock_in_time: Option<String>,
    pub clock_out_time: Option<String>,
    pub status: AttendanceStatus,
    pub location: String,
}

impl From<&AttendanceEntry> for DayRow {
    fn from(entry: &AttendanceEntry) -> Self {
        let r = &entry.record;
        let attended = r.status.attended();
        Self {
            date: r.date_only.format("%Y-%m-%d").to_string(),
            clock_in_time: attended.then(|| r.clock_in_time.format("%H:%M:%S").to_string()),
            clock_out_time: r.clock_out_time.map(|t| t.format("%H:%M:%S").to_string()),
            status: r.status,
            location: r.location.clone(),
        }
    }
}

/// Last 30 days for one employee
#[utoipa::path(
    get,
    path = "/api/attendance/report/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Newest day first", body = Object, example = json!({
            "employee_id": "NJ-0042",
            "employee_name": "Ama Mensah",
            "department": "Finance",
            "email": "ama.mensah@njsma.gov.gh",
            "report_period": "Last 30 days",
            "records": [],
            "total_records": 0,
            "present_days": 0
        })),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff dashboard"
)]
pub async fn staff_report(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let employee = find_listed(store.get_ref(), &path).await?;
    let rows =
        reports::recent_attendance(store.get_ref(), &employee.employee_id, now_local().date())
            .await?;
    let records: Vec<DayRow> = rows.iter().map(DayRow::from).collect();
    let present_days = rows.iter().filter(|e| e.record.status.attended()).count();

    Ok(HttpResponse::Ok().json(json!({
        "employee_id": employee.employee_id,
        "employee_name": employee.name,
        "department": employee.department,
        "email": employee.email,
        "report_period": format!("Last {} days", REPORT_DAYS),
        "total_records": records.len(),
        "records": records,
        "present_days": present_days,
    })))
}

/// Run today's absence sweep now
#[utoipa::path(
    post,
    path = "/api/attendance/mark-absences",
    responses(
        (status = 200, description = "Number of absences recorded; 0 before the deadline", body = Object, example = json!({
            "message": "Marked 3 staff members absent",
            "marked": 3
        }))
    ),
    tag = "Attendance"
)]
pub async fn mark_absences(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
) -> Result<impl Responder, AppError> {
    let settings = cache.attendance(store.get_ref()).await?;
    let marked = mark_daily_absences(store.get_ref(), &settings, now_local()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Marked {} staff members absent", marked),
        "marked": marked,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use crate::test_support::{hire, memory_store, test_app, today_at};

    #[actix_web::test]
    async fn clock_in_then_out() {
        let store = memory_store();
        hire(&store, "NJ-0042", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/clock-in")
            .set_json(serde_json::json!({
                "employeeId": "NJ-0042",
                "clockInTime": today_at("08:05:00"),
                "location": {"latitude": 6.673, "longitude": -0.520, "accuracy": 10.0}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["employee_name"], "Ama Mensah");
        assert_eq!(body["location"], "EN-010-4770");
        assert_eq!(body["status"], "present");

        let req = test::TestRequest::post()
            .uri("/api/clock-out")
            .set_json(serde_json::json!({
                "employeeId": "NJ-0042",
                "clockOutTime": today_at("17:00:00"),
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["work_duration"], "8 hours and 55 minutes");
        assert_eq!(body["clock_in_time"], "08:05 AM");
        assert_eq!(body["status"], "completed");
    }

    #[actix_web::test]
    async fn clock_in_errors_map_to_statuses() {
        let store = memory_store();
        hire(&store, "NJ-0042", "Ama Mensah").await;
        let app = test_app!(store);

        let cases = [
            (serde_json::json!({"clockInTime": today_at("08:00:00")}), StatusCode::BAD_REQUEST),
            (
                serde_json::json!({"employeeId": "NJ-0042", "clockInTime": "soon",
                    "location": {"latitude": 6.673, "longitude": -0.520}}),
                StatusCode::BAD_REQUEST,
            ),
            (
                serde_json::json!({"employeeId": "NJ-0042", "clockInTime": today_at("08:00:00"),
                    "location": {"latitude": 6.683, "longitude": -0.520}}),
                StatusCode::FORBIDDEN,
            ),
            (
                serde_json::json!({"employeeId": "NJ-9999", "clockInTime": today_at("08:00:00"),
                    "location": {"latitude": 6.673, "longitude": -0.520}}),
                StatusCode::NOT_FOUND,
            ),
            (
                serde_json::json!({"employeeId": "NJ-0042", "clockInTime": today_at("10:00:01"),
                    "location": {"latitude": 6.673, "longitude": -0.520}}),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (payload, expected) in cases {
            let req = test::TestRequest::post()
                .uri("/api/clock-in")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn status_follows_the_day() {
        let store = memory_store();
        hire(&store, "NJ-0042", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/status/NJ-0042").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "not_clocked_in");
        assert_eq!(body["can_clock_in"], true);
        assert_eq!(body["can_clock_out"], false);

        let req = test::TestRequest::post()
            .uri("/api/clock-in")
            .set_json(serde_json::json!({
                "employeeId": "NJ-0042",
                "clockInTime": today_at("00:00:00"),
                "location": {"latitude": 6.673, "longitude": -0.520}
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get().uri("/api/status/NJ-0042").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "clocked_in");
        assert_eq!(body["can_clock_out"], true);
        assert_eq!(body["clock_in_time"], "12:00 AM");

        let req = test::TestRequest::get().uri("/api/attendance/today/NJ-0042").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["clock_in_time"], "00:00:00");
        assert_eq!(body["status"], "present");

        let req = test::TestRequest::get().uri("/api/attendance/report/NJ-0042").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_records"], 1);
        assert_eq!(body["present_days"], 1);

        let req = test::TestRequest::get().uri("/api/attendance/report/NJ-9999").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_json_is_a_json_error() {
        let store = memory_store();
        let app = test_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/clock-out")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }
}
