use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::leave_request::{LeaveEntry, LeaveStatus, NewLeave};
use crate::service::staff::find_listed;
use crate::store::{LeaveStore, Store};
use crate::utils::time::{now_local, parse_date};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[serde(rename = "employeeId")]
    #[schema(example = "NJ-0042")]
    pub employee_id: Option<String>,
    #[serde(rename = "startDate")]
    #[schema(example = "2026-04-01", format = "date", value_type = String)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    #[schema(example = "2026-04-03", format = "date", value_type = String)]
    pub end_date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "NJ-0042")]
    pub employee_id: String,
    #[schema(example = "Ama Mensah")]
    pub employee_name: String,
    #[schema(example = "2026-04-01")]
    pub start_date: String,
    #[schema(example = "2026-04-03")]
    pub end_date: String,
    pub status: LeaveStatus,
    #[schema(example = "2026-03-20")]
    pub created_at: String,
}

impl From<LeaveEntry> for LeaveResponse {
    fn from(entry: LeaveEntry) -> Self {
        let request = entry.request;
        Self {
            id: request.id,
            employee_id: request.employee_id,
            employee_name: entry.employee_name,
            start_date: request.start_date.format("%Y-%m-%d").to_string(),
            end_date: request.end_date.format("%Y-%m-%d").to_string(),
            status: request.status,
            created_at: request.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-request",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted successfully for Ama Mensah",
            "request_id": 7
        })),
        (status = 400, description = "Missing or invalid dates"),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    store: web::Data<dyn Store>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, AppError> {
    let field = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let (Some(employee_id), Some(start), Some(end)) = (
        field(&payload.employee_id),
        field(&payload.start_date),
        field(&payload.end_date),
    ) else {
        return Err(AppError::validation("Missing required fields"));
    };

    let employee = find_listed(store.get_ref(), &employee_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::not_found("Employee not found"),
            other => other,
        })?;

    let (Some(start_date), Some(end_date)) = (parse_date(&start), parse_date(&end)) else {
        return Err(AppError::validation("Invalid date format"));
    };
    if start_date > end_date {
        return Err(AppError::validation("Start date cannot be after end date"));
    }

    let request_id = store
        .insert_leave(
            &NewLeave {
                employee_id: employee.employee_id.clone(),
                start_date,
                end_date,
            },
            now_local(),
        )
        .await?;
    info!(request_id, employee_id = %employee.employee_id, "Leave request submitted");

    Ok(HttpResponse::Created().json(json!({
        "message": format!("Leave request submitted successfully for {}", employee.name),
        "request_id": request_id,
    })))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests",
    responses((status = 200, description = "All leave requests", body = [LeaveResponse])),
    tag = "Leave"
)]
pub async fn leave_list(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let rows: Vec<LeaveResponse> = store
        .list_leaves()
        .await?
        .into_iter()
        .map(LeaveResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

async fn decide(store: &dyn Store, leave_id: u64, to: LeaveStatus) -> Result<HttpResponse, AppError> {
    if store.find_leave(leave_id).await?.is_none() {
        return Err(AppError::not_found("Leave request not found"));
    }
    if !store
        .transition_leave(leave_id, LeaveStatus::Pending, to)
        .await?
    {
        return Err(AppError::validation("Leave request has already been processed"));
    }

    info!(leave_id, status = to.as_str(), "Leave request decided");
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave {}", to),
        "request_id": leave_id,
        "status": to,
    })))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave-requests/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved",
            "request_id": 7,
            "status": "approved"
        })),
        (status = 400, description = "Leave request already processed"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    decide(store.get_ref(), path.into_inner(), LeaveStatus::Approved).await
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave-requests/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected",
            "request_id": 7,
            "status": "rejected"
        })),
        (status = 400, description = "Leave request already processed"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    decide(store.get_ref(), path.into_inner(), LeaveStatus::Rejected).await
}
