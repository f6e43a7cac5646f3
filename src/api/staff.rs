use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::employee::Employee;
use crate::service::staff::{self, StaffRow, StaffUpdate, find_listed};
use crate::store::{EmployeeFilter, EmployeeStore, Store};
use crate::utils::time::now_local;

const SYSTEM: &str = "system";

fn performed_by(hr_email: &Option<String>) -> &str {
    hr_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(SYSTEM)
}

#[derive(Deserialize, ToSchema)]
pub struct StaffUpload {
    #[serde(default)]
    pub staff: Vec<StaffRow>,
    #[schema(example = "hr@njsma.gov.gh")]
    pub hr_email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Upload completed: 12 new staff members added")]
    pub message: String,
    pub added_count: u64,
    pub updated_count: u64,
    pub skipped_count: u64,
    pub total_processed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_errors: Option<usize>,
}

/// Bulk add or refresh staff
#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = StaffUpload,
    responses(
        (status = 200, description = "At least one record was added or updated", body = UploadResponse),
        (status = 400, description = "Empty, oversized, or nothing changed", body = Object, example = json!({
            "error": "No staff members were added or updated",
            "details": {"added_count": 0, "updated_count": 0, "skipped_count": 3, "total_processed": 3}
        }))
    ),
    tag = "Staff"
)]
pub async fn upload_staff(
    store: web::Data<dyn Store>,
    payload: web::Json<StaffUpload>,
) -> Result<HttpResponse, AppError> {
    let outcome = staff::upload(
        store.get_ref(),
        &payload.staff,
        performed_by(&payload.hr_email),
        now_local(),
    )
    .await?;

    let (errors, more) = outcome.reported_errors();
    let body = UploadResponse {
        message: outcome.summary(),
        added_count: outcome.added,
        updated_count: outcome.updated,
        skipped_count: outcome.skipped,
        total_processed: outcome.total,
        errors: errors.to_vec(),
        additional_errors: (more > 0).then_some(more),
    };

    if !outcome.changed_anything() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "No staff members were added or updated",
            "details": body,
        })));
    }
    Ok(HttpResponse::Ok().json(body))
}

/// Every staff member that has not been deleted
#[utoipa::path(
    get,
    path = "/api/staff",
    responses((status = 200, description = "Roster", body = [Employee])),
    tag = "Staff"
)]
pub async fn list_staff(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let staff = store.list_employees(&EmployeeFilter::default()).await?;
    Ok(HttpResponse::Ok().json(staff))
}

/// One staff member
#[utoipa::path(
    get,
    path = "/api/staff/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member", body = Employee),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff"
)]
pub async fn get_staff(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let employee = find_listed(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update one staff member
#[utoipa::path(
    put,
    path = "/api/staff/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    request_body = StaffUpdate,
    responses(
        (status = 200, description = "Updated, or nothing to change", body = Object, example = json!({
            "message": "Successfully updated staff member Ama Mensah",
            "employee_id": "NJ-0042",
            "changes": ["department: Finance -> Works"]
        })),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff"
)]
pub async fn update_staff(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    payload: web::Json<StaffUpdate>,
) -> Result<impl Responder, AppError> {
    let employee_id = path.into_inner();
    let (employee, changes) = staff::update(
        store.get_ref(),
        &employee_id,
        &payload,
        performed_by(&payload.hr_email),
        now_local(),
    )
    .await?;

    if changes.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "No changes detected",
            "employee_id": employee_id,
        })));
    }
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully updated staff member {}", employee.name),
        "employee_id": employee_id,
        "changes": changes,
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteStaff {
    /// Defaults to `true`: the employee is marked transferred and keeps history.
    #[serde(default = "default_soft")]
    pub soft_delete: bool,
    pub hr_email: Option<String>,
}

fn default_soft() -> bool {
    true
}

/// Transfer out or permanently delete one staff member
#[utoipa::path(
    delete,
    path = "/api/staff/{employee_id}",
    params(("employee_id" = String, Path, description = "Staff ID")),
    request_body(content = DeleteStaff, description = "Optional; omit for a soft delete"),
    responses(
        (status = 200, description = "Removed", body = Object, example = json!({
            "message": "Successfully transferred/deactivated staff member Ama Mensah (NJ-0042)",
            "action": "transferred",
            "employee_id": "NJ-0042"
        })),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Staff"
)]
pub async fn delete_staff(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    payload: Option<web::Json<DeleteStaff>>,
) -> Result<impl Responder, AppError> {
    let employee_id = path.into_inner();
    let (soft, by) = match &payload {
        Some(body) => (body.soft_delete, performed_by(&body.hr_email)),
        None => (true, SYSTEM),
    };

    let (employee, action) =
        staff::remove(store.get_ref(), &employee_id, soft, by, now_local()).await?;
    let verb = if soft {
        "transferred/deactivated"
    } else {
        "deleted"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "Successfully {} staff member {} ({})",
            verb, employee.name, employee.employee_id
        ),
        "action": action,
        "employee_id": employee.employee_id,
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteSelected {
    #[serde(default)]
    pub employee_ids: Vec<String>,
    pub hr_email: Option<String>,
}

/// Permanently delete the listed staff
#[utoipa::path(
    delete,
    path = "/api/staff/delete-selected",
    request_body = DeleteSelected,
    responses(
        (status = 200, description = "All listed staff deleted", body = Object, example = json!({
            "message": "Successfully deleted 2 staff members and their related data",
            "deleted_count": 2,
            "deleted_ids": ["NJ-0001", "NJ-0002"]
        })),
        (status = 400, description = "No IDs given"),
        (status = 404, description = "At least one ID is unknown; nothing was deleted")
    ),
    tag = "Staff"
)]
pub async fn delete_selected(
    store: web::Data<dyn Store>,
    payload: web::Json<DeleteSelected>,
) -> Result<impl Responder, AppError> {
    let deleted = staff::delete_selected(
        store.get_ref(),
        &payload.employee_ids,
        performed_by(&payload.hr_email),
        now_local(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully deleted {} staff members and their related data", deleted),
        "deleted_count": deleted,
        "deleted_ids": payload.employee_ids,
    })))
}

/// Permanently delete every staff member
#[utoipa::path(
    delete,
    path = "/api/staff/delete-all",
    responses(
        (status = 200, description = "Roster emptied", body = Object, example = json!({
            "message": "Successfully deleted all 120 staff members and their related data",
            "deleted_count": 120
        }))
    ),
    tag = "Staff"
)]
pub async fn delete_all(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let deleted = staff::delete_all(store.get_ref(), SYSTEM, now_local()).await?;
    if deleted == 0 {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "No staff members to delete",
            "deleted_count": 0,
        })));
    }
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully deleted all {} staff members and their related data", deleted),
        "deleted_count": deleted,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::test_support::{hire, memory_store, test_app};

    #[actix_web::test]
    async fn upload_then_read_back() {
        let store = memory_store();
        let app = test_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/staff")
            .set_json(json!({
                "staff": [
                    {"staffId": "NJ-0001", "name": "Ama Mensah", "unit": "Finance", "email": "ama@njsma.gov.gh"},
                    {"staffId": "NJ-0002", "name": "Kofi Boateng"},
                    {"staffId": "??", "name": "Nobody"}
                ],
                "hr_email": "hr@njsma.gov.gh"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["added_count"], 2);
        assert_eq!(body["skipped_count"], 1);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/api/staff/NJ-0001").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["department"], "Finance");
        assert_eq!(body["lifecycle"], "active");

        let req = test::TestRequest::get().uri("/api/staff").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn unchanged_upload_is_rejected() {
        let store = memory_store();
        hire(&store, "NJ-0001", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/staff")
            .set_json(json!({"staff": [{"staffId": "NJ-0001", "name": "Ama Mensah", "department": "Finance"}]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["details"]["skipped_count"], 1);
    }

    #[actix_web::test]
    async fn delete_routes_do_not_shadow_ids() {
        let store = memory_store();
        hire(&store, "NJ-0001", "Ama Mensah").await;
        hire(&store, "NJ-0002", "Kofi Boateng").await;
        hire(&store, "NJ-0003", "Esi Owusu").await;
        let app = test_app!(store);

        let req = test::TestRequest::delete().uri("/api/staff/NJ-0001").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["action"], "transferred");

        let req = test::TestRequest::delete()
            .uri("/api/staff/delete-selected")
            .set_json(json!({"employee_ids": ["NJ-0002", "NJ-0404"]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri("/api/staff/NJ-0002")
            .set_json(json!({"soft_delete": false}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["action"], "deleted");

        let req = test::TestRequest::get().uri("/api/staff/NJ-0002").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri("/api/staff/delete-all").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deleted_count"], 2);
    }

    #[actix_web::test]
    async fn update_reports_no_changes() {
        let store = memory_store();
        hire(&store, "NJ-0001", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::put()
            .uri("/api/staff/NJ-0001")
            .set_json(json!({"name": "Ama Mensah"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "No changes detected");

        let req = test::TestRequest::put()
            .uri("/api/staff/NJ-0001")
            .set_json(json!({"contact": "+233201234567", "hr_email": "hr@njsma.gov.gh"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["changes"][0], "contact: None -> +233201234567");
    }
}
