use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::model::attendance::AttendanceQuery;
use crate::model::setting::SettingCategory;
use crate::service::settings::{SettingKey, SettingsCache, default_entries};
use crate::store::{
    AttendanceStore, EmployeeFilter, EmployeeStore, LeaveStore, SettingsStore, Store,
};
use crate::utils::time::now_local;

/// Service banner
#[utoipa::path(get, path = "/", responses((status = 200, description = "Service banner", body = Object)), tag = "System")]
#[get("/")]
pub async fn index(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Clock-In System API",
        "status": "running",
        "endpoints": {
            "health": "/health",
            "api": config.api_prefix,
            "docs": "/swagger-ui/",
        },
    }))
}

/// Liveness plus database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = Object, example = json!({
            "status": "healthy",
            "timestamp": "2026-03-02T08:00:00",
            "database": "connected"
        })),
        (status = 500, description = "Store unreachable")
    ),
    tag = "System"
)]
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    let timestamp = now_local().format("%Y-%m-%dT%H:%M:%S").to_string();
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "database": "connected",
        })),
        Err(e) => {
            error!(error = %e, "Health check failed");
            HttpResponse::InternalServerError().json(json!({
                "status": "unhealthy",
                "error": e.to_string(),
                "timestamp": timestamp,
            }))
        }
    }
}

/// JSON snapshot of staff, attendance, leave and settings
#[utoipa::path(
    post,
    path = "/api/backup",
    responses((status = 200, description = "Snapshot created", body = Object)),
    tag = "System"
)]
pub async fn backup(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
) -> Result<impl Responder, AppError> {
    let now = now_local();
    let timestamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();
    let backup_id = Uuid::new_v4();

    let report = AttendanceQuery::default();
    let employee_filter = EmployeeFilter::default();
    let (employees, attendance, leave_requests, settings) = futures::try_join!(
        store.list_employees(&employee_filter),
        store.attendance_report(&report),
        store.list_leaves(),
        store.settings(None),
    )?;

    let attendance: Vec<_> = attendance.into_iter().map(|e| e.record).collect();
    let leave_requests: Vec<_> = leave_requests.into_iter().map(|e| e.request).collect();
    let settings: Vec<_> = settings
        .into_iter()
        .map(|s| {
            json!({
                "category": s.category,
                "key": s.setting_key,
                "value": s.setting_value,
            })
        })
        .collect();

    store
        .upsert_settings(
            SettingCategory::System,
            &[(SettingKey::LastBackup.as_str().to_string(), timestamp.clone())],
            "system",
            now,
        )
        .await?;
    cache.invalidate().await;
    warn!(%backup_id, employees = employees.len(), "Backup snapshot taken");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Backup created successfully",
        "backup_id": backup_id.to_string(),
        "timestamp": timestamp,
        "backup_data": {
            "employees": employees,
            "attendance_logs": attendance,
            "leave_requests": leave_requests,
            "settings": settings,
        },
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct ResetRequest {
    #[schema(example = "SYSTEM RESET")]
    pub confirmation: Option<String>,
}

const RESET_PHRASE: &str = "SYSTEM RESET";

/// Wipe every table and restore default settings
#[utoipa::path(
    post,
    path = "/api/reset-system",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "All data cleared", body = Object),
        (status = 400, description = "Wrong confirmation text")
    ),
    tag = "System"
)]
pub async fn reset_system(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
    payload: web::Json<ResetRequest>,
) -> Result<impl Responder, AppError> {
    if payload.confirmation.as_deref() != Some(RESET_PHRASE) {
        return Err(AppError::validation("Invalid confirmation text"));
    }

    store.reset_all().await?;
    let seeded = store.seed_settings(&default_entries(now_local())).await?;
    cache.invalidate().await;
    warn!(seeded, "System reset; all data cleared");

    Ok(HttpResponse::Ok().json(json!({
        "message": "System reset complete. All data has been cleared.",
        "status": "success",
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::test_support::{hire, memory_store, test_app};

    #[actix_web::test]
    async fn health_and_banner() {
        let store = memory_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["endpoints"]["api"], "/api");
    }

    #[actix_web::test]
    async fn backup_stamps_last_backup() {
        let store = memory_store();
        hire(&store, "NJ-0042", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::post().uri("/api/backup").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["backup_data"]["employees"][0]["employee_id"], "NJ-0042");
        let stamp = body["timestamp"].clone();

        let req = test::TestRequest::get().uri("/api/settings/system").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["last_backup"], stamp);
    }

    #[actix_web::test]
    async fn reset_needs_the_phrase() {
        let store = memory_store();
        hire(&store, "NJ-0042", "Ama Mensah").await;
        let app = test_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/reset-system")
            .set_json(json!({"confirmation": "yes please"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/reset-system")
            .set_json(json!({"confirmation": "SYSTEM RESET"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/staff").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));

        let req = test::TestRequest::get().uri("/api/settings/attendance").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["clock_in_deadline"], "10:00");
    }
}
