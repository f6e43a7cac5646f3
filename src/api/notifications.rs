use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::service::reminders::send_clock_in_reminders;
use crate::store::{NotificationStore, Store};
use crate::utils::time::{days_before, now_local, parse_hhmm};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReminderRequest {
    /// Reminders are refused before this time; defaults to 09:30.
    #[schema(example = "09:30")]
    pub cutoff_time: Option<String>,
    #[schema(example = "hr@njsma.gov.gh")]
    pub hr_email: Option<String>,
}

/// Remind staff who have not clocked in yet
#[utoipa::path(
    post,
    path = "/api/notifications/send-reminders",
    request_body = ReminderRequest,
    responses(
        (status = 200, description = "Reminders recorded", body = Object, example = json!({
            "message": "Clock-in reminders processed for 4 staff members",
            "reminders_sent": 4,
            "total_staff_to_remind": 5
        })),
        (status = 400, description = "Too early, or a bad cutoff time")
    ),
    tag = "Notifications"
)]
pub async fn send_reminders(
    store: web::Data<dyn Store>,
    payload: Option<web::Json<ReminderRequest>>,
) -> Result<impl Responder, AppError> {
    let payload = payload.map(web::Json::into_inner).unwrap_or_default();
    let cutoff = match payload.cutoff_time.as_deref() {
        Some(raw) => parse_hhmm(raw)
            .ok_or_else(|| AppError::validation("Invalid cutoff_time: expected HH:MM"))?,
        None => NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
    };
    let requested_by = payload.hr_email.as_deref().unwrap_or("system");

    let run = send_clock_in_reminders(store.get_ref(), cutoff, requested_by, now_local()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Clock-in reminders processed for {} staff members", run.reminders_sent),
        "reminders_sent": run.reminders_sent,
        "total_staff_to_remind": run.total_staff_to_remind,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Look-back window in days, default 7
    pub days: Option<i64>,
}

/// Recorded notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications/history",
    params(HistoryQuery),
    responses((status = 200, description = "Notification history", body = Object)),
    tag = "Notifications"
)]
pub async fn history(
    store: web::Data<dyn Store>,
    query: web::Query<HistoryQuery>,
) -> Result<impl Responder, AppError> {
    let days = query.days.unwrap_or(7).max(0);
    let since = days_before(now_local(), days)
        .ok_or_else(|| AppError::validation("days out of range"))?;
    let entries = store.notifications_since(since).await?;

    let notifications: Vec<_> = entries
        .iter()
        .map(|e| {
            let n = &e.notification;
            json!({
                "employee_id": n.employee_id,
                "employee_name": e.employee_name,
                "employee_email": e.employee_email,
                "notification_type": n.notification_type,
                "email_sent": n.email_sent,
                "sent_at": n.sent_at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                "created_at": n.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                "message_content": n.message_content,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "total_notifications": notifications.len(),
        "notifications": notifications,
        "period_days": days,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::test_support::{hire_with_email, memory_store, test_app};

    #[actix_web::test]
    async fn reminders_show_up_in_history() {
        let store = memory_store();
        hire_with_email(&store, "NJ-0042", "ama@njsma.gov.gh").await;
        let app = test_app!(store);

        // a cutoff of midnight is always in the past
        let req = test::TestRequest::post()
            .uri("/api/notifications/send-reminders")
            .set_json(json!({"cutoff_time": "00:00", "hr_email": "hr@njsma.gov.gh"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reminders_sent"], 1);

        let req = test::TestRequest::get().uri("/api/notifications/history").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_notifications"], 1);
        assert_eq!(body["notifications"][0]["notification_type"], "clock_in_reminder");
        assert_eq!(body["notifications"][0]["employee_email"], "ama@njsma.gov.gh");
    }

    #[actix_web::test]
    async fn huge_history_window_is_rejected() {
        let store = memory_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/notifications/history?days=100000000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "days out of range");

        let req = test::TestRequest::get()
            .uri("/api/notifications/history?days=36500")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["period_days"], 36500);
    }
}
