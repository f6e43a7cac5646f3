use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, web};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::AppError;
use crate::model::setting::SettingCategory;
use crate::service::settings::{SettingKey, SettingsCache, display_value, storable_value};
use crate::store::{SettingsStore, Store};
use crate::utils::time::now_local;

fn category(raw: &str) -> Result<SettingCategory, AppError> {
    raw.parse::<SettingCategory>()
        .map_err(|_| AppError::validation("Invalid settings category"))
}

/// Settings of one category
#[utoipa::path(
    get,
    path = "/api/settings/{category}",
    params(("category" = String, Path, description = "attendance, location, organization, security, preferences, notifications or system")),
    responses(
        (status = 200, description = "Key to typed value", body = Object, example = json!({
            "require_gps_verification": true,
            "gps_verification_radius": 0.5
        })),
        (status = 400, description = "Invalid settings category")
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let category = category(&path)?;
    let values: Map<String, Value> = store
        .settings(Some(category))
        .await?
        .into_iter()
        .map(|s| {
            let value = display_value(&s.setting_key, &s.setting_value);
            (s.setting_key, value)
        })
        .collect();
    Ok(HttpResponse::Ok().json(values))
}

/// Upsert settings of one category
#[utoipa::path(
    post,
    path = "/api/settings/{category}",
    params(("category" = String, Path, description = "Settings category")),
    request_body(content = Object, description = "Key/value pairs", example = json!({
        "clock_in_deadline": "09:30",
        "late_after": "08:15"
    })),
    responses(
        (status = 200, description = "Stored", body = Object, example = json!({
            "message": "Successfully updated 2 settings in attendance category",
            "updated_count": 2
        })),
        (status = 400, description = "Invalid category, empty body, or a value of the wrong type")
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    store: web::Data<dyn Store>,
    cache: web::Data<SettingsCache>,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> Result<impl Responder, AppError> {
    let category = category(&path)?;
    if payload.is_empty() {
        return Err(AppError::validation("No settings data provided"));
    }

    let mut values = Vec::with_capacity(payload.len());
    for (key, value) in payload.iter() {
        if let Ok(known) = key.parse::<SettingKey>() {
            if known.category() != category {
                return Err(AppError::validation(format!(
                    "{} belongs to the {} category",
                    key,
                    known.category()
                )));
            }
        }
        values.push((key.clone(), storable_value(key, value)?));
    }

    let updated = store
        .upsert_settings(category, &values, "system", now_local())
        .await?;
    cache.invalidate().await;
    info!(category = category.as_str(), updated, "Settings updated");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully updated {} settings in {} category", updated, category),
        "updated_count": updated,
    })))
}

/// Every setting, grouped by category
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Category to key/value map", body = Object)),
    tag = "Settings"
)]
pub async fn all_settings(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let mut grouped: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for s in store.settings(None).await? {
        let value = display_value(&s.setting_key, &s.setting_value);
        grouped
            .entry(s.category.to_string())
            .or_default()
            .insert(s.setting_key, value);
    }
    Ok(HttpResponse::Ok().json(grouped))
}
