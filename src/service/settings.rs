use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use moka::future::Cache;
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use tracing::warn;

use super::geo::GeoPoint;
use crate::error::AppError;
use crate::model::setting::{SettingCategory, SettingEntry};
use crate::store::SettingsStore;
use crate::utils::time::parse_hhmm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Float,
    Time,
    Text,
}

/// Settings the service itself reads. Anything else stored is opaque
/// preference data for the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    RequireGpsVerification,
    GpsVerificationRadius,
    AssemblyLatitude,
    AssemblyLongitude,
    PremisesName,
    ClockInDeadline,
    LateAfter,
    LastBackup,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn category(&self) -> SettingCategory {
        match self {
            SettingKey::RequireGpsVerification | SettingKey::GpsVerificationRadius => {
                SettingCategory::Security
            }
            SettingKey::AssemblyLatitude
            | SettingKey::AssemblyLongitude
            | SettingKey::PremisesName => SettingCategory::Location,
            SettingKey::ClockInDeadline | SettingKey::LateAfter => SettingCategory::Attendance,
            SettingKey::LastBackup => SettingCategory::System,
        }
    }

    pub fn kind(&self) -> SettingKind {
        match self {
            SettingKey::RequireGpsVerification => SettingKind::Bool,
            SettingKey::GpsVerificationRadius
            | SettingKey::AssemblyLatitude
            | SettingKey::AssemblyLongitude => SettingKind::Float,
            SettingKey::ClockInDeadline | SettingKey::LateAfter => SettingKind::Time,
            SettingKey::PremisesName | SettingKey::LastBackup => SettingKind::Text,
        }
    }

    /// Value seeded at startup; `None` keys stay unset until HR writes them.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            SettingKey::RequireGpsVerification => Some("true"),
            SettingKey::GpsVerificationRadius => Some("0.5"),
            SettingKey::AssemblyLatitude => Some("6.673"),
            SettingKey::AssemblyLongitude => Some("-0.520"),
            SettingKey::PremisesName => Some("EN-010-4770"),
            SettingKey::ClockInDeadline => Some("10:00"),
            SettingKey::LateAfter | SettingKey::LastBackup => None,
        }
    }
}

pub fn default_entries(at: NaiveDateTime) -> Vec<SettingEntry> {
    SettingKey::iter()
        .filter_map(|key| {
            key.default_value().map(|value| SettingEntry {
                category: key.category(),
                setting_key: key.as_str().to_string(),
                setting_value: value.to_string(),
                updated_at: at,
                updated_by: "system".to_string(),
            })
        })
        .collect()
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a stored string by its declared kind into the JSON the API returns.
pub fn typed_value(kind: SettingKind, raw: &str) -> Option<Value> {
    match kind {
        SettingKind::Bool => parse_bool(raw).map(Value::Bool),
        SettingKind::Float => parse_float(raw).map(|v| serde_json::json!(v)),
        SettingKind::Time => parse_hhmm(raw).map(|t| Value::String(t.format("%H:%M").to_string())),
        SettingKind::Text => Some(Value::String(raw.to_string())),
    }
}

/// JSON for a stored value. Known keys use their kind; unknown keys are
/// read as JSON literals (booleans any case), falling back to the raw text.
pub fn display_value(key: &str, raw: &str) -> Value {
    if let Ok(known) = key.parse::<SettingKey>() {
        if let Some(value) = typed_value(known.kind(), raw) {
            return value;
        }
    }
    if let Some(b) = parse_bool(raw).filter(|_| raw.chars().all(|c| c.is_ascii_alphabetic())) {
        return Value::Bool(b);
    }
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Turns a submitted JSON value into its stored string, rejecting values a
/// known key cannot hold.
pub fn storable_value(key: &str, value: &Value) -> Result<String, AppError> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    if let Ok(known) = key.parse::<SettingKey>() {
        if typed_value(known.kind(), &raw).is_none() {
            return Err(AppError::validation(format!(
                "Invalid value for {}: {}",
                key, value
            )));
        }
        if known == SettingKey::GpsVerificationRadius && parse_float(&raw).is_some_and(|r| r <= 0.0) {
            return Err(AppError::validation("gps_verification_radius must be positive"));
        }
        let bound = match known {
            SettingKey::AssemblyLatitude => Some(90.0),
            SettingKey::AssemblyLongitude => Some(180.0),
            _ => None,
        };
        if let Some(bound) = bound {
            if parse_float(&raw).is_some_and(|v: f64| v.abs() > bound) {
                return Err(AppError::validation(format!(
                    "{} must be between -{} and {}",
                    key, bound, bound
                )));
            }
        }
    }
    Ok(raw)
}

/// The typed view of the settings the clock needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSettings {
    pub require_gps: bool,
    pub radius_km: f64,
    pub premises: GeoPoint,
    pub premises_name: String,
    pub deadline: NaiveTime,
    pub late_after: Option<NaiveTime>,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self::from_entries(&[])
    }
}

impl AttendanceSettings {
    pub fn from_entries(entries: &[SettingEntry]) -> Self {
        let raw = |key: SettingKey| {
            entries
                .iter()
                .find(|e| e.setting_key == key.as_str())
                .map(|e| e.setting_value.as_str())
        };

        // a stored value that does not parse falls back to the default
        fn read<T>(
            key: SettingKey,
            stored: Option<&str>,
            parse: impl Fn(&str) -> Option<T>,
        ) -> Option<T> {
            if let Some(value) = stored {
                match parse(value) {
                    Some(v) => return Some(v),
                    None => {
                        let name: &str = key.as_str();
                        warn!(key = name, value, "Ignoring unparsable setting");
                    }
                }
            }
            key.default_value().and_then(|d| parse(d))
        }

        let require_gps = read(
            SettingKey::RequireGpsVerification,
            raw(SettingKey::RequireGpsVerification),
            parse_bool,
        )
        .unwrap_or(true);
        let radius_km = read(
            SettingKey::GpsVerificationRadius,
            raw(SettingKey::GpsVerificationRadius),
            |v| parse_float(v).filter(|r| *r > 0.0),
        )
        .unwrap_or(0.5);
        let latitude = read(
            SettingKey::AssemblyLatitude,
            raw(SettingKey::AssemblyLatitude),
            parse_float,
        )
        .unwrap_or(6.673);
        let longitude = read(
            SettingKey::AssemblyLongitude,
            raw(SettingKey::AssemblyLongitude),
            parse_float,
        )
        .unwrap_or(-0.520);
        let premises_name = raw(SettingKey::PremisesName)
            .filter(|v| !v.trim().is_empty())
            .or(SettingKey::PremisesName.default_value())
            .unwrap_or_default()
            .to_string();
        let deadline = read(
            SettingKey::ClockInDeadline,
            raw(SettingKey::ClockInDeadline),
            parse_hhmm,
        )
        .unwrap_or_default();
        let late_after = read(SettingKey::LateAfter, raw(SettingKey::LateAfter), parse_hhmm);

        Self {
            require_gps,
            radius_km,
            premises: GeoPoint::new(latitude, longitude),
            premises_name,
            deadline,
            late_after,
        }
    }

    pub async fn load<S>(store: &S) -> Result<Self, AppError>
    where
        S: SettingsStore + ?Sized,
    {
        let entries = store.settings(None).await?;
        Ok(Self::from_entries(&entries))
    }
}

const ATTENDANCE_KEY: &str = "attendance";

/// Keeps the parsed attendance settings for a short TTL so clock requests do
/// not hit the settings table every time. Writers must call `invalidate`.
#[derive(Clone)]
pub struct SettingsCache {
    cache: Cache<&'static str, AttendanceSettings>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl.max(Duration::from_secs(1)))
                .build(),
        }
    }

    pub async fn attendance<S>(&self, store: &S) -> Result<AttendanceSettings, AppError>
    where
        S: SettingsStore + ?Sized,
    {
        self.cache
            .try_get_with(ATTENDANCE_KEY, AttendanceSettings::load(store))
            .await
            .map_err(|e: Arc<AppError>| {
                Arc::try_unwrap(e).unwrap_or_else(|shared| AppError::Storage(shared.to_string()))
            })
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(ATTENDANCE_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::utils::time::now_local;

    fn entry(key: &str, value: &str) -> SettingEntry {
        SettingEntry {
            category: SettingCategory::Security,
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            updated_at: now_local(),
            updated_by: "test".to_string(),
        }
    }

    #[test]
    fn defaults_match_the_premises() {
        let settings = AttendanceSettings::default();
        assert!(settings.require_gps);
        assert_eq!(settings.radius_km, 0.5);
        assert_eq!(settings.premises, GeoPoint::new(6.673, -0.520));
        assert_eq!(settings.premises_name, "EN-010-4770");
        assert_eq!(settings.deadline, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(settings.late_after, None);
    }

    #[test]
    fn stored_values_are_parsed_by_kind() {
        let settings = AttendanceSettings::from_entries(&[
            entry("require_gps_verification", "False"),
            entry("gps_verification_radius", "1.25"),
            entry("clock_in_deadline", "09:30"),
            entry("late_after", "08:15"),
        ]);
        assert!(!settings.require_gps);
        assert_eq!(settings.radius_km, 1.25);
        assert_eq!(settings.deadline, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(settings.late_after, NaiveTime::from_hms_opt(8, 15, 0));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let settings = AttendanceSettings::from_entries(&[
            entry("require_gps_verification", "__import__('os').system('rm -rf /')"),
            entry("gps_verification_radius", "-3"),
            entry("clock_in_deadline", "noon"),
        ]);
        assert!(settings.require_gps);
        assert_eq!(settings.radius_km, 0.5);
        assert_eq!(settings.deadline, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn values_are_typed_not_evaluated() {
        assert_eq!(display_value("require_gps_verification", "true"), Value::Bool(true));
        assert_eq!(display_value("gps_verification_radius", "0.5"), serde_json::json!(0.5));
        assert_eq!(display_value("clock_in_deadline", "10:00"), Value::String("10:00".into()));
        assert_eq!(display_value("theme", "True"), Value::Bool(true));
        assert_eq!(display_value("grace_period", "15"), serde_json::json!(15));
        assert_eq!(
            display_value("motto", "1 + 1"),
            Value::String("1 + 1".into())
        );
    }

    #[test]
    fn known_keys_reject_wrong_types() {
        assert_eq!(
            storable_value("require_gps_verification", &Value::Bool(false)).unwrap(),
            "false"
        );
        assert!(storable_value("require_gps_verification", &Value::String("maybe".into())).is_err());
        assert!(storable_value("clock_in_deadline", &Value::String("25:00".into())).is_err());
        assert!(storable_value("gps_verification_radius", &serde_json::json!(0)).is_err());
        assert_eq!(
            storable_value("organization_name", &Value::String(" NJSMA ".into())).unwrap(),
            "NJSMA"
        );
    }

    #[test]
    fn premises_coordinates_stay_on_the_globe() {
        assert!(storable_value("assembly_latitude", &serde_json::json!(200)).is_err());
        assert!(storable_value("assembly_latitude", &serde_json::json!(-90.5)).is_err());
        assert!(storable_value("assembly_longitude", &serde_json::json!(180.1)).is_err());
        assert_eq!(
            storable_value("assembly_latitude", &serde_json::json!(-90)).unwrap(),
            "-90"
        );
        assert_eq!(
            storable_value("assembly_longitude", &serde_json::json!(-0.52)).unwrap(),
            "-0.52"
        );
    }

    #[actix_web::test]
    async fn cache_serves_until_invalidated() {
        let store = MemoryStore::new();
        store.seed_settings(&default_entries(now_local())).await.unwrap();
        let cache = SettingsCache::new(Duration::from_secs(60));

        assert!(cache.attendance(&store).await.unwrap().require_gps);

        store
            .upsert_settings(
                SettingCategory::Security,
                &[("require_gps_verification".to_string(), "false".to_string())],
                "hr@njsma.gov.gh",
                now_local(),
            )
            .await
            .unwrap();
        assert!(cache.attendance(&store).await.unwrap().require_gps);

        cache.invalidate().await;
        assert!(!cache.attendance(&store).await.unwrap().require_gps);
    }
}
