use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingCategory {
    Attendance,
    Location,
    Organization,
    Security,
    Preferences,
    Notifications,
    System,
}

impl SettingCategory {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingEntry {
    pub category: SettingCategory,
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: NaiveDateTime,
    pub updated_by: String,
}
