use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeAction {
    Added,
    Modified,
    Transferred,
    Deleted,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Roster audit trail entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffChange {
    pub id: u64,
    pub employee_id: String,
    pub action_type: ChangeAction,
    pub action_date: NaiveDateTime,
    pub performed_by: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStaffChange {
    pub employee_id: String,
    pub action_type: ChangeAction,
    pub performed_by: String,
    pub details: String,
}
