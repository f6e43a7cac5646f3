use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Present and late both mean the employee turned up.
    pub fn attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// One employee's attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub date_only: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub clock_in_time: NaiveDateTime,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub clock_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: String,
    pub clock_in_time: NaiveDateTime,
    pub status: AttendanceStatus,
    pub location: String,
}

impl NewAttendance {
    /// The day a record belongs to is always the day of its clock-in.
    pub fn date_only(&self) -> NaiveDate {
        self.clock_in_time.date()
    }
}

/// A record joined with the owner's directory entry, as reports show it.
#[derive(Debug, Clone)]
pub struct AttendanceEntry {
    pub record: AttendanceRecord,
    pub employee_name: String,
    pub department: Option<String>,
}

/// Filters for attendance listings; every field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub department: Option<String>,
    pub active_only: bool,
}
