use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    ClockInReminder,
    AbsenceAlert,
    LateArrival,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A notification as recorded; nothing is actually mailed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub employee_id: String,
    pub notification_type: NotificationType,
    pub email_sent: bool,
    pub sent_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub message_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub employee_id: String,
    pub notification_type: NotificationType,
    pub sent_at: NaiveDateTime,
    pub message_content: String,
}

#[derive(Debug, Clone)]
pub struct NotificationEntry {
    pub notification: Notification,
    pub employee_name: String,
    pub employee_email: Option<String>,
}
