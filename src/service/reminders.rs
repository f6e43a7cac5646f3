use chrono::{NaiveDateTime, NaiveTime};
use tracing::info;

use crate::error::AppError;
use crate::model::notification::{NewNotification, NotificationType};
use crate::store::{AttendanceStore, NotificationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRun {
    pub reminders_sent: u64,
    pub total_staff_to_remind: u64,
}

/// Records one clock-in reminder per day for each active employee with an
/// email who has no attendance record yet. Nothing is mailed; the reminder
/// is logged and stored.
pub async fn send_clock_in_reminders<S>(
    store: &S,
    cutoff: NaiveTime,
    requested_by: &str,
    now: NaiveDateTime,
) -> Result<ReminderRun, AppError>
where
    S: AttendanceStore + NotificationStore + ?Sized,
{
    if now.time() < cutoff {
        return Err(AppError::validation("It's too early to send reminders"));
    }

    let today = now.date();
    let staff = store.unreported_with_email(today).await?;
    let mut reminders_sent = 0;

    for employee in &staff {
        if store
            .notified_on(&employee.employee_id, NotificationType::ClockInReminder, today)
            .await?
        {
            continue;
        }
        let message_content = format!("Reminder: Please clock in for {}", today.format("%B %d, %Y"));
        store
            .record_notification(&NewNotification {
                employee_id: employee.employee_id.clone(),
                notification_type: NotificationType::ClockInReminder,
                sent_at: now,
                message_content: message_content.clone(),
            })
            .await?;
        info!(
            employee_id = %employee.employee_id,
            email = employee.email.as_deref().unwrap_or_default(),
            message = %message_content,
            "Clock-in reminder"
        );
        reminders_sent += 1;
    }

    info!(reminders_sent, requested_by, "Reminder run finished");
    Ok(ReminderRun {
        reminders_sent,
        total_staff_to_remind: staff.len() as u64,
    })
}
