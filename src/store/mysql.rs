use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Row};
use tracing::debug;

use super::{
    AttendanceStore, EmployeeFilter, EmployeeStore, LeaveStore, NotificationStore, SettingsStore,
    Store, StoreResult,
};
use crate::error::{AppError, is_duplicate_key};
use crate::model::attendance::{
    AttendanceEntry, AttendanceQuery, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use crate::model::employee::{Employee, Lifecycle, NewEmployee};
use crate::model::leave_request::{LeaveEntry, LeaveRequest, LeaveStatus, NewLeave};
use crate::model::notification::{NewNotification, Notification, NotificationEntry, NotificationType};
use crate::model::setting::{SettingCategory, SettingEntry};
use crate::model::staff_change::{ChangeAction, NewStaffChange, StaffChange};

const EMPLOYEE_COLUMNS: &str =
    "e.employee_id, e.name, e.department, e.email, e.contact, e.lifecycle, e.date_added, e.date_modified";

const ATTENDANCE_COLUMNS: &str =
    "a.id, a.employee_id, a.date_only, a.clock_in_time, a.clock_out_time, a.status, a.location";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Date(NaiveDate),
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &'q [FilterValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            FilterValue::Str(v) => query.bind(v.as_str()),
            FilterValue::Date(v) => query.bind(*v),
        };
    }
    query
}

/// Decodes a text column into one of the strum-backed enums.
fn parse_column<T>(row: &MySqlRow, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn employee_from_row(row: &MySqlRow) -> Result<Employee, sqlx::Error> {
    Ok(Employee {
        employee_id: row.try_get("employee_id")?,
        name: row.try_get("name")?,
        department: row.try_get("department")?,
        email: row.try_get("email")?,
        contact: row.try_get("contact")?,
        lifecycle: parse_column::<Lifecycle>(row, "lifecycle")?,
        date_added: row.try_get("date_added")?,
        date_modified: row.try_get("date_modified")?,
    })
}

fn attendance_from_row(row: &MySqlRow) -> Result<AttendanceRecord, sqlx::Error> {
    Ok(AttendanceRecord {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        date_only: row.try_get("date_only")?,
        clock_in_time: row.try_get("clock_in_time")?,
        clock_out_time: row.try_get("clock_out_time")?,
        status: parse_column::<AttendanceStatus>(row, "status")?,
        location: row.try_get("location")?,
    })
}

fn leave_from_row(row: &MySqlRow) -> Result<LeaveRequest, sqlx::Error> {
    Ok(LeaveRequest {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: parse_column::<LeaveStatus>(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn setting_from_row(row: &MySqlRow) -> Result<SettingEntry, sqlx::Error> {
    Ok(SettingEntry {
        category: parse_column::<SettingCategory>(row, "category")?,
        setting_key: row.try_get("setting_key")?,
        setting_value: row.try_get("setting_value")?,
        updated_at: row.try_get("updated_at")?,
        updated_by: row.try_get("updated_by")?,
    })
}

async fn log_change(
    tx: &mut sqlx::Transaction<'_, MySql>,
    change: &NewStaffChange,
    at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO staff_changes (employee_id, action_type, action_date, performed_by, details)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&change.employee_id)
    .bind(change.action_type.as_str())
    .bind(at)
    .bind(&change.performed_by)
    .bind(&change.details)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn find_employee(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees e WHERE e.employee_id = ?", EMPLOYEE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(employee_from_row).transpose()?)
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let mut conditions = vec![if filter.active_only {
            "e.lifecycle = 'active'"
        } else {
            "e.lifecycle <> 'deleted'"
        }];
        let mut bindings = Vec::new();

        if let Some(department) = &filter.department {
            conditions.push("e.department = ?");
            bindings.push(FilterValue::Str(department.clone()));
        }

        let sql = format!(
            "SELECT {} FROM employees e WHERE {} ORDER BY e.employee_id",
            EMPLOYEE_COLUMNS,
            conditions.join(" AND ")
        );
        debug!(sql = %sql, "Listing employees");

        let rows = bind_all(sqlx::query(&sql), &bindings)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(employee_from_row).collect::<Result<_, _>>()?)
    }

    async fn insert_employee(
        &self,
        employee: &NewEmployee,
        change: &NewStaffChange,
        at: NaiveDateTime,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, String>(
            "SELECT lifecycle FROM employees WHERE employee_id = ? FOR UPDATE",
        )
        .bind(&employee.employee_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing.as_deref() {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO employees
                        (employee_id, name, department, email, contact, lifecycle, date_added, date_modified)
                    VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
                    "#,
                )
                .bind(&employee.employee_id)
                .bind(&employee.name)
                .bind(&employee.department)
                .bind(&employee.email)
                .bind(&employee.contact)
                .bind(at)
                .bind(at)
                .execute(&mut *tx)
                .await?;
            }
            Some("deleted") => {
                sqlx::query(
                    r#"
                    UPDATE employees
                    SET name = ?, department = ?, email = ?, contact = ?,
                        lifecycle = 'active', date_added = ?, date_modified = ?
                    WHERE employee_id = ?
                    "#,
                )
                .bind(&employee.name)
                .bind(&employee.department)
                .bind(&employee.email)
                .bind(&employee.contact)
                .bind(at)
                .bind(at)
                .bind(&employee.employee_id)
                .execute(&mut *tx)
                .await?;
            }
            Some(_) => {
                return Err(AppError::conflict(format!(
                    "Employee {} already exists",
                    employee.employee_id
                )));
            }
        }

        log_change(&mut tx, change, at).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee, change: &NewStaffChange) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = ?, department = ?, email = ?, contact = ?, lifecycle = ?, date_modified = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.department)
        .bind(&employee.email)
        .bind(&employee.contact)
        .bind(employee.lifecycle.as_str())
        .bind(employee.date_modified)
        .bind(&employee.employee_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Employee with ID {} not found",
                employee.employee_id
            )));
        }

        log_change(&mut tx, change, employee.date_modified).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn hard_delete_employees(
        &self,
        employee_ids: &[String],
        performed_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for employee_id in employee_ids {
            let row = sqlx::query_as::<_, (String, String)>(
                "SELECT name, lifecycle FROM employees WHERE employee_id = ? FOR UPDATE",
            )
            .bind(employee_id)
            .fetch_optional(&mut *tx)
            .await?;

            let name = match row {
                Some((name, lifecycle)) if lifecycle != "deleted" => name,
                _ => continue,
            };

            for table in ["attendance", "leave_requests", "email_notifications"] {
                let sql = format!("DELETE FROM {} WHERE employee_id = ?", table);
                sqlx::query(&sql).bind(employee_id).execute(&mut *tx).await?;
            }

            sqlx::query(
                "UPDATE employees SET lifecycle = 'deleted', date_modified = ? WHERE employee_id = ?",
            )
            .bind(at)
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;

            let change = NewStaffChange {
                employee_id: employee_id.clone(),
                action_type: ChangeAction::Deleted,
                performed_by: performed_by.to_string(),
                details: format!("Staff permanently deleted: {}", name),
            };
            log_change(&mut tx, &change, at).await?;
            affected += 1;
        }

        tx.commit().await?;
        Ok(affected)
    }

    async fn departments(&self) -> StoreResult<Vec<String>> {
        let departments = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT department
            FROM employees
            WHERE lifecycle = 'active' AND department IS NOT NULL AND department <> ''
            ORDER BY department
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    async fn staff_changes_since(&self, since: NaiveDateTime) -> StoreResult<Vec<StaffChange>> {
        let rows = sqlx::query(
            r#"
            SELECT id, employee_id, action_type, action_date, performed_by, details
            FROM staff_changes
            WHERE action_date >= ?
            ORDER BY action_date DESC, id DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let changes = rows
            .iter()
            .map(|row| {
                Ok(StaffChange {
                    id: row.try_get("id")?,
                    employee_id: row.try_get("employee_id")?,
                    action_type: parse_column::<ChangeAction>(row, "action_type")?,
                    action_date: row.try_get("action_date")?,
                    performed_by: row.try_get("performed_by")?,
                    details: row.try_get("details")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(changes)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn attendance_for_day(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {} FROM attendance a WHERE a.employee_id = ? AND a.date_only = ?",
            ATTENDANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(attendance_from_row).transpose()?)
    }

    async fn insert_attendance(&self, new: &NewAttendance) -> StoreResult<Option<AttendanceRecord>> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date_only, clock_in_time, status, location)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.employee_id)
        .bind(new.date_only())
        .bind(new.clock_in_time)
        .bind(new.status.as_str())
        .bind(&new.location)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Some(AttendanceRecord {
                id: done.last_insert_id(),
                employee_id: new.employee_id.clone(),
                date_only: new.date_only(),
                clock_in_time: new.clock_in_time,
                clock_out_time: None,
                status: new.status,
                location: new.location.clone(),
            })),
            // the (employee_id, date_only) unique key lost a race
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn record_clock_out(&self, record_id: u64, at: NaiveDateTime) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET clock_out_time = ?
            WHERE id = ? AND clock_out_time IS NULL
            "#,
        )
        .bind(at)
        .bind(record_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_absent(
        &self,
        day: NaiveDate,
        stamp: NaiveDateTime,
        location: &str,
    ) -> StoreResult<u64> {
        // IGNORE covers a clock-in that commits between the NOT EXISTS check and the insert
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO attendance (employee_id, date_only, clock_in_time, status, location)
            SELECT e.employee_id, ?, ?, 'absent', ?
            FROM employees e
            WHERE e.lifecycle = 'active'
            AND NOT EXISTS (
                SELECT 1 FROM attendance a
                WHERE a.employee_id = e.employee_id AND a.date_only = ?
            )
            "#,
        )
        .bind(day)
        .bind(stamp)
        .bind(location)
        .bind(day)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn attendance_report(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceEntry>> {
        let mut conditions = Vec::new();
        let mut bindings = Vec::new();

        if let Some(start) = query.start_date {
            conditions.push("a.date_only >= ?");
            bindings.push(FilterValue::Date(start));
        }
        if let Some(end) = query.end_date {
            conditions.push("a.date_only <= ?");
            bindings.push(FilterValue::Date(end));
        }
        if let Some(employee_id) = &query.employee_id {
            conditions.push("a.employee_id = ?");
            bindings.push(FilterValue::Str(employee_id.clone()));
        }
        if let Some(status) = query.status {
            conditions.push("a.status = ?");
            bindings.push(FilterValue::Str(status.as_str().to_string()));
        }
        if let Some(department) = &query.department {
            conditions.push("e.department = ?");
            bindings.push(FilterValue::Str(department.clone()));
        }
        if query.active_only {
            conditions.push("e.lifecycle = 'active'");
        }

        let where_clause = if conditions.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT {}, e.name AS employee_name, e.department
            FROM attendance a
            JOIN employees e ON e.employee_id = a.employee_id
            {}
            ORDER BY a.date_only DESC, a.clock_in_time ASC
            "#,
            ATTENDANCE_COLUMNS, where_clause
        );
        debug!(sql = %sql, "Fetching attendance report");

        let rows = bind_all(sqlx::query(&sql), &bindings)
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(|row| {
                Ok(AttendanceEntry {
                    record: attendance_from_row(row)?,
                    employee_name: row.try_get("employee_name")?,
                    department: row.try_get("department")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(entries)
    }

    async fn unreported_with_email(&self, day: NaiveDate) -> StoreResult<Vec<Employee>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM employees e
            WHERE e.lifecycle = 'active'
            AND e.email IS NOT NULL AND e.email <> ''
            AND NOT EXISTS (
                SELECT 1 FROM attendance a
                WHERE a.employee_id = e.employee_id AND a.date_only = ?
            )
            ORDER BY e.employee_id
            "#,
            EMPLOYEE_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(day).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(employee_from_row).collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn insert_leave(&self, leave: &NewLeave, at: NaiveDateTime) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests (employee_id, start_date, end_date, status, created_at)
            VALUES (?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(&leave.employee_id)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.employee_id, l.start_date, l.end_date, l.status, l.created_at,
                   e.name AS employee_name
            FROM leave_requests l
            JOIN employees e ON e.employee_id = l.employee_id
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| {
                Ok(LeaveEntry {
                    request: leave_from_row(row)?,
                    employee_name: row.try_get("employee_name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(entries)
    }

    async fn find_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, employee_id, start_date, end_date, status, created_at
            FROM leave_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(leave_from_row).transpose()?)
    }

    async fn transition_leave(&self, id: u64, from: LeaveStatus, to: LeaveStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn approved_leaves_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, employee_id, start_date, end_date, status, created_at
            FROM leave_requests
            WHERE status = 'approved' AND start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(to)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(leave_from_row).collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl SettingsStore for MySqlStore {
    async fn settings(&self, category: Option<SettingCategory>) -> StoreResult<Vec<SettingEntry>> {
        let rows = match category {
            Some(category) => {
                sqlx::query(
                    r#"
                    SELECT category, setting_key, setting_value, updated_at, updated_by
                    FROM system_settings
                    WHERE category = ?
                    ORDER BY setting_key
                    "#,
                )
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT category, setting_key, setting_value, updated_at, updated_by
                    FROM system_settings
                    ORDER BY category, setting_key
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.iter().map(setting_from_row).collect::<Result<_, _>>()?)
    }

    async fn upsert_settings(
        &self,
        category: SettingCategory,
        values: &[(String, String)],
        updated_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in values {
            sqlx::query(
                r#"
                INSERT INTO system_settings (category, setting_key, setting_value, updated_at, updated_by)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    category = VALUES(category),
                    setting_value = VALUES(setting_value),
                    updated_at = VALUES(updated_at),
                    updated_by = VALUES(updated_by)
                "#,
            )
            .bind(category.as_str())
            .bind(key)
            .bind(value)
            .bind(at)
            .bind(updated_by)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(values.len() as u64)
    }

    async fn seed_settings(&self, defaults: &[SettingEntry]) -> StoreResult<u64> {
        let mut seeded = 0;
        for entry in defaults {
            let result = sqlx::query(
                r#"
                INSERT IGNORE INTO system_settings
                    (category, setting_key, setting_value, updated_at, updated_by)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.category.as_str())
            .bind(&entry.setting_key)
            .bind(&entry.setting_value)
            .bind(entry.updated_at)
            .bind(&entry.updated_by)
            .execute(&self.pool)
            .await?;
            seeded += result.rows_affected();
        }
        Ok(seeded)
    }
}

#[async_trait]
impl NotificationStore for MySqlStore {
    async fn notified_on(
        &self,
        employee_id: &str,
        kind: NotificationType,
        day: NaiveDate,
    ) -> StoreResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM email_notifications
            WHERE employee_id = ? AND notification_type = ? AND DATE(created_at) = ?
            "#,
        )
        .bind(employee_id)
        .bind(kind.as_str())
        .bind(day)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn record_notification(&self, notification: &NewNotification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_notifications
                (employee_id, notification_type, email_sent, sent_at, created_at, message_content)
            VALUES (?, ?, TRUE, ?, ?, ?)
            "#,
        )
        .bind(&notification.employee_id)
        .bind(notification.notification_type.as_str())
        .bind(notification.sent_at)
        .bind(notification.sent_at)
        .bind(&notification.message_content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn notifications_since(&self, since: NaiveDateTime) -> StoreResult<Vec<NotificationEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT n.id, n.employee_id, n.notification_type, n.email_sent, n.sent_at,
                   n.created_at, n.message_content, e.name AS employee_name, e.email AS employee_email
            FROM email_notifications n
            JOIN employees e ON e.employee_id = n.employee_id
            WHERE n.created_at >= ?
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| {
                Ok(NotificationEntry {
                    notification: Notification {
                        id: row.try_get("id")?,
                        employee_id: row.try_get("employee_id")?,
                        notification_type: parse_column::<NotificationType>(row, "notification_type")?,
                        email_sent: row.try_get("email_sent")?,
                        sent_at: row.try_get("sent_at")?,
                        created_at: row.try_get("created_at")?,
                        message_content: row.try_get("message_content")?,
                    },
                    employee_name: row.try_get("employee_name")?,
                    employee_email: row.try_get("employee_email")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(entries)
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn reset_all(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        // children before employees because of the foreign keys
        for table in [
            "attendance",
            "leave_requests",
            "email_notifications",
            "staff_changes",
            "system_settings",
            "employees",
        ] {
            let sql = format!("DELETE FROM {}", table);
            sqlx::query(&sql).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
