//! Process-local store used when no database is configured and by tests.
//! A single lock around all tables makes every operation atomic, which gives
//! the same one-record-per-day guarantee the MySQL unique key does.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;

use super::{
    AttendanceStore, EmployeeFilter, EmployeeStore, LeaveStore, NotificationStore, SettingsStore,
    Store, StoreResult,
};
use crate::model::attendance::{
    AttendanceEntry, AttendanceQuery, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use crate::model::employee::{Employee, Lifecycle, NewEmployee};
use crate::model::leave_request::{LeaveEntry, LeaveRequest, LeaveStatus, NewLeave};
use crate::model::notification::{NewNotification, Notification, NotificationEntry, NotificationType};
use crate::model::setting::{SettingCategory, SettingEntry};
use crate::model::staff_change::{ChangeAction, NewStaffChange, StaffChange};

#[derive(Default)]
struct Tables {
    employees: HashMap<String, Employee>,
    attendance: Vec<AttendanceRecord>,
    leaves: Vec<LeaveRequest>,
    settings: Vec<SettingEntry>,
    notifications: Vec<Notification>,
    staff_changes: Vec<StaffChange>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn log_change(&mut self, change: &NewStaffChange, at: NaiveDateTime) {
        let id = self.next_id();
        self.staff_changes.push(StaffChange {
            id,
            employee_id: change.employee_id.clone(),
            action_type: change.action_type,
            action_date: at,
            performed_by: change.performed_by.clone(),
            details: Some(change.details.clone()),
        });
    }

    fn has_record(&self, employee_id: &str, day: NaiveDate) -> bool {
        self.attendance
            .iter()
            .any(|r| r.employee_id == employee_id && r.date_only == day)
    }

    fn employee_name(&self, employee_id: &str) -> String {
        self.employees
            .get(employee_id)
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_employee(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        Ok(self.tables.lock().await.employees.get(employee_id).cloned())
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let tables = self.tables.lock().await;
        let mut staff: Vec<Employee> = tables
            .employees
            .values()
            .filter(|e| {
                if filter.active_only {
                    e.is_active()
                } else {
                    e.lifecycle != Lifecycle::Deleted
                }
            })
            .filter(|e| match &filter.department {
                Some(d) => e.department.as_deref() == Some(d.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(staff)
    }

    async fn insert_employee(
        &self,
        employee: &NewEmployee,
        change: &NewStaffChange,
        at: NaiveDateTime,
    ) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let date_added = match tables.employees.get(&employee.employee_id) {
            Some(existing) if existing.lifecycle != Lifecycle::Deleted => {
                return Err(crate::error::AppError::conflict(format!(
                    "Employee {} already exists",
                    employee.employee_id
                )));
            }
            _ => at,
        };
        tables.employees.insert(
            employee.employee_id.clone(),
            Employee {
                employee_id: employee.employee_id.clone(),
                name: employee.name.clone(),
                department: employee.department.clone(),
                email: employee.email.clone(),
                contact: employee.contact.clone(),
                lifecycle: Lifecycle::Active,
                date_added,
                date_modified: at,
            },
        );
        tables.log_change(change, at);
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee, change: &NewStaffChange) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        match tables.employees.get_mut(&employee.employee_id) {
            Some(stored) => *stored = employee.clone(),
            None => {
                return Err(crate::error::AppError::not_found(format!(
                    "Employee with ID {} not found",
                    employee.employee_id
                )));
            }
        }
        tables.log_change(change, employee.date_modified);
        Ok(())
    }

    async fn hard_delete_employees(
        &self,
        employee_ids: &[String],
        performed_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut affected = 0;
        for id in employee_ids {
            let name = match tables.employees.get_mut(id) {
                Some(e) if e.lifecycle != Lifecycle::Deleted => {
                    e.lifecycle = Lifecycle::Deleted;
                    e.date_modified = at;
                    e.name.clone()
                }
                _ => continue,
            };
            tables.attendance.retain(|r| &r.employee_id != id);
            tables.leaves.retain(|l| &l.employee_id != id);
            tables.notifications.retain(|n| &n.employee_id != id);
            tables.log_change(
                &NewStaffChange {
                    employee_id: id.clone(),
                    action_type: ChangeAction::Deleted,
                    performed_by: performed_by.to_string(),
                    details: format!("Staff permanently deleted: {}", name),
                },
                at,
            );
            affected += 1;
        }
        Ok(affected)
    }

    async fn departments(&self) -> StoreResult<Vec<String>> {
        let tables = self.tables.lock().await;
        let mut departments: Vec<String> = tables
            .employees
            .values()
            .filter(|e| e.is_active())
            .filter_map(|e| e.department.clone())
            .filter(|d| !d.is_empty())
            .collect();
        departments.sort();
        departments.dedup();
        Ok(departments)
    }

    async fn staff_changes_since(&self, since: NaiveDateTime) -> StoreResult<Vec<StaffChange>> {
        let tables = self.tables.lock().await;
        let mut changes: Vec<StaffChange> = tables
            .staff_changes
            .iter()
            .filter(|c| c.action_date >= since)
            .cloned()
            .collect();
        changes.sort_by(|a, b| b.action_date.cmp(&a.action_date).then(b.id.cmp(&a.id)));
        Ok(changes)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn attendance_for_day(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendance
            .iter()
            .find(|r| r.employee_id == employee_id && r.date_only == day)
            .cloned())
    }

    async fn insert_attendance(&self, new: &NewAttendance) -> StoreResult<Option<AttendanceRecord>> {
        let mut tables = self.tables.lock().await;
        if tables.has_record(&new.employee_id, new.date_only()) {
            return Ok(None);
        }
        let record = AttendanceRecord {
            id: tables.next_id(),
            employee_id: new.employee_id.clone(),
            date_only: new.date_only(),
            clock_in_time: new.clock_in_time,
            clock_out_time: None,
            status: new.status,
            location: new.location.clone(),
        };
        tables.attendance.push(record.clone());
        Ok(Some(record))
    }

    async fn record_clock_out(&self, record_id: u64, at: NaiveDateTime) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.attendance.iter_mut().find(|r| r.id == record_id) {
            Some(record) if record.clock_out_time.is_none() => {
                record.clock_out_time = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_absent(
        &self,
        day: NaiveDate,
        stamp: NaiveDateTime,
        location: &str,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let missing: Vec<String> = tables
            .employees
            .values()
            .filter(|e| e.is_active())
            .filter(|e| !tables.has_record(&e.employee_id, day))
            .map(|e| e.employee_id.clone())
            .collect();

        for employee_id in &missing {
            let id = tables.next_id();
            tables.attendance.push(AttendanceRecord {
                id,
                employee_id: employee_id.clone(),
                date_only: day,
                clock_in_time: stamp,
                clock_out_time: None,
                status: AttendanceStatus::Absent,
                location: location.to_string(),
            });
        }
        Ok(missing.len() as u64)
    }

    async fn attendance_report(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceEntry>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<AttendanceEntry> = tables
            .attendance
            .iter()
            .filter(|r| query.start_date.map_or(true, |d| r.date_only >= d))
            .filter(|r| query.end_date.map_or(true, |d| r.date_only <= d))
            .filter(|r| query.employee_id.as_deref().map_or(true, |id| r.employee_id == id))
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .filter_map(|r| {
                let employee = tables.employees.get(&r.employee_id)?;
                if query.active_only && !employee.is_active() {
                    return None;
                }
                if let Some(department) = &query.department {
                    if employee.department.as_deref() != Some(department.as_str()) {
                        return None;
                    }
                }
                Some(AttendanceEntry {
                    record: r.clone(),
                    employee_name: employee.name.clone(),
                    department: employee.department.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .date_only
                .cmp(&a.record.date_only)
                .then(a.record.clock_in_time.cmp(&b.record.clock_in_time))
        });
        Ok(rows)
    }

    async fn unreported_with_email(&self, day: NaiveDate) -> StoreResult<Vec<Employee>> {
        let tables = self.tables.lock().await;
        let mut staff: Vec<Employee> = tables
            .employees
            .values()
            .filter(|e| e.is_active())
            .filter(|e| e.email.as_deref().is_some_and(|m| !m.is_empty()))
            .filter(|e| !tables.has_record(&e.employee_id, day))
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(staff)
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert_leave(&self, leave: &NewLeave, at: NaiveDateTime) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.leaves.push(LeaveRequest {
            id,
            employee_id: leave.employee_id.clone(),
            start_date: leave.start_date,
            end_date: leave.end_date,
            status: LeaveStatus::Pending,
            created_at: at,
        });
        Ok(id)
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveEntry>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<LeaveEntry> = tables
            .leaves
            .iter()
            .map(|l| LeaveEntry {
                request: l.clone(),
                employee_name: tables.employee_name(&l.employee_id),
            })
            .collect();
        // newest first, same as the MySQL ORDER BY created_at DESC, id DESC
        rows.sort_by(|a, b| {
            (b.request.created_at, b.request.id).cmp(&(a.request.created_at, a.request.id))
        });
        Ok(rows)
    }

    async fn find_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn transition_leave(&self, id: u64, from: LeaveStatus, to: LeaveStatus) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.leaves.iter_mut().find(|l| l.id == id) {
            Some(leave) if leave.status == from => {
                leave.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approved_leaves_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Approved)
            .filter(|l| l.start_date <= to && l.end_date >= from)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn settings(&self, category: Option<SettingCategory>) -> StoreResult<Vec<SettingEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .settings
            .iter()
            .filter(|s| category.map_or(true, |c| s.category == c))
            .cloned()
            .collect())
    }

    async fn upsert_settings(
        &self,
        category: SettingCategory,
        values: &[(String, String)],
        updated_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        for (key, value) in values {
            match tables.settings.iter_mut().find(|s| &s.setting_key == key) {
                Some(existing) => {
                    existing.category = category;
                    existing.setting_value = value.clone();
                    existing.updated_at = at;
                    existing.updated_by = updated_by.to_string();
                }
                None => tables.settings.push(SettingEntry {
                    category,
                    setting_key: key.clone(),
                    setting_value: value.clone(),
                    updated_at: at,
                    updated_by: updated_by.to_string(),
                }),
            }
        }
        Ok(values.len() as u64)
    }

    async fn seed_settings(&self, defaults: &[SettingEntry]) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut seeded = 0;
        for entry in defaults {
            if !tables.settings.iter().any(|s| s.setting_key == entry.setting_key) {
                tables.settings.push(entry.clone());
                seeded += 1;
            }
        }
        Ok(seeded)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn notified_on(
        &self,
        employee_id: &str,
        kind: NotificationType,
        day: NaiveDate,
    ) -> StoreResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.notifications.iter().any(|n| {
            n.employee_id == employee_id && n.notification_type == kind && n.created_at.date() == day
        }))
    }

    async fn record_notification(&self, notification: &NewNotification) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.notifications.push(Notification {
            id,
            employee_id: notification.employee_id.clone(),
            notification_type: notification.notification_type,
            email_sent: true,
            sent_at: Some(notification.sent_at),
            created_at: notification.sent_at,
            message_content: Some(notification.message_content.clone()),
        });
        Ok(())
    }

    async fn notifications_since(&self, since: NaiveDateTime) -> StoreResult<Vec<NotificationEntry>> {
        let tables = self.tables.lock().await;
        let mut entries: Vec<NotificationEntry> = tables
            .notifications
            .iter()
            .filter(|n| n.created_at >= since)
            .map(|n| {
                let employee = tables.employees.get(&n.employee_id);
                NotificationEntry {
                    notification: n.clone(),
                    employee_name: employee.map(|e| e.name.clone()).unwrap_or_default(),
                    employee_email: employee.and_then(|e| e.email.clone()),
                }
            })
            .collect();
        entries.sort_by(|a, b| b.notification.created_at.cmp(&a.notification.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn reset_all(&self) -> StoreResult<()> {
        *self.tables.lock().await = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[actix_web::test]
    async fn leaves_list_newest_first() {
        let store = MemoryStore::new();
        let noon = |d| day(d).and_hms_opt(12, 0, 0).unwrap();
        let leave = |id: &str, d| NewLeave {
            employee_id: id.to_string(),
            start_date: day(d),
            end_date: day(d),
        };

        let older = store.insert_leave(&leave("A-001", 20), noon(1)).await.unwrap();
        let newest = store.insert_leave(&leave("A-002", 21), noon(3)).await.unwrap();
        let same_time = store.insert_leave(&leave("A-003", 22), noon(1)).await.unwrap();

        let ids: Vec<u64> = store
            .list_leaves()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.request.id)
            .collect();
        assert_eq!(ids, vec![newest, same_time, older]);
    }
}
