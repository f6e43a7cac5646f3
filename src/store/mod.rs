//! Persistence seams. Handlers and services only see these traits; the
//! MySQL pool and the in-memory store both implement all of them.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceQuery, AttendanceRecord, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave_request::{LeaveEntry, LeaveRequest, LeaveStatus, NewLeave};
use crate::model::notification::{NewNotification, NotificationEntry, NotificationType};
use crate::model::setting::{SettingCategory, SettingEntry};
use crate::model::staff_change::{NewStaffChange, StaffChange};

pub mod memory;
pub mod mysql;

pub type StoreResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    /// `true` lists only active staff, `false` everything except tombstones.
    pub active_only: bool,
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Looks up any row, tombstones included.
    async fn find_employee(&self, employee_id: &str) -> StoreResult<Option<Employee>>;

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>>;

    /// Inserts a new row, or revives a `deleted` tombstone with the same id.
    async fn insert_employee(
        &self,
        employee: &NewEmployee,
        change: &NewStaffChange,
        at: NaiveDateTime,
    ) -> StoreResult<()>;

    /// Writes every mutable column of `employee` together with its audit entry.
    async fn update_employee(&self, employee: &Employee, change: &NewStaffChange) -> StoreResult<()>;

    /// Removes attendance, leave and notification rows of each employee and
    /// leaves a `deleted` tombstone. Returns the number of employees affected.
    async fn hard_delete_employees(
        &self,
        employee_ids: &[String],
        performed_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64>;

    /// Distinct departments of active staff, sorted.
    async fn departments(&self) -> StoreResult<Vec<String>>;

    async fn staff_changes_since(&self, since: NaiveDateTime) -> StoreResult<Vec<StaffChange>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn attendance_for_day(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Returns `None` when the employee already has a record for that day.
    async fn insert_attendance(&self, new: &NewAttendance) -> StoreResult<Option<AttendanceRecord>>;

    /// Sets the clock-out of a record that has none yet. Returns `false` when
    /// the record was already clocked out.
    async fn record_clock_out(&self, record_id: u64, at: NaiveDateTime) -> StoreResult<bool>;

    /// Creates an `absent` record for every active employee without a record
    /// on `day`. Employees that already have one are left alone.
    async fn mark_absent(
        &self,
        day: NaiveDate,
        stamp: NaiveDateTime,
        location: &str,
    ) -> StoreResult<u64>;

    /// Newest day first.
    async fn attendance_report(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceEntry>>;

    /// Active staff with an email and no record on `day`.
    async fn unreported_with_email(&self, day: NaiveDate) -> StoreResult<Vec<Employee>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert_leave(&self, leave: &NewLeave, at: NaiveDateTime) -> StoreResult<u64>;

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveEntry>>;

    async fn find_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>>;

    /// Moves a request from `from` to `to`; `false` when it was not in `from`.
    async fn transition_leave(&self, id: u64, from: LeaveStatus, to: LeaveStatus) -> StoreResult<bool>;

    /// Approved requests overlapping `[from, to]`.
    async fn approved_leaves_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings(&self, category: Option<SettingCategory>) -> StoreResult<Vec<SettingEntry>>;

    /// Upserts `(key, value)` pairs in one transaction.
    async fn upsert_settings(
        &self,
        category: SettingCategory,
        values: &[(String, String)],
        updated_by: &str,
        at: NaiveDateTime,
    ) -> StoreResult<u64>;

    /// Inserts entries whose key is not stored yet; existing values win.
    async fn seed_settings(&self, defaults: &[SettingEntry]) -> StoreResult<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn notified_on(
        &self,
        employee_id: &str,
        kind: NotificationType,
        day: NaiveDate,
    ) -> StoreResult<bool>;

    async fn record_notification(&self, notification: &NewNotification) -> StoreResult<()>;

    /// Newest first.
    async fn notifications_since(&self, since: NaiveDateTime) -> StoreResult<Vec<NotificationEntry>>;
}

/// Everything the service persists, plus whole-database operations.
#[async_trait]
pub trait Store: EmployeeStore + AttendanceStore + LeaveStore + SettingsStore + NotificationStore {
    async fn ping(&self) -> StoreResult<()>;

    /// Empties every table.
    async fn reset_all(&self) -> StoreResult<()>;
}
