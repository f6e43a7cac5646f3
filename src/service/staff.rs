//! Roster maintenance: bulk upload, single edits, and the two kinds of
//! removal. Every write goes through the store together with its
//! staff-change entry.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::employee::{Employee, Lifecycle, NewEmployee};
use crate::model::staff_change::{ChangeAction, NewStaffChange};
use crate::store::{EmployeeFilter, EmployeeStore};

pub const MAX_UPLOAD: usize = 1000;
const MAX_REPORTED_ERRORS: usize = 10;

/// One row of an uploaded roster, as the spreadsheet importer sends it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StaffRow {
    #[serde(rename = "staffId", default)]
    #[schema(example = "NJ-0042")]
    pub staff_id: String,
    #[serde(default)]
    #[schema(example = "Ama Mensah")]
    pub name: String,
    #[serde(default)]
    pub department: String,
    /// Older sheets call the department a unit.
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn valid_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && id.chars().any(|c| c.is_ascii_alphanumeric())
}

fn check_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if !(2..=100).contains(&len) {
        return Err(format!("Name '{}' must be 2-100 characters", name));
    }
    Ok(())
}

fn check_email(email: Option<&str>) -> Result<(), String> {
    match email {
        Some(e) if !e.contains('@') => Err(format!("Invalid email format '{}'", e)),
        _ => Ok(()),
    }
}

pub fn validate_row(row: &StaffRow) -> Result<NewEmployee, String> {
    let employee_id = row.staff_id.trim();
    let name = row.name.trim();
    if employee_id.is_empty() || name.is_empty() {
        return Err("Missing employee ID or name".to_string());
    }
    let id_len = employee_id.chars().count();
    if !(3..=20).contains(&id_len) {
        return Err(format!("Employee ID '{}' must be 3-20 characters", employee_id));
    }
    check_name(name)?;
    let email = non_empty(&row.email);
    check_email(email.as_deref())?;
    if !valid_id(employee_id) {
        return Err(format!("Employee ID '{}' contains invalid characters", employee_id));
    }

    Ok(NewEmployee {
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        department: non_empty(&row.department).or_else(|| non_empty(&row.unit)),
        email,
        contact: non_empty(&row.contact),
    })
}

fn describe(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

/// Field-by-field differences `candidate` would make to `current`.
fn diff(current: &Employee, candidate: &NewEmployee) -> Vec<String> {
    let mut changes = Vec::new();
    if current.name != candidate.name {
        changes.push(format!("name: {} -> {}", current.name, candidate.name));
    }
    let optional = [
        ("department", &current.department, &candidate.department),
        ("email", &current.email, &candidate.email),
        ("contact", &current.contact, &candidate.contact),
    ];
    for (field, old, new) in optional {
        if old != new {
            changes.push(format!(
                "{}: {} -> {}",
                field,
                describe(old.as_deref()),
                describe(new.as_deref())
            ));
        }
    }
    changes
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadOutcome {
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
    pub total: usize,
    pub errors: Vec<String>,
}

impl UploadOutcome {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.added > 0 {
            parts.push(format!("{} new staff members added", self.added));
        }
        if self.updated > 0 {
            parts.push(format!("{} existing staff members updated", self.updated));
        }
        if self.skipped > 0 {
            parts.push(format!("{} records skipped", self.skipped));
        }
        format!("Upload completed: {}", parts.join(", "))
    }

    /// First errors for the response, plus how many were left out.
    pub fn reported_errors(&self) -> (&[String], usize) {
        let shown = self.errors.len().min(MAX_REPORTED_ERRORS);
        (&self.errors[..shown], self.errors.len() - shown)
    }

    pub fn changed_anything(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Adds new staff and refreshes existing ones. Invalid rows are skipped with
/// a numbered message; each row commits on its own.
pub async fn upload<S>(
    store: &S,
    rows: &[StaffRow],
    performed_by: &str,
    at: NaiveDateTime,
) -> Result<UploadOutcome, AppError>
where
    S: EmployeeStore + ?Sized,
{
    if rows.is_empty() {
        return Err(AppError::validation("No staff data provided"));
    }
    if rows.len() > MAX_UPLOAD {
        return Err(AppError::validation(format!(
            "Too many records. Please upload in batches of {} or fewer.",
            MAX_UPLOAD
        )));
    }

    let mut outcome = UploadOutcome {
        total: rows.len(),
        ..UploadOutcome::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let candidate = match validate_row(row) {
            Ok(candidate) => candidate,
            Err(reason) => {
                outcome.errors.push(format!("Record {}: {}", index + 1, reason));
                outcome.skipped += 1;
                continue;
            }
        };

        let result = match store.find_employee(&candidate.employee_id).await? {
            Some(current) if current.lifecycle != Lifecycle::Deleted => {
                let changes = diff(&current, &candidate);
                if changes.is_empty() {
                    outcome.skipped += 1;
                    continue;
                }
                let updated = Employee {
                    name: candidate.name.clone(),
                    department: candidate.department.clone(),
                    email: candidate.email.clone(),
                    contact: candidate.contact.clone(),
                    date_modified: at,
                    ..current
                };
                let change = NewStaffChange {
                    employee_id: candidate.employee_id.clone(),
                    action_type: ChangeAction::Modified,
                    performed_by: performed_by.to_string(),
                    details: format!("Updated: {}", changes.join(", ")),
                };
                store
                    .update_employee(&updated, &change)
                    .await
                    .map(|_| outcome.updated += 1)
            }
            _ => {
                let change = NewStaffChange {
                    employee_id: candidate.employee_id.clone(),
                    action_type: ChangeAction::Added,
                    performed_by: performed_by.to_string(),
                    details: format!(
                        "New staff added: {}, Department: {}",
                        candidate.name,
                        describe(candidate.department.as_deref())
                    ),
                };
                store
                    .insert_employee(&candidate, &change, at)
                    .await
                    .map(|_| outcome.added += 1)
            }
        };

        match result {
            Ok(()) => {}
            Err(e @ AppError::Storage(_)) => return Err(e),
            Err(e) => {
                outcome.errors.push(format!("Record {}: {}", index + 1, e));
                outcome.skipped += 1;
            }
        }
    }

    info!(
        added = outcome.added,
        updated = outcome.updated,
        skipped = outcome.skipped,
        performed_by,
        "Staff upload processed"
    );
    Ok(outcome)
}

/// Partial edit from the HR console.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    /// `false` moves the employee out as transferred, `true` brings them back.
    pub is_active: Option<bool>,
    pub hr_email: Option<String>,
}

/// Live (non-deleted) roster entry or 404.
pub async fn find_listed<S>(store: &S, employee_id: &str) -> Result<Employee, AppError>
where
    S: EmployeeStore + ?Sized,
{
    match store.find_employee(employee_id).await? {
        Some(employee) if employee.lifecycle != Lifecycle::Deleted => Ok(employee),
        _ => Err(AppError::not_found(format!(
            "Employee with ID {} not found",
            employee_id
        ))),
    }
}

/// Applies the fields that differ. Returns the stored employee and the
/// list of changes, empty when nothing differed.
pub async fn update<S>(
    store: &S,
    employee_id: &str,
    patch: &StaffUpdate,
    performed_by: &str,
    at: NaiveDateTime,
) -> Result<(Employee, Vec<String>), AppError>
where
    S: EmployeeStore + ?Sized,
{
    let current = find_listed(store, employee_id).await?;

    let mut candidate = NewEmployee {
        employee_id: current.employee_id.clone(),
        name: current.name.clone(),
        department: current.department.clone(),
        email: current.email.clone(),
        contact: current.contact.clone(),
    };
    if let Some(name) = &patch.name {
        let name = name.trim();
        check_name(name).map_err(AppError::Validation)?;
        candidate.name = name.to_string();
    }
    if let Some(department) = &patch.department {
        candidate.department = non_empty(department);
    }
    if let Some(email) = &patch.email {
        candidate.email = non_empty(email);
        check_email(candidate.email.as_deref()).map_err(AppError::Validation)?;
    }
    if let Some(contact) = &patch.contact {
        candidate.contact = non_empty(contact);
    }

    let mut changes = diff(&current, &candidate);
    let lifecycle = match patch.is_active {
        Some(true) => Lifecycle::Active,
        Some(false) => Lifecycle::Transferred,
        None => current.lifecycle,
    };
    if lifecycle != current.lifecycle {
        changes.push(format!("status: {} -> {}", current.lifecycle, lifecycle));
    }
    if changes.is_empty() {
        return Ok((current, changes));
    }

    let updated = Employee {
        name: candidate.name,
        department: candidate.department,
        email: candidate.email,
        contact: candidate.contact,
        lifecycle,
        date_modified: at,
        ..current
    };
    let change = NewStaffChange {
        employee_id: updated.employee_id.clone(),
        action_type: ChangeAction::Modified,
        performed_by: performed_by.to_string(),
        details: format!("Updated: {}", changes.join(", ")),
    };
    store.update_employee(&updated, &change).await?;
    info!(employee_id, changes = changes.len(), "Staff member updated");
    Ok((updated, changes))
}

/// Soft removal marks the employee transferred; hard removal purges their
/// records and leaves a tombstone.
pub async fn remove<S>(
    store: &S,
    employee_id: &str,
    soft: bool,
    performed_by: &str,
    at: NaiveDateTime,
) -> Result<(Employee, ChangeAction), AppError>
where
    S: EmployeeStore + ?Sized,
{
    let current = find_listed(store, employee_id).await?;

    if soft {
        let change = NewStaffChange {
            employee_id: current.employee_id.clone(),
            action_type: ChangeAction::Transferred,
            performed_by: performed_by.to_string(),
            details: format!("Staff transferred/deactivated: {}", current.name),
        };
        let transferred = Employee {
            lifecycle: Lifecycle::Transferred,
            date_modified: at,
            ..current
        };
        store.update_employee(&transferred, &change).await?;
        info!(employee_id, performed_by, "Staff member transferred");
        return Ok((transferred, ChangeAction::Transferred));
    }

    store
        .hard_delete_employees(&[current.employee_id.clone()], performed_by, at)
        .await?;
    warn!(employee_id, performed_by, "Staff member permanently deleted");
    Ok((current, ChangeAction::Deleted))
}

/// Hard-deletes the listed employees, or none of them when any id is unknown.
pub async fn delete_selected<S>(
    store: &S,
    employee_ids: &[String],
    performed_by: &str,
    at: NaiveDateTime,
) -> Result<u64, AppError>
where
    S: EmployeeStore + ?Sized,
{
    if employee_ids.is_empty() {
        return Err(AppError::validation("No employee IDs provided"));
    }

    let mut missing = Vec::new();
    for id in employee_ids {
        match store.find_employee(id).await? {
            Some(e) if e.lifecycle != Lifecycle::Deleted => {}
            _ => missing.push(id.as_str()),
        }
    }
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Some employee IDs not found: [{}]",
            missing.join(", ")
        )));
    }

    let deleted = store
        .hard_delete_employees(employee_ids, performed_by, at)
        .await?;
    warn!(deleted, performed_by, "Selected staff permanently deleted");
    Ok(deleted)
}

pub async fn delete_all<S>(store: &S, performed_by: &str, at: NaiveDateTime) -> Result<u64, AppError>
where
    S: EmployeeStore + ?Sized,
{
    let ids: Vec<String> = store
        .list_employees(&EmployeeFilter::default())
        .await?
        .into_iter()
        .map(|e| e.employee_id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }
    let deleted = store.hard_delete_employees(&ids, performed_by, at).await?;
    warn!(deleted, performed_by, "All staff permanently deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::attendance::{AttendanceStatus, NewAttendance};
    use crate::store::AttendanceStore;
    use crate::store::memory::MemoryStore;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn row(id: &str, name: &str) -> StaffRow {
        StaffRow {
            staff_id: id.to_string(),
            name: name.to_string(),
            ..StaffRow::default()
        }
    }

    #[test]
    fn rows_are_validated_in_order() {
        assert_eq!(validate_row(&row("", "Ama")).unwrap_err(), "Missing employee ID or name");
        assert!(validate_row(&row("AB", "Ama")).unwrap_err().contains("3-20 characters"));
        assert!(validate_row(&row("NJ-1", "A")).unwrap_err().contains("2-100 characters"));
        assert!(validate_row(&row("NJ 01", "Ama")).unwrap_err().contains("invalid characters"));

        let mut bad_mail = row("NJ-1", "Ama");
        bad_mail.email = "ama.example.com".into();
        assert!(validate_row(&bad_mail).unwrap_err().contains("Invalid email"));

        let mut unit = row(" NJ-1.b_2 ", " Ama Mensah ");
        unit.unit = "Works".into();
        let ok = validate_row(&unit).unwrap();
        assert_eq!(ok.employee_id, "NJ-1.b_2");
        assert_eq!(ok.name, "Ama Mensah");
        assert_eq!(ok.department.as_deref(), Some("Works"));
        assert_eq!(ok.email, None);
    }

    #[actix_web::test]
    async fn upload_adds_updates_and_skips() {
        let store = MemoryStore::new();
        let first = upload(&store, &[row("NJ-1", "Ama"), row("NJ-2", "Kofi")], "hr", at(8))
            .await
            .unwrap();
        assert_eq!((first.added, first.updated, first.skipped), (2, 0, 0));

        let second = upload(
            &store,
            &[row("NJ-1", "Ama"), row("NJ-2", "Kofi Boateng"), row("x", "Bad")],
            "hr",
            at(9),
        )
        .await
        .unwrap();
        assert_eq!((second.added, second.updated, second.skipped), (0, 1, 2));
        assert_eq!(second.errors.len(), 1);
        assert!(second.errors[0].starts_with("Record 3:"));
        assert_eq!(
            second.summary(),
            "Upload completed: 1 existing staff members updated, 2 records skipped"
        );

        let renamed = store.find_employee("NJ-2").await.unwrap().unwrap();
        assert_eq!(renamed.name, "Kofi Boateng");
        let log = store.staff_changes_since(at(0)).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].action_type, ChangeAction::Modified);
    }

    #[actix_web::test]
    async fn upload_limits() {
        let store = MemoryStore::new();
        assert!(upload(&store, &[], "hr", at(8)).await.is_err());
        let rows = vec![row("NJ-1", "Ama"); MAX_UPLOAD + 1];
        assert!(matches!(
            upload(&store, &rows, "hr", at(8)).await,
            Err(AppError::Validation(_))
        ));

        let errors: Vec<StaffRow> = (0..12).map(|_| row("x", "y")).collect();
        let outcome = upload(&store, &errors, "hr", at(8)).await.unwrap();
        assert!(!outcome.changed_anything());
        let (shown, more) = outcome.reported_errors();
        assert_eq!((shown.len(), more), (10, 2));
    }

    #[actix_web::test]
    async fn soft_and_hard_removal() {
        let store = MemoryStore::new();
        upload(&store, &[row("NJ-1", "Ama"), row("NJ-2", "Kofi")], "hr", at(7))
            .await
            .unwrap();
        store
            .insert_attendance(&NewAttendance {
                employee_id: "NJ-2".into(),
                clock_in_time: at(8),
                status: AttendanceStatus::Present,
                location: "EN-010-4770".into(),
            })
            .await
            .unwrap();

        let (moved, action) = remove(&store, "NJ-1", true, "hr", at(9)).await.unwrap();
        assert_eq!(action, ChangeAction::Transferred);
        assert_eq!(moved.lifecycle, Lifecycle::Transferred);

        let (_, action) = remove(&store, "NJ-2", false, "hr", at(9)).await.unwrap();
        assert_eq!(action, ChangeAction::Deleted);
        assert!(store.attendance_for_day("NJ-2", at(8).date()).await.unwrap().is_none());
        assert!(matches!(
            remove(&store, "NJ-2", false, "hr", at(10)).await,
            Err(AppError::NotFound(_))
        ));

        // a deleted id can be uploaded again
        let again = upload(&store, &[row("NJ-2", "Kofi")], "hr", at(11)).await.unwrap();
        assert_eq!(again.added, 1);
    }

    #[actix_web::test]
    async fn update_reports_changes() {
        let store = MemoryStore::new();
        upload(&store, &[row("NJ-1", "Ama")], "hr", at(7)).await.unwrap();

        let patch = StaffUpdate {
            department: Some("Works".into()),
            is_active: Some(false),
            ..StaffUpdate::default()
        };
        let (updated, changes) = update(&store, "NJ-1", &patch, "hr", at(8)).await.unwrap();
        assert_eq!(changes, vec!["department: None -> Works", "status: active -> transferred"]);
        assert_eq!(updated.lifecycle, Lifecycle::Transferred);

        let (_, none) = update(&store, "NJ-1", &patch, "hr", at(9)).await.unwrap();
        assert!(none.is_empty());

        let bad = StaffUpdate {
            email: Some("nope".into()),
            ..StaffUpdate::default()
        };
        assert!(matches!(
            update(&store, "NJ-1", &bad, "hr", at(9)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn selected_delete_is_all_or_nothing() {
        let store = MemoryStore::new();
        upload(&store, &[row("NJ-1", "Ama"), row("NJ-2", "Kofi")], "hr", at(7))
            .await
            .unwrap();

        let ids = vec!["NJ-1".to_string(), "NJ-9".to_string()];
        let err = delete_selected(&store, &ids, "hr", at(8)).await.unwrap_err();
        assert_eq!(err.to_string(), "Some employee IDs not found: [NJ-9]");
        assert!(store.find_employee("NJ-1").await.unwrap().unwrap().is_active());

        assert_eq!(delete_all(&store, "hr", at(9)).await.unwrap(), 2);
        assert_eq!(delete_all(&store, "hr", at(10)).await.unwrap(), 0);
    }
}
