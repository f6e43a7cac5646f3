use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::attendance::{AttendanceEntry, AttendanceQuery, AttendanceStatus};
use crate::store::{AttendanceStore, EmployeeFilter, EmployeeStore, LeaveStore};

/// Window of the per-employee attendance report.
pub const REPORT_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 120)]
    pub total_employees: u64,
    #[schema(example = 97)]
    pub present_today: u64,
    #[schema(example = 6)]
    pub on_leave_today: u64,
    #[schema(example = 11)]
    pub late_arrivals: u64,
    #[schema(example = 17)]
    pub absent_today: u64,
    #[schema(example = 114)]
    pub expected_today: u64,
}

pub async fn dashboard<S>(store: &S, today: NaiveDate) -> Result<DashboardStats, AppError>
where
    S: EmployeeStore + AttendanceStore + LeaveStore + ?Sized,
{
    let filter = EmployeeFilter {
        active_only: true,
        ..EmployeeFilter::default()
    };
    let total_employees = store.list_employees(&filter).await?.len() as u64;

    let rows = store
        .attendance_report(&AttendanceQuery {
            start_date: Some(today),
            end_date: Some(today),
            active_only: true,
            ..AttendanceQuery::default()
        })
        .await?;
    let present_today = rows
        .iter()
        .filter(|e| e.record.status.attended())
        .map(|e| e.record.employee_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    let late_arrivals = rows
        .iter()
        .filter(|e| e.record.status == AttendanceStatus::Late)
        .count() as u64;

    let on_leave_today = store.approved_leaves_between(today, today).await?.len() as u64;
    let expected_today = total_employees.saturating_sub(on_leave_today);

    Ok(DashboardStats {
        total_employees,
        present_today,
        on_leave_today,
        late_arrivals,
        absent_today: expected_today.saturating_sub(present_today),
        expected_today,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    #[schema(example = "NJ-0042")]
    pub employee_id: String,
    #[schema(example = "March 2026")]
    pub month: String,
    pub days_present: u64,
    pub days_late: u64,
    pub days_absent: u64,
    /// Approved leave days falling inside the month so far.
    pub leaves_taken: i64,
    pub total_days: u64,
    #[schema(example = 95.5)]
    pub attendance_rate: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Current month up to and including `today`.
pub async fn monthly_summary<S>(
    store: &S,
    employee_id: &str,
    today: NaiveDate,
) -> Result<MonthlySummary, AppError>
where
    S: AttendanceStore + LeaveStore + ?Sized,
{
    let month_start = today.with_day(1).unwrap_or(today);
    let rows = store
        .attendance_report(&AttendanceQuery {
            start_date: Some(month_start),
            end_date: Some(today),
            employee_id: Some(employee_id.to_string()),
            ..AttendanceQuery::default()
        })
        .await?;

    let count = |status: AttendanceStatus| rows.iter().filter(|e| e.record.status == status).count() as u64;
    let days_present = count(AttendanceStatus::Present);
    let days_late = count(AttendanceStatus::Late);
    let days_absent = count(AttendanceStatus::Absent);
    let total_days = rows.len() as u64;

    let leaves_taken = store
        .approved_leaves_between(month_start, today)
        .await?
        .iter()
        .filter(|l| l.employee_id == employee_id)
        .map(|l| l.days_within(month_start, today))
        .sum();

    let attendance_rate = if total_days == 0 {
        0.0
    } else {
        round1((days_present + days_late) as f64 / total_days as f64 * 100.0)
    };

    Ok(MonthlySummary {
        employee_id: employee_id.to_string(),
        month: today.format("%B %Y").to_string(),
        days_present,
        days_late,
        days_absent,
        leaves_taken,
        total_days,
        attendance_rate,
    })
}

/// Records of the last `REPORT_DAYS` days, newest first.
pub async fn recent_attendance<S>(
    store: &S,
    employee_id: &str,
    today: NaiveDate,
) -> Result<Vec<AttendanceEntry>, AppError>
where
    S: AttendanceStore + ?Sized,
{
    store
        .attendance_report(&AttendanceQuery {
            start_date: Some(today - Duration::days(REPORT_DAYS)),
            end_date: Some(today),
            employee_id: Some(employee_id.to_string()),
            ..AttendanceQuery::default()
        })
        .await
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::model::attendance::NewAttendance;
    use crate::model::employee::NewEmployee;
    use crate::model::leave_request::{LeaveStatus, NewLeave};
    use crate::model::staff_change::{ChangeAction, NewStaffChange};
    use crate::store::memory::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn stamp(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for id in ["A-001", "A-002", "A-003", "A-004"] {
            store
                .insert_employee(
                    &NewEmployee {
                        employee_id: id.into(),
                        name: id.into(),
                        department: Some("Works".into()),
                        email: None,
                        contact: None,
                    },
                    &NewStaffChange {
                        employee_id: id.into(),
                        action_type: ChangeAction::Added,
                        performed_by: "test".into(),
                        details: String::new(),
                    },
                    stamp(1, 6),
                )
                .await
                .unwrap();
        }
        store
    }

    async fn attend(store: &MemoryStore, id: &str, d: u32, status: AttendanceStatus) {
        store
            .insert_attendance(&NewAttendance {
                employee_id: id.into(),
                clock_in_time: stamp(d, 8),
                status,
                location: "EN-010-4770".into(),
            })
            .await
            .unwrap();
    }

    async fn approved_leave(store: &MemoryStore, id: &str, from: u32, to: u32) {
        let leave_id = store
            .insert_leave(
                &NewLeave {
                    employee_id: id.into(),
                    start_date: day(from),
                    end_date: day(to),
                },
                stamp(1, 9),
            )
            .await
            .unwrap();
        assert!(
            store
                .transition_leave(leave_id, LeaveStatus::Pending, LeaveStatus::Approved)
                .await
                .unwrap()
        );
    }

    #[actix_web::test]
    async fn dashboard_counts_today() {
        let store = seeded().await;
        attend(&store, "A-001", 10, AttendanceStatus::Present).await;
        attend(&store, "A-002", 10, AttendanceStatus::Late).await;
        attend(&store, "A-003", 9, AttendanceStatus::Present).await;
        approved_leave(&store, "A-004", 9, 11).await;

        let stats = dashboard(&store, day(10)).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_employees: 4,
                present_today: 2,
                on_leave_today: 1,
                late_arrivals: 1,
                absent_today: 1,
                expected_today: 3,
            }
        );
    }

    #[actix_web::test]
    async fn monthly_summary_rates_attendance() {
        let store = seeded().await;
        attend(&store, "A-001", 2, AttendanceStatus::Present).await;
        attend(&store, "A-001", 3, AttendanceStatus::Late).await;
        attend(&store, "A-001", 4, AttendanceStatus::Absent).await;
        approved_leave(&store, "A-001", 5, 6).await;
        approved_leave(&store, "A-002", 5, 6).await;

        let summary = monthly_summary(&store, "A-001", day(10)).await.unwrap();
        assert_eq!(summary.month, "March 2026");
        assert_eq!(summary.days_present, 1);
        assert_eq!(summary.days_late, 1);
        assert_eq!(summary.days_absent, 1);
        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.leaves_taken, 2);
        assert_eq!(summary.attendance_rate, 66.7);

        let empty = monthly_summary(&store, "A-003", day(10)).await.unwrap();
        assert_eq!(empty.attendance_rate, 0.0);
    }

    #[actix_web::test]
    async fn recent_is_newest_first() {
        let store = seeded().await;
        attend(&store, "A-001", 2, AttendanceStatus::Present).await;
        attend(&store, "A-001", 9, AttendanceStatus::Present).await;

        let rows = recent_attendance(&store, "A-001", day(10)).await.unwrap();
        let days: Vec<NaiveDate> = rows.iter().map(|e| e.record.date_only).collect();
        assert_eq!(days, vec![day(9), day(2)]);
    }
}
