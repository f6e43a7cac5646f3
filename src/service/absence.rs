use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{error, info};

use super::settings::{AttendanceSettings, SettingsCache};
use crate::error::AppError;
use crate::store::{AttendanceStore, Store};
use crate::utils::time::now_local;

/// Location tag on synthesized absence records.
pub const NOT_REPORTED: &str = "Not reported";

/// Gives every active employee without a record today an `absent` record
/// stamped at the deadline. Does nothing before the deadline; employees
/// who already have a record are skipped, so repeated runs are harmless.
pub async fn mark_daily_absences<S>(
    store: &S,
    settings: &AttendanceSettings,
    now: NaiveDateTime,
) -> Result<u64, AppError>
where
    S: AttendanceStore + ?Sized,
{
    if now.time() < settings.deadline {
        return Ok(0);
    }

    let day = now.date();
    let marked = store
        .mark_absent(day, day.and_time(settings.deadline), NOT_REPORTED)
        .await?;
    if marked > 0 {
        info!(%day, marked, "Marked unreported staff absent");
    }
    Ok(marked)
}

/// Runs the sweep every `every` on the actix runtime.
pub fn spawn_sweeper(store: Arc<dyn Store>, settings: SettingsCache, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(every);
        loop {
            ticker.tick().await;
            let result = match settings.attendance(store.as_ref()).await {
                Ok(current) => mark_daily_absences(store.as_ref(), &current, now_local()).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                error!(error = %e, "Absence sweep failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::attendance::{AttendanceQuery, AttendanceStatus, NewAttendance};
    use crate::model::employee::NewEmployee;
    use crate::model::staff_change::{ChangeAction, NewStaffChange};
    use crate::service::clock::AttendanceClock;
    use crate::service::geo::GeoPoint;
    use crate::store::EmployeeStore;
    use crate::store::memory::MemoryStore;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    async fn roster(store: &MemoryStore, ids: &[&str]) {
        for id in ids {
            store
                .insert_employee(
                    &NewEmployee {
                        employee_id: id.to_string(),
                        name: id.to_string(),
                        department: None,
                        email: None,
                        contact: None,
                    },
                    &NewStaffChange {
                        employee_id: id.to_string(),
                        action_type: ChangeAction::Added,
                        performed_by: "test".into(),
                        details: String::new(),
                    },
                    at(6, 0, 0),
                )
                .await
                .unwrap();
        }
    }

    #[actix_web::test]
    async fn sweep_waits_for_the_deadline() {
        let store = MemoryStore::new();
        roster(&store, &["A-001"]).await;
        let settings = AttendanceSettings::default();

        assert_eq!(mark_daily_absences(&store, &settings, at(9, 59, 0)).await.unwrap(), 0);
        assert!(store.attendance_for_day("A-001", at(0, 0, 0).date()).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn sweep_twice_marks_once() {
        let store = MemoryStore::new();
        roster(&store, &["A-001", "A-002", "A-003"]).await;
        store
            .insert_attendance(&NewAttendance {
                employee_id: "A-002".into(),
                clock_in_time: at(8, 10, 0),
                status: AttendanceStatus::Present,
                location: "EN-010-4770".into(),
            })
            .await
            .unwrap();
        let settings = AttendanceSettings::default();

        assert_eq!(mark_daily_absences(&store, &settings, at(10, 30, 0)).await.unwrap(), 2);
        assert_eq!(mark_daily_absences(&store, &settings, at(16, 0, 0)).await.unwrap(), 0);

        let rows = store
            .attendance_report(&AttendanceQuery {
                start_date: Some(at(0, 0, 0).date()),
                end_date: Some(at(0, 0, 0).date()),
                ..AttendanceQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        let absent: Vec<_> = rows
            .iter()
            .filter(|e| e.record.status == AttendanceStatus::Absent)
            .collect();
        assert_eq!(absent.len(), 2);
        for entry in absent {
            assert_eq!(entry.record.clock_in_time, at(10, 0, 0));
            assert_eq!(entry.record.location, NOT_REPORTED);
        }
    }

    #[actix_web::test]
    async fn sweep_racing_a_clock_in_leaves_one_record_each() {
        let store = MemoryStore::new();
        roster(&store, &["A-001", "A-002"]).await;
        let settings = AttendanceSettings::default();
        let clock = AttendanceClock::new(&store, &settings);

        let (swept, clocked) = futures::join!(
            mark_daily_absences(&store, &settings, at(10, 0, 0)),
            clock.clock_in("A-001", at(10, 0, 0), Some(GeoPoint::new(6.673, -0.520))),
        );
        swept.unwrap();

        let rows = store
            .attendance_report(&AttendanceQuery::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let a001: Vec<_> = rows.iter().filter(|e| e.record.employee_id == "A-001").collect();
        assert_eq!(a001.len(), 1);
        match clocked {
            Ok(_) => assert_eq!(a001[0].record.status, AttendanceStatus::Present),
            Err(err) => {
                assert_eq!(err.to_string(), "You have been marked absent for today");
                assert_eq!(a001[0].record.status, AttendanceStatus::Absent);
            }
        }
    }
}
