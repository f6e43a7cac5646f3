//! The per (employee, day) attendance state machine:
//! `NotClockedIn -> ClockedIn -> ClockedOut`, plus `Absent` once the sweep
//! has run for someone who never turned up.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum_macros::IntoStaticStr;
use tracing::{info, warn};

use super::geo::{self, GeoPoint};
use super::settings::AttendanceSettings;
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::model::employee::Employee;
use crate::store::{AttendanceStore, EmployeeStore};
use crate::utils::time::clock_face;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClockState {
    NotClockedIn,
    ClockedIn,
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    ClockedOut,
    Absent,
}

impl ClockState {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        match record {
            None => ClockState::NotClockedIn,
            Some(r) if r.status == AttendanceStatus::Absent => ClockState::Absent,
            Some(r) if r.clock_out_time.is_some() => ClockState::ClockedOut,
            Some(_) => ClockState::ClockedIn,
        }
    }

    pub fn can_clock_in(&self) -> bool {
        *self == ClockState::NotClockedIn
    }

    pub fn can_clock_out(&self) -> bool {
        *self == ClockState::ClockedIn
    }
}

#[derive(Debug, Clone)]
pub struct ClockIn {
    pub employee: Employee,
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone)]
pub struct ClockOut {
    pub employee: Employee,
    pub record: AttendanceRecord,
    pub worked: Duration,
}

#[derive(Debug, Clone)]
pub struct DayStatus {
    pub employee: Employee,
    pub state: ClockState,
    pub record: Option<AttendanceRecord>,
    /// Time between clock-in and clock-out, or "now" while still clocked in.
    pub worked: Option<Duration>,
}

pub struct AttendanceClock<'a, S: ?Sized> {
    store: &'a S,
    settings: &'a AttendanceSettings,
}

impl<'a, S> AttendanceClock<'a, S>
where
    S: EmployeeStore + AttendanceStore + ?Sized,
{
    pub fn new(store: &'a S, settings: &'a AttendanceSettings) -> Self {
        Self { store, settings }
    }

    pub async fn clock_in(
        &self,
        employee_id: &str,
        at: NaiveDateTime,
        location: Option<GeoPoint>,
    ) -> Result<ClockIn, AppError> {
        if self.settings.require_gps {
            let reported = location
                .ok_or_else(|| AppError::validation("GPS location is required for clock-in"))?;
            if !reported.is_valid() {
                return Err(AppError::validation("Invalid GPS coordinates"));
            }
            let fence = geo::check(reported, self.settings.premises, self.settings.radius_km);
            if !fence.within_range {
                warn!(
                    employee_id,
                    distance_km = fence.distance_km,
                    "Clock-in rejected outside premises"
                );
                return Err(AppError::Geofence {
                    premises: self.settings.premises_name.clone(),
                    distance_km: fence.distance_km,
                });
            }
        }

        let employee = self.active_employee(employee_id).await?;

        if at.time() > self.settings.deadline {
            return Err(AppError::validation(format!(
                "Clock-in deadline has passed! Staff must clock in before {}. You are marked as absent for today.",
                self.settings.deadline.format("%H:%M")
            )));
        }

        if let Some(existing) = self.store.attendance_for_day(employee_id, at.date()).await? {
            return Err(already_recorded(&existing));
        }

        let status = match self.settings.late_after {
            Some(late_after) if at.time() > late_after => AttendanceStatus::Late,
            _ => AttendanceStatus::Present,
        };
        let new = NewAttendance {
            employee_id: employee.employee_id.clone(),
            clock_in_time: at,
            status,
            location: self.settings.premises_name.clone(),
        };

        // the unique key wins any race the read above lost
        let record = match self.store.insert_attendance(&new).await? {
            Some(record) => record,
            None => {
                let existing = self
                    .store
                    .attendance_for_day(employee_id, at.date())
                    .await?
                    .ok_or_else(|| AppError::conflict("You have already clocked in today"))?;
                return Err(already_recorded(&existing));
            }
        };

        info!(employee_id, status = record.status.as_str(), "Clock-in recorded");
        Ok(ClockIn { employee, record })
    }

    pub async fn clock_out(&self, employee_id: &str, at: NaiveDateTime) -> Result<ClockOut, AppError> {
        let employee = self.active_employee(employee_id).await?;

        let record = self.store.attendance_for_day(employee_id, at.date()).await?;
        let mut record = match ClockState::of(record.as_ref()) {
            ClockState::ClockedIn => record.ok_or_else(no_clock_in)?,
            ClockState::NotClockedIn | ClockState::Absent => return Err(no_clock_in()),
            ClockState::ClockedOut => {
                let out = record.and_then(|r| r.clock_out_time);
                return Err(AppError::conflict(match out {
                    Some(out) => format!("You have already clocked out today at {}", clock_face(&out)),
                    None => "You have already clocked out today".to_string(),
                }));
            }
        };

        if at <= record.clock_in_time {
            return Err(AppError::conflict(
                "Clock-out time must be after your clock-in time",
            ));
        }

        if !self.store.record_clock_out(record.id, at).await? {
            return Err(AppError::conflict("You have already clocked out today"));
        }
        record.clock_out_time = Some(at);
        let worked = at - record.clock_in_time;

        info!(employee_id, worked_minutes = worked.num_minutes(), "Clock-out recorded");
        Ok(ClockOut {
            employee,
            record,
            worked,
        })
    }

    pub async fn status(
        &self,
        employee_id: &str,
        day: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<DayStatus, AppError> {
        let employee = self.active_employee(employee_id).await?;
        let record = self.store.attendance_for_day(employee_id, day).await?;
        let state = ClockState::of(record.as_ref());
        let worked = match (state, record.as_ref()) {
            (ClockState::ClockedIn, Some(r)) => Some(now - r.clock_in_time),
            (ClockState::ClockedOut, Some(r)) => r.clock_out_time.map(|out| out - r.clock_in_time),
            _ => None,
        };

        Ok(DayStatus {
            employee,
            state,
            record,
            worked,
        })
    }

    async fn active_employee(&self, employee_id: &str) -> Result<Employee, AppError> {
        match self.store.find_employee(employee_id).await? {
            Some(employee) if employee.is_active() => Ok(employee),
            Some(_) => Err(AppError::not_found(format!(
                "Employee {} is not active. Please contact HR.",
                employee_id
            ))),
            None => Err(AppError::not_found(
                "Employee not found. Please contact HR to register.",
            )),
        }
    }
}

fn no_clock_in() -> AppError {
    AppError::conflict("No clock-in record found for today. Please clock in first before clocking out.")
}

fn already_recorded(existing: &AttendanceRecord) -> AppError {
    if existing.status == AttendanceStatus::Absent {
        AppError::conflict("You have been marked absent for today")
    } else {
        AppError::conflict(format!(
            "You have already clocked in today at {}",
            clock_face(&existing.clock_in_time)
        ))
    }
}
