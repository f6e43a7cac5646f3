use crate::api::attendance::{
    ClockInRequest, ClockInResponse, ClockOutRequest, ClockOutResponse, DayRow, ReportedLocation,
    StatusResponse,
};
use crate::api::leave_request::{CreateLeave, LeaveResponse};
use crate::api::notifications::ReminderRequest;
use crate::api::reports::{ReportFilter, ReportRow};
use crate::api::staff::{DeleteSelected, DeleteStaff, StaffUpload, UploadResponse};
use crate::api::system::ResetRequest;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Employee, Lifecycle};
use crate::model::leave_request::LeaveStatus;
use crate::service::geo::GeoPoint;
use crate::service::reports::{DashboardStats, MonthlySummary};
use crate::service::staff::{StaffRow, StaffUpdate};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clock-In System API",
        version = "0.1.0",
        description = r#"
## Staff Attendance

Geofenced daily clock-in and clock-out for assembly staff.

### Key Features
- **Attendance**
  - Clock in from the premises before the daily deadline, clock out once
  - Unreported staff are marked absent after the deadline
- **Staff Directory**
  - Bulk upload, edit, soft and hard delete, change history
- **Leave**
  - Submit, approve and reject leave requests
- **Reports**
  - Dashboard counts, monthly summaries, department reports
- **Settings and Notifications**
  - Runtime-editable deadline and geofence, clock-in reminders

### Response Format
- JSON everywhere; errors are `{"error": "..."}`
- Timestamps are naive local time at the premises
"#,
    ),
    paths(
        crate::api::system::index,
        crate::api::system::health,
        crate::api::system::backup,
        crate::api::system::reset_system,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::status,
        crate::api::attendance::today,
        crate::api::attendance::monthly_summary,
        crate::api::attendance::staff_report,
        crate::api::attendance::mark_absences,

        crate::api::staff::upload_staff,
        crate::api::staff::list_staff,
        crate::api::staff::get_staff,
        crate::api::staff::update_staff,
        crate::api::staff::delete_staff,
        crate::api::staff::delete_selected,
        crate::api::staff::delete_all,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::reports::attendance_report,
        crate::api::reports::dashboard_stats,
        crate::api::reports::departments,
        crate::api::reports::department_staff,
        crate::api::reports::department_report,
        crate::api::reports::staff_changes,

        crate::api::settings::all_settings,
        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::notifications::send_reminders,
        crate::api::notifications::history
    ),
    components(
        schemas(
            ReportedLocation,
            GeoPoint,
            ClockInRequest,
            ClockInResponse,
            ClockOutRequest,
            ClockOutResponse,
            StatusResponse,
            DayRow,
            AttendanceRecord,
            AttendanceStatus,
            Employee,
            Lifecycle,
            StaffRow,
            StaffUpload,
            UploadResponse,
            StaffUpdate,
            DeleteStaff,
            DeleteSelected,
            CreateLeave,
            LeaveResponse,
            LeaveStatus,
            ReportFilter,
            ReportRow,
            DashboardStats,
            MonthlySummary,
            ReminderRequest,
            ResetRequest
        )
    ),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out and daily status"),
        (name = "Staff dashboard", description = "Per-employee day view and history"),
        (name = "Staff", description = "Staff directory management"),
        (name = "Leave", description = "Leave requests"),
        (name = "Reports", description = "Dashboards, reports and analytics"),
        (name = "Settings", description = "Runtime configuration"),
        (name = "Notifications", description = "Clock-in reminders"),
        (name = "System", description = "Health, backup and reset"),
    )
)]
pub struct ApiDoc;
