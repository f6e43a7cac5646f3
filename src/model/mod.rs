pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod notification;
pub mod setting;
pub mod staff_change;
