pub mod attendance;
pub mod leave_request;
pub mod notifications;
pub mod reports;
pub mod settings;
pub mod staff;
pub mod system;
