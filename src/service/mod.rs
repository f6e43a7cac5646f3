pub mod absence;
pub mod clock;
pub mod geo;
pub mod reminders;
pub mod reports;
pub mod settings;
pub mod staff;
