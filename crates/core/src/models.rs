pub mod appointment;
pub mod appointment_type;
pub mod bank_account;
pub mod rule;
pub mod user;
