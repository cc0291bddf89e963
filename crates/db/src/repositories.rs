pub mod appointment;
pub mod appointment_type;
pub mod availability_rule;
pub mod bank_account;
pub mod user;

pub use appointment::PgAppointmentRepository;
pub use appointment_type::PgAppointmentTypeRepository;
pub use availability_rule::PgAvailabilityRuleRepository;
pub use bank_account::PgBankAccountRepository;
pub use user::PgUserRepository;
