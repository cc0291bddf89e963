pub mod appointments;
pub mod catalog;
pub mod rules;

pub use appointments::AppointmentService;
pub use catalog::CatalogService;
pub use rules::RuleService;
