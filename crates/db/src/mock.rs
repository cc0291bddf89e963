//! In-memory repositories with the same observable behaviour as the
//! PostgreSQL ones, including the unique constraints. Used by tests across
//! the workspace.

pub mod repositories;

use std::sync::Arc;

use slotbook_core::repository::Repositories;

pub use repositories::{
    MemoryAppointmentRepository, MemoryAppointmentTypeRepository,
    MemoryAvailabilityRuleRepository, MemoryBankAccountRepository, MemoryUserRepository,
};

/// A fresh, empty set of in-memory repositories.
pub fn memory_repositories() -> Repositories {
    Repositories {
        appointments: Arc::new(MemoryAppointmentRepository::default()),
        rules: Arc::new(MemoryAvailabilityRuleRepository::default()),
        appointment_types: Arc::new(MemoryAppointmentTypeRepository::default()),
        bank_accounts: Arc::new(MemoryBankAccountRepository::default()),
        users: Arc::new(MemoryUserRepository::default()),
    }
}
