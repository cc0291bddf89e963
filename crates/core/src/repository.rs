//! Persistence seams. One trait per entity; PostgreSQL and in-memory
//! implementations live in the `slotbook-db` crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::BookingResult,
    models::{
        appointment::{Appointment, AppointmentFilter},
        appointment_type::AppointmentType,
        bank_account::BankAccount,
        rule::{AvailabilityRule, RuleBlock, RuleTarget, Upserted},
        user::User,
    },
};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> BookingResult<Option<Appointment>>;

    async fn find_by_short_id(&self, short_id: &str) -> BookingResult<Option<Appointment>>;

    /// Appointments on `date` that still hold their slot (status != rejected).
    async fn find_holding_slots_on(&self, date: NaiveDate) -> BookingResult<Vec<Appointment>>;

    /// The appointment holding `(date, hour)`, ignoring `exclude`.
    async fn find_slot_holder(
        &self,
        date: NaiveDate,
        hour: u32,
        exclude: Option<Uuid>,
    ) -> BookingResult<Option<Appointment>>;

    async fn list(&self, filter: &AppointmentFilter) -> BookingResult<Vec<Appointment>>;

    /// Inserts a new appointment. Fails with `Conflict::SlotTaken` when the
    /// slot is already held.
    async fn create(&self, appointment: &Appointment) -> BookingResult<Appointment>;

    /// Persists every mutable field. Fails with `Conflict::SlotTaken` when the
    /// new slot is already held by another appointment.
    async fn save(&self, appointment: &Appointment) -> BookingResult<Appointment>;
}

#[async_trait]
pub trait AvailabilityRuleRepository: Send + Sync {
    /// All rules, weekday rules first, each group in ascending key order.
    async fn list(&self) -> BookingResult<Vec<AvailabilityRule>>;

    async fn find(&self, id: i32) -> BookingResult<Option<AvailabilityRule>>;

    async fn find_by_target(&self, target: RuleTarget) -> BookingResult<Vec<AvailabilityRule>>;

    /// Creates the rule for `target` or overwrites the existing one.
    async fn upsert(
        &self,
        target: RuleTarget,
        block: &RuleBlock,
    ) -> BookingResult<(AvailabilityRule, Upserted)>;

    async fn save(&self, rule: &AvailabilityRule) -> BookingResult<AvailabilityRule>;

    /// Returns whether a rule was removed.
    async fn delete(&self, id: i32) -> BookingResult<bool>;

    /// Returns the number of rules removed.
    async fn delete_by_target(&self, target: RuleTarget) -> BookingResult<u64>;
}

#[async_trait]
pub trait AppointmentTypeRepository: Send + Sync {
    async fn list(&self, visible_only: bool) -> BookingResult<Vec<AppointmentType>>;

    async fn find(&self, id: i32) -> BookingResult<Option<AppointmentType>>;

    /// Fails with `Conflict::Duplicate` when the name is taken.
    async fn create(&self, name: &str) -> BookingResult<AppointmentType>;

    async fn save(&self, appointment_type: &AppointmentType) -> BookingResult<AppointmentType>;
}

#[async_trait]
pub trait BankAccountRepository: Send + Sync {
    async fn list(&self, active_only: bool) -> BookingResult<Vec<BankAccount>>;

    async fn find(&self, id: Uuid) -> BookingResult<Option<BankAccount>>;

    async fn create(&self, bank_name: &str, account_number: &str) -> BookingResult<BankAccount>;

    async fn save(&self, account: &BankAccount) -> BookingResult<BankAccount>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> BookingResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> BookingResult<Option<User>>;

    /// Fails with `Conflict::Duplicate` when the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> BookingResult<User>;
}

/// Every repository the services need, behind shared trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub rules: Arc<dyn AvailabilityRuleRepository>,
    pub appointment_types: Arc<dyn AppointmentTypeRepository>,
    pub bank_accounts: Arc<dyn BankAccountRepository>,
    pub users: Arc<dyn UserRepository>,
}
