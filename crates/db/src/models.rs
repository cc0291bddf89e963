//! Row types as stored in PostgreSQL and their conversion to domain models.

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Report, eyre};
use slotbook_core::models::{
    appointment::Appointment,
    appointment_type::AppointmentType,
    bank_account::BankAccount,
    rule::{AvailabilityRule, RuleTarget},
    user::User,
};
use sqlx::FromRow;
use uuid::Uuid;

pub const APPOINTMENT_COLUMNS: &str = "id, short_id, first_name, last_name, email, phone_number, \
    appointment_date, appointment_hour, appointment_type_id, bank_account_id, bank_transfer, \
    receipt_path, status, rejection_reason, meeting_link, admin_note, created_at, updated_at";

pub const RULE_COLUMNS: &str =
    "id, day_of_week, specific_date, unavailable_hours, all_day, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub short_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub appointment_date: NaiveDate,
    pub appointment_hour: i32,
    pub appointment_type_id: i32,
    pub bank_account_id: Option<Uuid>,
    pub bank_transfer: String,
    pub receipt_path: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub meeting_link: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = Report;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            short_id: row.short_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            appointment_date: row.appointment_date,
            appointment_hour: u32::try_from(row.appointment_hour)
                .map_err(|_| eyre!("Invalid stored hour {}", row.appointment_hour))?,
            appointment_type_id: row.appointment_type_id,
            bank_account_id: row.bank_account_id,
            bank_transfer: row.bank_transfer,
            receipt_path: row.receipt_path,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            rejection_reason: row.rejection_reason,
            meeting_link: row.meeting_link,
            admin_note: row.admin_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAvailabilityRule {
    pub id: i32,
    pub day_of_week: Option<i16>,
    pub specific_date: Option<NaiveDate>,
    pub unavailable_hours: Vec<i32>,
    pub all_day: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rule row returned by an upsert, with whether the row was inserted.
#[derive(Debug, Clone, FromRow)]
pub struct DbUpsertedRule {
    #[sqlx(flatten)]
    pub rule: DbAvailabilityRule,
    pub inserted: bool,
}

impl TryFrom<DbAvailabilityRule> for AvailabilityRule {
    type Error = Report;

    fn try_from(row: DbAvailabilityRule) -> Result<Self, Self::Error> {
        let target = match (row.day_of_week, row.specific_date) {
            (Some(day), None) => RuleTarget::Weekday(
                u32::try_from(day).map_err(|_| eyre!("Invalid stored weekday {}", day))?,
            ),
            (None, Some(date)) => RuleTarget::Date(date),
            _ => return Err(eyre!("Rule {} must have exactly one target", row.id)),
        };

        Ok(AvailabilityRule {
            id: row.id,
            target,
            // Out-of-range hours never block anything, drop them here.
            unavailable_hours: row
                .unavailable_hours
                .into_iter()
                .filter_map(|hour| u32::try_from(hour).ok())
                .collect(),
            all_day: row.all_day,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Splits a rule target into its `(day_of_week, specific_date)` columns.
pub fn target_columns(target: RuleTarget) -> (Option<i16>, Option<NaiveDate>) {
    match target {
        RuleTarget::Weekday(day) => (Some(day as i16), None),
        RuleTarget::Date(date) => (None, Some(date)),
    }
}

pub fn hour_column(hours: &[u32]) -> Vec<i32> {
    hours.iter().map(|hour| *hour as i32).collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAppointmentType {
    pub id: i32,
    pub name: String,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbAppointmentType> for AppointmentType {
    fn from(row: DbAppointmentType) -> Self {
        AppointmentType {
            id: row.id,
            name: row.name,
            visible: row.visible,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbBankAccount {
    pub id: Uuid,
    pub bank_name: String,
    pub account_number: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbBankAccount> for BankAccount {
    fn from(row: DbBankAccount) -> Self {
        BankAccount {
            id: row.id,
            bank_name: row.bank_name,
            account_number: row.account_number,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
