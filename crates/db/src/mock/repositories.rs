use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use slotbook_core::{
    errors::{BookingError, BookingResult, Conflict},
    models::{
        appointment::{Appointment, AppointmentFilter, SortDirection, SortField},
        appointment_type::AppointmentType,
        bank_account::BankAccount,
        rule::{AvailabilityRule, RuleBlock, RuleTarget, Upserted},
        user::User,
    },
    repository::{
        AppointmentRepository, AppointmentTypeRepository, AvailabilityRuleRepository,
        BankAccountRepository, UserRepository,
    },
};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> BookingResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| BookingError::Database(eyre::eyre!("In-memory store poisoned")))
}

#[derive(Default)]
pub struct MemoryAppointmentRepository {
    rows: Mutex<HashMap<Uuid, Appointment>>,
}

impl MemoryAppointmentRepository {
    fn slot_taken(rows: &HashMap<Uuid, Appointment>, appointment: &Appointment) -> bool {
        appointment.status.holds_slot()
            && rows.values().any(|other| {
                other.id != appointment.id
                    && other.status.holds_slot()
                    && other.slot() == appointment.slot()
            })
    }
}

fn compare(a: &Appointment, b: &Appointment, field: SortField) -> Ordering {
    match field {
        SortField::AppointmentDate => a.appointment_date.cmp(&b.appointment_date),
        SortField::AppointmentHour => a.appointment_hour.cmp(&b.appointment_hour),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::LastName => a.last_name.cmp(&b.last_name),
    }
}

#[async_trait]
impl AppointmentRepository for MemoryAppointmentRepository {
    async fn find(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(lock(&self.rows)?.get(&id).cloned())
    }

    async fn find_by_short_id(&self, short_id: &str) -> BookingResult<Option<Appointment>> {
        Ok(lock(&self.rows)?
            .values()
            .find(|a| a.short_id == short_id)
            .cloned())
    }

    async fn find_holding_slots_on(&self, date: NaiveDate) -> BookingResult<Vec<Appointment>> {
        let mut found: Vec<Appointment> = lock(&self.rows)?
            .values()
            .filter(|a| a.appointment_date == date && a.status.holds_slot())
            .cloned()
            .collect();
        found.sort_by_key(|a| a.appointment_hour);
        Ok(found)
    }

    async fn find_slot_holder(
        &self,
        date: NaiveDate,
        hour: u32,
        exclude: Option<Uuid>,
    ) -> BookingResult<Option<Appointment>> {
        Ok(lock(&self.rows)?
            .values()
            .find(|a| {
                a.appointment_date == date
                    && a.appointment_hour == hour
                    && a.status.holds_slot()
                    && Some(a.id) != exclude
            })
            .cloned())
    }

    async fn list(&self, filter: &AppointmentFilter) -> BookingResult<Vec<Appointment>> {
        let mut found: Vec<Appointment> = lock(&self.rows)?
            .values()
            .filter(|a| filter.status.is_none_or(|status| a.status == status))
            .filter(|a| filter.date.is_none_or(|date| a.appointment_date == date))
            .filter(|a| {
                filter.range.is_none_or(|(from, until)| {
                    a.appointment_date >= from && a.appointment_date < until
                })
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let primary = match filter.order_dir {
                SortDirection::Asc => compare(a, b, filter.order_by),
                SortDirection::Desc => compare(b, a, filter.order_by),
            };
            primary.then_with(|| a.slot().cmp(&b.slot()))
        });
        Ok(found)
    }

    async fn create(&self, appointment: &Appointment) -> BookingResult<Appointment> {
        let mut rows = lock(&self.rows)?;
        if Self::slot_taken(&rows, appointment) {
            return Err(Conflict::SlotTaken.into());
        }
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn save(&self, appointment: &Appointment) -> BookingResult<Appointment> {
        let mut rows = lock(&self.rows)?;
        if !rows.contains_key(&appointment.id) {
            return Err(BookingError::Database(eyre::eyre!(
                "Appointment {} does not exist",
                appointment.id
            )));
        }
        if Self::slot_taken(&rows, appointment) {
            return Err(Conflict::SlotTaken.into());
        }
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }
}

#[derive(Default)]
pub struct MemoryAvailabilityRuleRepository {
    rows: Mutex<Vec<AvailabilityRule>>,
}

fn target_order(rule: &AvailabilityRule) -> (u8, u32, Option<NaiveDate>) {
    match rule.target {
        RuleTarget::Weekday(day) => (0, day, None),
        RuleTarget::Date(date) => (1, 0, Some(date)),
    }
}

#[async_trait]
impl AvailabilityRuleRepository for MemoryAvailabilityRuleRepository {
    async fn list(&self) -> BookingResult<Vec<AvailabilityRule>> {
        let mut rules = lock(&self.rows)?.clone();
        rules.sort_by_key(target_order);
        Ok(rules)
    }

    async fn find(&self, id: i32) -> BookingResult<Option<AvailabilityRule>> {
        Ok(lock(&self.rows)?.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_target(&self, target: RuleTarget) -> BookingResult<Vec<AvailabilityRule>> {
        Ok(lock(&self.rows)?
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        target: RuleTarget,
        block: &RuleBlock,
    ) -> BookingResult<(AvailabilityRule, Upserted)> {
        let mut rows = lock(&self.rows)?;
        let now = Utc::now();

        if let Some(rule) = rows.iter_mut().find(|r| r.target == target) {
            rule.unavailable_hours = block.unavailable_hours.clone();
            rule.all_day = block.all_day;
            rule.updated_at = now;
            return Ok((rule.clone(), Upserted::Updated));
        }

        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let rule = AvailabilityRule {
            id,
            target,
            unavailable_hours: block.unavailable_hours.clone(),
            all_day: block.all_day,
            created_at: now,
            updated_at: now,
        };
        rows.push(rule.clone());
        Ok((rule, Upserted::Created))
    }

    async fn save(&self, rule: &AvailabilityRule) -> BookingResult<AvailabilityRule> {
        let mut rows = lock(&self.rows)?;
        let stored = rows
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| BookingError::Database(eyre::eyre!("Rule {} does not exist", rule.id)))?;
        stored.unavailable_hours = rule.unavailable_hours.clone();
        stored.all_day = rule.all_day;
        stored.updated_at = rule.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> BookingResult<bool> {
        let mut rows = lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_by_target(&self, target: RuleTarget) -> BookingResult<u64> {
        let mut rows = lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|r| r.target != target);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryAppointmentTypeRepository {
    rows: Mutex<Vec<AppointmentType>>,
}

#[async_trait]
impl AppointmentTypeRepository for MemoryAppointmentTypeRepository {
    async fn list(&self, visible_only: bool) -> BookingResult<Vec<AppointmentType>> {
        let mut types: Vec<AppointmentType> = lock(&self.rows)?
            .iter()
            .filter(|t| t.visible || !visible_only)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn find(&self, id: i32) -> BookingResult<Option<AppointmentType>> {
        Ok(lock(&self.rows)?.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, name: &str) -> BookingResult<AppointmentType> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|t| t.name == name) {
            return Err(Conflict::Duplicate("Appointment type".to_string()).into());
        }

        let appointment_type = AppointmentType {
            id: rows.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            visible: true,
            created_at: Utc::now(),
        };
        rows.push(appointment_type.clone());
        Ok(appointment_type)
    }

    async fn save(&self, appointment_type: &AppointmentType) -> BookingResult<AppointmentType> {
        let mut rows = lock(&self.rows)?;
        if rows
            .iter()
            .any(|t| t.id != appointment_type.id && t.name == appointment_type.name)
        {
            return Err(Conflict::Duplicate("Appointment type".to_string()).into());
        }

        let stored = rows
            .iter_mut()
            .find(|t| t.id == appointment_type.id)
            .ok_or_else(|| {
                BookingError::Database(eyre::eyre!(
                    "Appointment type {} does not exist",
                    appointment_type.id
                ))
            })?;
        *stored = appointment_type.clone();
        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct MemoryBankAccountRepository {
    rows: Mutex<Vec<BankAccount>>,
}

#[async_trait]
impl BankAccountRepository for MemoryBankAccountRepository {
    async fn list(&self, active_only: bool) -> BookingResult<Vec<BankAccount>> {
        let mut accounts: Vec<BankAccount> = lock(&self.rows)?
            .iter()
            .filter(|a| a.is_active || !active_only)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.bank_name.cmp(&b.bank_name));
        Ok(accounts)
    }

    async fn find(&self, id: Uuid) -> BookingResult<Option<BankAccount>> {
        Ok(lock(&self.rows)?.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, bank_name: &str, account_number: &str) -> BookingResult<BankAccount> {
        let now = Utc::now();
        let account = BankAccount {
            id: Uuid::new_v4(),
            bank_name: bank_name.to_string(),
            account_number: account_number.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows)?.push(account.clone());
        Ok(account)
    }

    async fn save(&self, account: &BankAccount) -> BookingResult<BankAccount> {
        let mut rows = lock(&self.rows)?;
        let stored = rows.iter_mut().find(|a| a.id == account.id).ok_or_else(|| {
            BookingError::Database(eyre::eyre!("Bank account {} does not exist", account.id))
        })?;
        *stored = account.clone();
        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find(&self, id: Uuid) -> BookingResult<Option<User>> {
        Ok(lock(&self.rows)?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> BookingResult<Option<User>> {
        Ok(lock(&self.rows)?.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> BookingResult<User> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|u| u.email == email) {
            return Err(Conflict::Duplicate("User".to_string()).into());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        rows.push(user.clone());
        Ok(user)
    }
}
