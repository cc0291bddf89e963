//! # Booking Validator
//!
//! Decides whether a proposed slot is acceptable for a new or moved
//! appointment, and validates the fields of the public booking form.
//!
//! Slot checks run in a fixed order and stop at the first failure:
//!
//! 1. hour within 0..=23
//! 2. date is a valid `YYYY-MM-DD` calendar date
//! 3. no weekday or specific-date rule blocks the hour
//! 4. no other appointment holds the slot
//! 5. on the current day, the hour is strictly in the future

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;
use uuid::Uuid;

use crate::{
    availability::{AvailabilityResolver, DayRules},
    errors::{BookingError, BookingResult, Conflict},
    models::appointment::{Appointment, Slot},
    repository::AppointmentRepository,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const PHONE_LEN: usize = 12;

pub fn parse_date(value: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| BookingError::validation("Invalid date format"))
}

/// Parses a `YYYY-MM` month into its first day and the first day of the next month.
pub fn parse_month(value: &str) -> BookingResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
        .map_err(|_| BookingError::validation("Invalid month format"))?;
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| BookingError::validation("Invalid month format"))?;
    Ok((start, end))
}

pub fn check_hour(hour: i64) -> BookingResult<u32> {
    if (0..=23).contains(&hour) {
        Ok(hour as u32)
    } else {
        Err(BookingError::validation("Invalid hour"))
    }
}

pub fn parse_hour(value: &str) -> BookingResult<u32> {
    let hour = value
        .trim()
        .parse::<i64>()
        .map_err(|_| BookingError::validation("Invalid hour"))?;
    check_hour(hour)
}

/// Accepts exactly `###-###-####`.
pub fn validate_phone(phone: &str) -> BookingResult<()> {
    let valid = phone.len() == PHONE_LEN
        && phone.char_indices().all(|(i, c)| match i {
            3 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    if valid {
        Ok(())
    } else {
        Err(BookingError::validation(
            "Invalid phone format. Use ###-###-####",
        ))
    }
}

/// Renders a stored `###-###-####` number as `+1 (###) ###-####`.
/// Anything else is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    if validate_phone(phone).is_err() {
        return phone.to_string();
    }
    format!("+1 ({}) {}-{}", &phone[0..3], &phone[4..7], &phone[8..12])
}

/// Renders a date as `Monday, March 10, 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn validate_email(email: &str) -> BookingResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(BookingError::validation("Invalid email address")),
    }
}

/// Rule, conflict and past-hour checks for an already-parsed slot.
///
/// `holder` is whoever currently holds the slot, already filtered so that it
/// excludes the appointment being moved.
pub fn check_slot(
    slot: Slot,
    rules: &DayRules,
    holder: Option<&Appointment>,
    now: NaiveDateTime,
) -> BookingResult<()> {
    if let Some(conflict) = rules.block_for(slot.hour) {
        return Err(conflict.into());
    }

    if holder.is_some_and(|appointment| appointment.status.holds_slot()) {
        return Err(Conflict::SlotTaken.into());
    }

    if slot.date == now.date() && slot.hour <= now.hour() {
        return Err(Conflict::PastHour.into());
    }

    Ok(())
}

/// Validator wired to the stores through the availability resolver.
#[derive(Clone)]
pub struct BookingValidator {
    resolver: AvailabilityResolver,
    appointments: Arc<dyn AppointmentRepository>,
}

impl BookingValidator {
    pub fn new(
        resolver: AvailabilityResolver,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            resolver,
            appointments,
        }
    }

    pub fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    /// Runs every check on raw input. `moving` names the appointment being
    /// rescheduled so it does not conflict with itself.
    pub async fn validate(
        &self,
        date: &str,
        hour: i64,
        moving: Option<Uuid>,
    ) -> BookingResult<Slot> {
        let hour = check_hour(hour)?;
        let date = parse_date(date)?;
        let slot = Slot { date, hour };
        self.validate_slot(slot, moving).await?;
        Ok(slot)
    }

    /// Checks 3 to 5 on a parsed slot.
    pub async fn validate_slot(&self, slot: Slot, moving: Option<Uuid>) -> BookingResult<()> {
        let rules = self.resolver.rules_for(slot.date).await?;
        if let Some(conflict) = rules.block_for(slot.hour) {
            debug!("Slot {} {}:00 blocked by rule: {}", slot.date, slot.hour, conflict);
            return Err(conflict.into());
        }

        let holder = self
            .appointments
            .find_slot_holder(slot.date, slot.hour, moving)
            .await?;

        check_slot(slot, &rules, holder.as_ref(), self.resolver.clock().now())
    }

    /// Only the "no other appointment holds the slot" check.
    pub async fn ensure_slot_free(&self, slot: Slot, exclude: Uuid) -> BookingResult<()> {
        let holder = self
            .appointments
            .find_slot_holder(slot.date, slot.hour, Some(exclude))
            .await?;
        match holder {
            Some(_) => Err(Conflict::SlotTaken.into()),
            None => Ok(()),
        }
    }
}
