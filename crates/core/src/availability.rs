//! # Slot Availability Resolver
//!
//! Computes the bookable hours of a calendar date:
//!
//! 1. Start from the full day, hours 0 through 23
//! 2. Remove what matching weekday rules block (an all-day rule clears the set)
//! 3. Remove what matching specific-date rules block, additively
//! 4. Remove hours held by appointments that are not rejected
//! 5. On the current day, remove every hour up to and including the current one
//!
//! Weekday and specific-date rules never re-open hours for each other: the
//! result is the complement of the union of everything that blocks.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::{
    clock::Clock,
    errors::{BookingResult, Conflict},
    models::{
        appointment::Appointment,
        rule::{AvailabilityRule, RuleTarget},
    },
    repository::{AppointmentRepository, AvailabilityRuleRepository},
};

pub const HOURS_PER_DAY: u32 = 24;

/// Set of hours of a day, stored as a 24-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourSet(u32);

impl HourSet {
    const FULL_MASK: u32 = (1 << HOURS_PER_DAY) - 1;

    pub fn full() -> Self {
        HourSet(Self::FULL_MASK)
    }

    pub fn empty() -> Self {
        HourSet(0)
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour < HOURS_PER_DAY && self.0 & (1 << hour) != 0
    }

    /// Removes `hour`; hours outside 0..24 are ignored.
    pub fn remove(&mut self, hour: u32) {
        if hour < HOURS_PER_DAY {
            self.0 &= !(1 << hour);
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Removes every hour up to and including `hour`.
    pub fn remove_through(&mut self, hour: u32) {
        if hour >= HOURS_PER_DAY - 1 {
            self.clear();
        } else {
            self.0 &= !((1 << (hour + 1)) - 1);
        }
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Hours in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..HOURS_PER_DAY).filter(move |hour| self.contains(*hour))
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

/// Day of week with Sunday = 0, the numbering used by weekday rules.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// The availability rules that apply to one date.
#[derive(Debug, Clone, Default)]
pub struct DayRules {
    pub weekday: Vec<AvailabilityRule>,
    pub specific: Vec<AvailabilityRule>,
}

impl DayRules {
    /// Removes from `hours` everything the rules block.
    pub fn apply(&self, hours: &mut HourSet) {
        for rule in self.weekday.iter().chain(self.specific.iter()) {
            if rule.all_day {
                hours.clear();
            } else {
                for hour in &rule.unavailable_hours {
                    hours.remove(*hour);
                }
            }
        }
    }

    /// The first rule-level reason `hour` cannot be booked, weekday rules
    /// checked before specific-date rules.
    pub fn block_for(&self, hour: u32) -> Option<Conflict> {
        self.weekday
            .iter()
            .chain(self.specific.iter())
            .find(|rule| rule.blocks(hour))
            .map(|rule| {
                if rule.all_day {
                    Conflict::DayBlocked
                } else {
                    Conflict::HourBlocked
                }
            })
    }
}

/// Pure resolution of the open hours of `date`.
///
/// `booked` may contain appointments of any status; only those still holding
/// their slot on `date` are taken into account.
pub fn resolve_available_hours(
    date: NaiveDate,
    rules: &DayRules,
    booked: &[Appointment],
    now: NaiveDateTime,
) -> HourSet {
    let mut hours = HourSet::full();
    rules.apply(&mut hours);

    for appointment in booked {
        if appointment.appointment_date == date && appointment.status.holds_slot() {
            hours.remove(appointment.appointment_hour);
        }
    }

    if date == now.date() {
        hours.remove_through(now.hour());
    }

    hours
}

/// Resolver wired to the rule and appointment stores.
#[derive(Clone)]
pub struct AvailabilityResolver {
    rules: Arc<dyn AvailabilityRuleRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityResolver {
    pub fn new(
        rules: Arc<dyn AvailabilityRuleRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rules,
            appointments,
            clock,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Fetches every weekday and specific-date rule matching `date`.
    pub async fn rules_for(&self, date: NaiveDate) -> BookingResult<DayRules> {
        let weekday = self
            .rules
            .find_by_target(RuleTarget::Weekday(day_of_week(date)))
            .await?;
        let specific = self.rules.find_by_target(RuleTarget::Date(date)).await?;
        Ok(DayRules { weekday, specific })
    }

    pub async fn available_hours(&self, date: NaiveDate) -> BookingResult<Vec<u32>> {
        let rules = self.rules_for(date).await?;
        let booked = self.appointments.find_holding_slots_on(date).await?;
        let hours = resolve_available_hours(date, &rules, &booked, self.clock.now());

        debug!(
            "Resolved availability for {}: {} open hours ({} weekday rules, {} date rules, {} bookings)",
            date,
            hours.len(),
            rules.weekday.len(),
            rules.specific.len(),
            booked.len()
        );

        Ok(hours.to_vec())
    }
}
