//! # Appointment State Machine
//!
//! ```text
//! pending ──approve──▶ approved ──mark_done──▶ done
//!    │                    │
//!    └──reject──▶ rejected ◀──reject──┘
//! ```
//!
//! `done` is immutable. `rejected` may be approved again; the caller is
//! responsible for re-checking that the released slot is still free.
//! Any status except `done` may be rescheduled.

use chrono::Utc;

use crate::{
    errors::{BookingError, BookingResult},
    models::appointment::{Appointment, AppointmentStatus, Slot},
};

fn ensure_not_done(appointment: &Appointment, action: &str) -> BookingResult<()> {
    if appointment.status == AppointmentStatus::Done {
        return Err(BookingError::InvalidTransition(format!(
            "Cannot {action} completed appointment"
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn approve(
    appointment: &mut Appointment,
    meeting_link: Option<String>,
    admin_note: Option<String>,
) -> BookingResult<()> {
    ensure_not_done(appointment, "modify")?;

    appointment.status = AppointmentStatus::Approved;
    appointment.rejection_reason = None;
    appointment.meeting_link = non_empty(meeting_link);
    appointment.admin_note = non_empty(admin_note);
    appointment.updated_at = Utc::now();
    Ok(())
}

/// Returns the trimmed rejection reason.
pub fn reject(
    appointment: &mut Appointment,
    reason: &str,
    admin_note: Option<String>,
) -> BookingResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(BookingError::validation("Rejection reason is required"));
    }
    ensure_not_done(appointment, "modify")?;

    appointment.status = AppointmentStatus::Rejected;
    appointment.rejection_reason = Some(reason.to_string());
    appointment.admin_note = non_empty(admin_note);
    appointment.updated_at = Utc::now();
    Ok(reason.to_string())
}

pub fn mark_done(appointment: &mut Appointment) -> BookingResult<()> {
    if appointment.status != AppointmentStatus::Approved {
        return Err(BookingError::InvalidTransition(
            "Only approved appointments can be marked as done".to_string(),
        ));
    }

    appointment.status = AppointmentStatus::Done;
    appointment.updated_at = Utc::now();
    Ok(())
}

/// Refuses to move a completed appointment; checked before the new slot is
/// even parsed.
pub fn ensure_movable(appointment: &Appointment) -> BookingResult<()> {
    ensure_not_done(appointment, "move")
}

/// Moves the appointment to `slot` and returns the slot it held before.
/// A blank `admin_note` leaves the existing note untouched.
pub fn reschedule(
    appointment: &mut Appointment,
    slot: Slot,
    admin_note: Option<String>,
) -> BookingResult<Slot> {
    ensure_movable(appointment)?;

    let previous = appointment.slot();
    appointment.appointment_date = slot.date;
    appointment.appointment_hour = slot.hour;
    if let Some(note) = non_empty(admin_note) {
        appointment.admin_note = Some(note);
    }
    appointment.updated_at = Utc::now();
    Ok(previous)
}
