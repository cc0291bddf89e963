use serde::Serialize;
use slotbook_core::{
    models::appointment::{Appointment, Slot},
    notifications::Notification,
    validation::{format_long_date, format_phone},
};

/// A plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

fn slot_label(slot: Slot) -> String {
    format!("{} at {}", format_long_date(slot.date), hour_label(slot.hour))
}

/// Turns notifications into emails addressed to the client.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    frontend_url: Option<String>,
}

impl Composer {
    pub fn new(frontend_url: Option<String>) -> Self {
        Self { frontend_url }
    }

    pub fn compose(&self, notification: &Notification) -> EmailMessage {
        let appointment = notification.appointment();
        let (subject, body) = match notification {
            Notification::Received { type_name, .. } => (
                format!("Booking received - {}", appointment.short_id),
                self.received_body(appointment, type_name),
            ),
            Notification::Approved { type_name, .. } => (
                format!("Your booking has been approved - {}", appointment.short_id),
                self.approved_body(appointment, type_name),
            ),
            Notification::Rejected {
                type_name, reason, ..
            } => (
                format!("About your booking - {}", appointment.short_id),
                self.rejected_body(appointment, type_name, reason),
            ),
            Notification::Moved {
                type_name,
                previous,
                ..
            } => (
                format!("Your appointment has been moved - {}", appointment.short_id),
                self.moved_body(appointment, type_name, *previous),
            ),
        };

        EmailMessage {
            to: appointment.email.clone(),
            subject,
            body,
        }
    }

    fn greeting(appointment: &Appointment) -> String {
        format!("Hello {} {},\n\n", appointment.first_name, appointment.last_name)
    }

    fn details(appointment: &Appointment, type_name: &str) -> String {
        format!(
            "Booking code: {}\nType: {}\nDate: {}\nTime: {}\n",
            appointment.short_id,
            type_name,
            format_long_date(appointment.appointment_date),
            hour_label(appointment.appointment_hour),
        )
    }

    fn signature(&self) -> String {
        match &self.frontend_url {
            Some(url) => format!("\nRegards,\nSlotBook\n{url}\n"),
            None => "\nRegards,\nSlotBook\n".to_string(),
        }
    }

    fn received_body(&self, appointment: &Appointment, type_name: &str) -> String {
        let mut body = Self::greeting(appointment);
        body.push_str("We received your booking request. It is pending review.\n\n");
        body.push_str(&Self::details(appointment, type_name));
        body.push_str(&format!("Phone: {}\n", format_phone(&appointment.phone_number)));

        match &self.frontend_url {
            Some(url) => {
                body.push_str(&format!(
                    "\nYou can check its status at any time with your booking code at {url}/status\n"
                ));
            }
            None => body.push_str("\nKeep your booking code to check its status.\n"),
        }
        body.push_str("You will get another email once the booking is approved.\n");
        body.push_str(&self.signature());
        body
    }

    fn approved_body(&self, appointment: &Appointment, type_name: &str) -> String {
        let mut body = Self::greeting(appointment);
        body.push_str("Your booking has been approved.\n\n");
        body.push_str(&Self::details(appointment, type_name));
        if let Some(link) = &appointment.meeting_link {
            body.push_str(&format!("Meeting link: {link}\n"));
        }
        if let Some(note) = &appointment.admin_note {
            body.push_str(&format!("\nNote: {note}\n"));
        }
        body.push_str(&self.signature());
        body
    }

    fn rejected_body(&self, appointment: &Appointment, type_name: &str, reason: &str) -> String {
        let mut body = Self::greeting(appointment);
        body.push_str("Unfortunately your booking could not be approved.\n\n");
        body.push_str(&Self::details(appointment, type_name));
        body.push_str(&format!("\nReason: {reason}\n"));
        if let Some(note) = &appointment.admin_note {
            body.push_str(&format!("Note: {note}\n"));
        }
        if let Some(url) = &self.frontend_url {
            body.push_str(&format!("\nYou are welcome to book a new appointment at {url}\n"));
        }
        body.push_str(&self.signature());
        body
    }

    fn moved_body(&self, appointment: &Appointment, type_name: &str, previous: Slot) -> String {
        let mut body = Self::greeting(appointment);
        body.push_str("Your appointment has been moved.\n\n");
        body.push_str(&format!("Previous: {}\n", slot_label(previous)));
        body.push_str(&format!("New: {}\n\n", slot_label(appointment.slot())));
        body.push_str(&Self::details(appointment, type_name));
        if let Some(note) = &appointment.admin_note {
            body.push_str(&format!("\nNote: {note}\n"));
        }
        body.push_str(&self.signature());
        body
    }
}
