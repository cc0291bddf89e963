//! Outbound notifications raised by appointment transitions.
//!
//! Services only enqueue; delivery happens on a separate worker that owns the
//! receiving end of the channel. A dropped receiver is logged and otherwise
//! ignored so a transition never fails because of email.

use tokio::sync::mpsc;
use tracing::warn;

use crate::models::appointment::{Appointment, Slot};

#[derive(Debug, Clone)]
pub enum Notification {
    /// A public booking was received and is pending review.
    Received {
        appointment: Appointment,
        type_name: String,
    },
    Approved {
        appointment: Appointment,
        type_name: String,
    },
    Rejected {
        appointment: Appointment,
        type_name: String,
        reason: String,
    },
    Moved {
        appointment: Appointment,
        type_name: String,
        previous: Slot,
    },
}

impl Notification {
    pub fn appointment(&self) -> &Appointment {
        match self {
            Notification::Received { appointment, .. }
            | Notification::Approved { appointment, .. }
            | Notification::Rejected { appointment, .. }
            | Notification::Moved { appointment, .. } => appointment,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Received { .. } => "received",
            Notification::Approved { .. } => "approved",
            Notification::Rejected { .. } => "rejected",
            Notification::Moved { .. } => "moved",
        }
    }
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, notification: Notification) {
        let kind = notification.kind();
        let short_id = notification.appointment().short_id.clone();
        if self.tx.send(notification).is_err() {
            warn!(
                "Notification queue closed, dropping {} notification for {}",
                kind, short_id
            );
        }
    }
}
