use serde::{Deserialize, Serialize};

/// Admin appointment review and calendar
pub mod admin;
/// Public booking endpoints
pub mod appointments;
/// Sign-in and current user
pub mod auth;
/// Availability rule management
pub mod availability;
/// Appointment types and bank accounts
pub mod catalog;

/// Body of endpoints that only report what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
