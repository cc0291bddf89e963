use thiserror::Error;

/// Reasons a slot or a catalogue entry cannot be taken.
///
/// Each variant renders as the message returned to API callers, so the
/// wording is part of the public contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    #[error("This day is blocked")]
    DayBlocked,

    #[error("This time slot is blocked")]
    HourBlocked,

    #[error("Time slot already taken")]
    SlotTaken,

    #[error("Cannot book a past hour")]
    PastHour,

    #[error("{0} already exists")]
    Duplicate(String),
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(#[from] Conflict),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn not_found(what: &str) -> Self {
        BookingError::NotFound(format!("{what} not found"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::Internal(Box::new(err))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
