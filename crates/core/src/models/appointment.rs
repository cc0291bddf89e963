use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{appointment_type::AppointmentType, bank_account::BankAccount};

/// Length of the public booking code derived from the appointment id.
pub const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Done,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Done => "done",
        }
    }

    /// Whether an appointment in this status keeps its slot reserved.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Rejected)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "approved" => Ok(AppointmentStatus::Approved),
            "rejected" => Ok(AppointmentStatus::Rejected),
            "done" => Ok(AppointmentStatus::Done),
            other => Err(format!("Unknown appointment status: {other}")),
        }
    }
}

/// A (date, hour) pair, the unit of bookability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    #[serde(rename = "shortID")]
    pub short_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub appointment_date: NaiveDate,
    pub appointment_hour: u32,
    #[serde(rename = "appointmentTypeID")]
    pub appointment_type_id: i32,
    #[serde(rename = "bankAccountID")]
    pub bank_account_id: Option<Uuid>,
    pub bank_transfer: String,
    pub receipt_path: String,
    pub status: AppointmentStatus,
    pub rejection_reason: Option<String>,
    pub meeting_link: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Builds a fresh pending appointment from a validated draft.
    pub fn new(draft: BookingDraft, receipt_path: String) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            short_id: short_id_for(&id),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone_number: draft.phone_number,
            appointment_date: draft.slot.date,
            appointment_hour: draft.slot.hour,
            appointment_type_id: draft.appointment_type.id,
            bank_account_id: draft.bank_account_id,
            bank_transfer: draft.bank_transfer,
            receipt_path,
            status: AppointmentStatus::Pending,
            rejection_reason: None,
            meeting_link: None,
            admin_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.appointment_date,
            hour: self.appointment_hour,
        }
    }
}

/// Derives the public booking code: the first eight characters of the id.
pub fn short_id_for(id: &Uuid) -> String {
    id.as_hyphenated().to_string()[..SHORT_ID_LEN].to_string()
}

/// Raw public booking form, every field as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub appointment_date: String,
    pub appointment_hour: String,
    #[serde(rename = "appointmentTypeID")]
    pub appointment_type_id: String,
    pub bank_transfer: String,
}

/// A booking form that passed every check and is ready to be persisted.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub slot: Slot,
    pub appointment_type: AppointmentType,
    pub bank_account_id: Option<Uuid>,
    pub bank_transfer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentResponse {
    pub message: String,
    #[serde(rename = "shortID")]
    pub short_id: String,
    pub id: Uuid,
    pub status: AppointmentStatus,
}

/// Public view of a booking, looked up by its short id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStatusResponse {
    pub id: Uuid,
    #[serde(rename = "shortID")]
    pub short_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub appointment_date: NaiveDate,
    pub appointment_hour: u32,
    pub appointment_type: String,
    pub bank_transfer: String,
    pub status: AppointmentStatus,
    pub rejection_reason: Option<String>,
    pub meeting_link: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin view: the appointment with its type and bank account resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub appointment_type: Option<AppointmentType>,
    pub bank_account: Option<BankAccount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub meeting_link: Option<String>,
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub new_date: String,
    pub new_hour: i64,
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentActionResponse {
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableHoursResponse {
    pub date: NaiveDate,
    pub available_hours: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    AppointmentDate,
    AppointmentHour,
    CreatedAt,
    Status,
    LastName,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::AppointmentDate => "appointment_date",
            SortField::AppointmentHour => "appointment_hour",
            SortField::CreatedAt => "created_at",
            SortField::Status => "status",
            SortField::LastName => "last_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Query string accepted by the admin appointment listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
    pub month: Option<String>,
    pub order_by: Option<SortField>,
    pub order_dir: Option<SortDirection>,
}

/// Parsed listing filter handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    /// Half-open date range `[from, until)`.
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub order_by: SortField,
    pub order_dir: SortDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: Uuid,
    #[serde(rename = "shortID")]
    pub short_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date: String,
    pub hour: u32,
    #[serde(rename = "type")]
    pub type_name: String,
    pub status: AppointmentStatus,
    pub bank_transfer: String,
    pub bank_account: Option<BankAccount>,
    pub receipt_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub month: String,
    pub calendar_data: std::collections::BTreeMap<String, Vec<CalendarEntry>>,
}
