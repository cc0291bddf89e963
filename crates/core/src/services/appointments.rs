use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    availability::AvailabilityResolver,
    clock::Clock,
    errors::{BookingError, BookingResult},
    lifecycle,
    models::{
        appointment::{
            Appointment, AppointmentDetail, AppointmentFilter, AppointmentStatus,
            AppointmentStatusResponse, ApproveRequest, AvailableHoursResponse, BookingDraft,
            BookingForm, CalendarEntry, CalendarResponse, ListAppointmentsQuery, MoveRequest,
            RejectRequest, Slot,
        },
        appointment_type::AppointmentType,
        bank_account::BankAccount,
    },
    notifications::{Notification, Outbox},
    repository::{
        AppointmentRepository, AppointmentTypeRepository, BankAccountRepository, Repositories,
    },
    validation::{self, BookingValidator},
};

/// Booking operations: public requests and the admin state machine.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    types: Arc<dyn AppointmentTypeRepository>,
    bank_accounts: Arc<dyn BankAccountRepository>,
    validator: BookingValidator,
    outbox: Outbox,
}

impl AppointmentService {
    pub fn new(repos: &Repositories, clock: Arc<dyn Clock>, outbox: Outbox) -> Self {
        let resolver =
            AvailabilityResolver::new(repos.rules.clone(), repos.appointments.clone(), clock);
        Self {
            appointments: repos.appointments.clone(),
            types: repos.appointment_types.clone(),
            bank_accounts: repos.bank_accounts.clone(),
            validator: BookingValidator::new(resolver, repos.appointments.clone()),
            outbox,
        }
    }

    pub async fn available_hours(&self, date: &str) -> BookingResult<AvailableHoursResponse> {
        let date = validation::parse_date(date)?;
        let available_hours = self.validator.resolver().available_hours(date).await?;
        Ok(AvailableHoursResponse {
            date,
            available_hours,
        })
    }

    /// Validates a public booking form without touching storage.
    pub async fn prepare(&self, form: &BookingForm) -> BookingResult<BookingDraft> {
        let first_name = form.first_name.trim();
        let last_name = form.last_name.trim();
        let email = form.email.trim();
        let phone_number = form.phone_number.trim();

        if first_name.is_empty() || last_name.is_empty() || email.is_empty() || phone_number.is_empty()
        {
            return Err(BookingError::validation("Missing required fields"));
        }
        validation::validate_phone(phone_number)?;
        validation::validate_email(email)?;

        let hour = validation::parse_hour(&form.appointment_hour)?;
        let date = validation::parse_date(&form.appointment_date)?;

        let type_id = form
            .appointment_type_id
            .trim()
            .parse::<i32>()
            .map_err(|_| BookingError::validation("Invalid appointment type ID"))?;
        let appointment_type = self
            .types
            .find(type_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Appointment type"))?;
        if !appointment_type.visible {
            return Err(BookingError::validation("Appointment type not available"));
        }

        let slot = Slot { date, hour };
        self.validator.validate_slot(slot, None).await?;

        let bank_transfer = form.bank_transfer.trim().to_string();
        let bank_account_id = match Uuid::parse_str(&bank_transfer) {
            Ok(id) => Some(self.active_account(id).await?.id),
            Err(_) => None,
        };

        Ok(BookingDraft {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            slot,
            appointment_type,
            bank_account_id,
            bank_transfer,
        })
    }

    /// Persists a prepared booking and queues the confirmation.
    pub async fn create(
        &self,
        draft: BookingDraft,
        receipt_path: String,
    ) -> BookingResult<Appointment> {
        let type_name = draft.appointment_type.name.clone();
        let appointment = self
            .appointments
            .create(&Appointment::new(draft, receipt_path))
            .await?;

        info!(
            "Appointment {} booked for {} {}:00",
            appointment.short_id, appointment.appointment_date, appointment.appointment_hour
        );

        self.outbox.enqueue(Notification::Received {
            appointment: appointment.clone(),
            type_name,
        });
        Ok(appointment)
    }

    pub async fn find(&self, id: Uuid) -> BookingResult<Appointment> {
        self.appointments
            .find(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Appointment"))
    }

    pub async fn find_by_short_id(&self, short_id: &str) -> BookingResult<Appointment> {
        self.appointments
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Appointment"))
    }

    /// Public status lookup by booking code.
    pub async fn status(&self, short_id: &str) -> BookingResult<AppointmentStatusResponse> {
        let appointment = self.find_by_short_id(short_id).await?;
        let appointment_type = self.type_name(appointment.appointment_type_id).await?;

        Ok(AppointmentStatusResponse {
            id: appointment.id,
            short_id: appointment.short_id,
            first_name: appointment.first_name,
            last_name: appointment.last_name,
            email: appointment.email,
            phone_number: validation::format_phone(&appointment.phone_number),
            appointment_date: appointment.appointment_date,
            appointment_hour: appointment.appointment_hour,
            appointment_type,
            bank_transfer: appointment.bank_transfer,
            status: appointment.status,
            rejection_reason: appointment.rejection_reason,
            meeting_link: appointment.meeting_link,
            admin_note: appointment.admin_note,
            created_at: appointment.created_at,
        })
    }

    pub async fn detail(&self, id: Uuid) -> BookingResult<AppointmentDetail> {
        let appointment = self.find(id).await?;
        let appointment_type = self.types.find(appointment.appointment_type_id).await?;
        let bank_account = self.bank_account_for(&appointment, &[]).await?;
        Ok(AppointmentDetail {
            appointment,
            appointment_type,
            bank_account,
        })
    }

    pub async fn list(&self, query: &ListAppointmentsQuery) -> BookingResult<Vec<AppointmentDetail>> {
        let filter = AppointmentFilter {
            status: query.status,
            date: query
                .date
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(validation::parse_date)
                .transpose()?,
            range: query
                .month
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .map(validation::parse_month)
                .transpose()?,
            order_by: query.order_by.unwrap_or_default(),
            order_dir: query.order_dir.unwrap_or_default(),
        };

        let appointments = self.appointments.list(&filter).await?;
        let types = self.types.list(false).await?;
        let accounts = self.bank_accounts.list(false).await?;

        let mut details = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let appointment_type = types
                .iter()
                .find(|t| t.id == appointment.appointment_type_id)
                .cloned();
            let bank_account = self.bank_account_for(&appointment, &accounts).await?;
            details.push(AppointmentDetail {
                appointment,
                appointment_type,
                bank_account,
            });
        }
        Ok(details)
    }

    /// Approves a pending, approved or rejected appointment.
    ///
    /// Rejection released the slot, so re-approving a rejected appointment
    /// first checks that nobody else booked it in the meantime.
    pub async fn approve(&self, id: Uuid, request: ApproveRequest) -> BookingResult<Appointment> {
        let mut appointment = self.find(id).await?;
        if appointment.status == AppointmentStatus::Rejected {
            self.validator
                .ensure_slot_free(appointment.slot(), appointment.id)
                .await?;
        }

        lifecycle::approve(&mut appointment, request.meeting_link, request.admin_note)?;
        let appointment = self.appointments.save(&appointment).await?;
        info!("Appointment {} approved", appointment.short_id);

        let type_name = self.type_name(appointment.appointment_type_id).await?;
        self.outbox.enqueue(Notification::Approved {
            appointment: appointment.clone(),
            type_name,
        });
        Ok(appointment)
    }

    pub async fn reject(&self, id: Uuid, request: RejectRequest) -> BookingResult<Appointment> {
        let mut appointment = self.find(id).await?;
        let reason = lifecycle::reject(&mut appointment, &request.reason, request.admin_note)?;
        let appointment = self.appointments.save(&appointment).await?;
        info!("Appointment {} rejected", appointment.short_id);

        let type_name = self.type_name(appointment.appointment_type_id).await?;
        self.outbox.enqueue(Notification::Rejected {
            appointment: appointment.clone(),
            type_name,
            reason,
        });
        Ok(appointment)
    }

    pub async fn mark_done(&self, id: Uuid) -> BookingResult<Appointment> {
        let mut appointment = self.find(id).await?;
        lifecycle::mark_done(&mut appointment)?;
        let appointment = self.appointments.save(&appointment).await?;
        info!("Appointment {} marked as done", appointment.short_id);
        Ok(appointment)
    }

    /// Moves an appointment to a new slot, subject to the same checks as a
    /// new booking.
    pub async fn reschedule(&self, id: Uuid, request: MoveRequest) -> BookingResult<Appointment> {
        let mut appointment = self.find(id).await?;
        lifecycle::ensure_movable(&appointment)?;

        let slot = self
            .validator
            .validate(&request.new_date, request.new_hour, Some(appointment.id))
            .await?;
        let previous = lifecycle::reschedule(&mut appointment, slot, request.admin_note)?;
        let appointment = self.appointments.save(&appointment).await?;

        info!(
            "Appointment {} moved from {} {}:00 to {} {}:00",
            appointment.short_id, previous.date, previous.hour, slot.date, slot.hour
        );

        let type_name = self.type_name(appointment.appointment_type_id).await?;
        self.outbox.enqueue(Notification::Moved {
            appointment: appointment.clone(),
            type_name,
            previous,
        });
        Ok(appointment)
    }

    /// Appointments of a `YYYY-MM` month grouped by `YYYY-MM-DD`.
    pub async fn calendar(&self, month: &str) -> BookingResult<CalendarResponse> {
        let range = validation::parse_month(month)?;
        let filter = AppointmentFilter {
            range: Some(range),
            ..AppointmentFilter::default()
        };

        let appointments = self.appointments.list(&filter).await?;
        let types = self.types.list(false).await?;
        let accounts = self.bank_accounts.list(false).await?;
        debug!("Building calendar for {}: {} appointments", month, appointments.len());

        let mut calendar_data: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();
        for appointment in appointments {
            let type_name = types
                .iter()
                .find(|t| t.id == appointment.appointment_type_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            let bank_account = self.bank_account_for(&appointment, &accounts).await?;

            calendar_data
                .entry(appointment.appointment_date.to_string())
                .or_default()
                .push(CalendarEntry {
                    id: appointment.id,
                    short_id: appointment.short_id,
                    first_name: appointment.first_name,
                    last_name: appointment.last_name,
                    email: appointment.email,
                    phone_number: appointment.phone_number,
                    date: validation::format_long_date(appointment.appointment_date),
                    hour: appointment.appointment_hour,
                    type_name,
                    status: appointment.status,
                    bank_transfer: appointment.bank_transfer,
                    bank_account,
                    receipt_path: appointment.receipt_path,
                });
        }

        Ok(CalendarResponse {
            month: month.trim().to_string(),
            calendar_data,
        })
    }

    async fn type_name(&self, type_id: i32) -> BookingResult<String> {
        Ok(self
            .types
            .find(type_id)
            .await?
            .map(|t: AppointmentType| t.name)
            .unwrap_or_default())
    }

    /// A booking may only reference an existing, active account.
    async fn active_account(&self, id: Uuid) -> BookingResult<BankAccount> {
        let account = self
            .bank_accounts
            .find(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Bank account"))?;
        if !account.is_active {
            return Err(BookingError::validation("Bank account not available"));
        }
        Ok(account)
    }

    /// Resolves the bank account from the stored id, falling back to a
    /// `bankTransfer` value that happens to be an account id. `known` is
    /// searched before the repository.
    async fn bank_account_for(
        &self,
        appointment: &Appointment,
        known: &[BankAccount],
    ) -> BookingResult<Option<BankAccount>> {
        let id = appointment
            .bank_account_id
            .or_else(|| Uuid::parse_str(&appointment.bank_transfer).ok());
        let Some(id) = id else {
            return Ok(None);
        };

        if let Some(account) = known.iter().find(|a| a.id == id) {
            return Ok(Some(account.clone()));
        }
        self.bank_accounts.find(id).await
    }
}
