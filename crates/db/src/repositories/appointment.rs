use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use slotbook_core::{
    errors::{BookingError, BookingResult, Conflict},
    models::appointment::{Appointment, AppointmentFilter},
    repository::AppointmentRepository,
};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    DbPool,
    models::{APPOINTMENT_COLUMNS, DbAppointment},
    schema::ACTIVE_SLOT_INDEX,
    violated_constraint,
};

pub async fn get_appointment_by_id(pool: &DbPool, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_by_short_id(
    pool: &DbPool,
    short_id: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE short_id = $1"
    ))
    .bind(short_id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_active_appointments_on(
    pool: &DbPool,
    date: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE appointment_date = $1 AND status <> 'rejected'
        ORDER BY appointment_hour
        "#
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_slot_holder(
    pool: &DbPool,
    date: NaiveDate,
    hour: i32,
    exclude: Option<Uuid>,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE appointment_date = $1
          AND appointment_hour = $2
          AND status <> 'rejected'
          AND ($3::uuid IS NULL OR id <> $3)
        LIMIT 1
        "#
    ))
    .bind(date)
    .bind(hour)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn list_appointments(
    pool: &DbPool,
    filter: &AppointmentFilter,
) -> Result<Vec<DbAppointment>> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE TRUE"
    ));

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(date) = filter.date {
        query.push(" AND appointment_date = ").push_bind(date);
    }
    if let Some((from, until)) = filter.range {
        query
            .push(" AND appointment_date >= ")
            .push_bind(from)
            .push(" AND appointment_date < ")
            .push_bind(until);
    }

    // Column and direction come from closed enums, never from user text.
    query.push(format!(
        " ORDER BY {} {}, appointment_date, appointment_hour",
        filter.order_by.column(),
        filter.order_dir.keyword()
    ));

    let appointments = query
        .build_query_as::<DbAppointment>()
        .fetch_all(pool)
        .await?;

    Ok(appointments)
}

pub async fn create_appointment(pool: &DbPool, appointment: &Appointment) -> Result<DbAppointment> {
    tracing::debug!(
        "Creating appointment: id={}, short_id={}, date={}, hour={}",
        appointment.id,
        appointment.short_id,
        appointment.appointment_date,
        appointment.appointment_hour
    );

    let created = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (
            id, short_id, first_name, last_name, email, phone_number,
            appointment_date, appointment_hour, appointment_type_id, bank_account_id,
            bank_transfer, receipt_path, status, rejection_reason, meeting_link, admin_note,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(appointment.id)
    .bind(&appointment.short_id)
    .bind(&appointment.first_name)
    .bind(&appointment.last_name)
    .bind(&appointment.email)
    .bind(&appointment.phone_number)
    .bind(appointment.appointment_date)
    .bind(appointment.appointment_hour as i32)
    .bind(appointment.appointment_type_id)
    .bind(appointment.bank_account_id)
    .bind(&appointment.bank_transfer)
    .bind(&appointment.receipt_path)
    .bind(appointment.status.as_str())
    .bind(&appointment.rejection_reason)
    .bind(&appointment.meeting_link)
    .bind(&appointment.admin_note)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Writes back every field an admin action can change.
pub async fn update_appointment(pool: &DbPool, appointment: &Appointment) -> Result<DbAppointment> {
    let updated = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET appointment_date = $2,
            appointment_hour = $3,
            status = $4,
            rejection_reason = $5,
            meeting_link = $6,
            admin_note = $7,
            updated_at = $8
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(appointment.id)
    .bind(appointment.appointment_date)
    .bind(appointment.appointment_hour as i32)
    .bind(appointment.status.as_str())
    .bind(&appointment.rejection_reason)
    .bind(&appointment.meeting_link)
    .bind(&appointment.admin_note)
    .bind(appointment.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

fn map_write_error(err: eyre::Report) -> BookingError {
    if violated_constraint(&err) == Some(ACTIVE_SLOT_INDEX) {
        return Conflict::SlotTaken.into();
    }
    BookingError::Database(err)
}

fn into_domain(rows: Vec<DbAppointment>) -> BookingResult<Vec<Appointment>> {
    rows.into_iter()
        .map(|row| Appointment::try_from(row).map_err(BookingError::Database))
        .collect()
}

#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: DbPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn find(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(get_appointment_by_id(&self.pool, id)
            .await?
            .map(Appointment::try_from)
            .transpose()?)
    }

    async fn find_by_short_id(&self, short_id: &str) -> BookingResult<Option<Appointment>> {
        Ok(get_appointment_by_short_id(&self.pool, short_id)
            .await?
            .map(Appointment::try_from)
            .transpose()?)
    }

    async fn find_holding_slots_on(&self, date: NaiveDate) -> BookingResult<Vec<Appointment>> {
        into_domain(get_active_appointments_on(&self.pool, date).await?)
    }

    async fn find_slot_holder(
        &self,
        date: NaiveDate,
        hour: u32,
        exclude: Option<Uuid>,
    ) -> BookingResult<Option<Appointment>> {
        Ok(get_slot_holder(&self.pool, date, hour as i32, exclude)
            .await?
            .map(Appointment::try_from)
            .transpose()?)
    }

    async fn list(&self, filter: &AppointmentFilter) -> BookingResult<Vec<Appointment>> {
        into_domain(list_appointments(&self.pool, filter).await?)
    }

    async fn create(&self, appointment: &Appointment) -> BookingResult<Appointment> {
        let row = create_appointment(&self.pool, appointment)
            .await
            .map_err(map_write_error)?;
        Ok(Appointment::try_from(row)?)
    }

    async fn save(&self, appointment: &Appointment) -> BookingResult<Appointment> {
        let row = update_appointment(&self.pool, appointment)
            .await
            .map_err(map_write_error)?;
        Ok(Appointment::try_from(row)?)
    }
}
