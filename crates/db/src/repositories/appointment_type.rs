use async_trait::async_trait;
use eyre::Result;
use slotbook_core::{
    errors::{BookingError, BookingResult, Conflict},
    models::appointment_type::AppointmentType,
    repository::AppointmentTypeRepository,
};

use crate::{
    DbPool, models::DbAppointmentType, schema::APPOINTMENT_TYPE_NAME_KEY, violated_constraint,
};

pub async fn get_appointment_types(
    pool: &DbPool,
    visible_only: bool,
) -> Result<Vec<DbAppointmentType>> {
    let types = sqlx::query_as::<_, DbAppointmentType>(
        r#"
        SELECT id, name, visible, created_at
        FROM appointment_types
        WHERE visible OR NOT $1
        ORDER BY name
        "#,
    )
    .bind(visible_only)
    .fetch_all(pool)
    .await?;

    Ok(types)
}

pub async fn get_appointment_type_by_id(
    pool: &DbPool,
    id: i32,
) -> Result<Option<DbAppointmentType>> {
    let appointment_type = sqlx::query_as::<_, DbAppointmentType>(
        "SELECT id, name, visible, created_at FROM appointment_types WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment_type)
}

pub async fn create_appointment_type(pool: &DbPool, name: &str) -> Result<DbAppointmentType> {
    let appointment_type = sqlx::query_as::<_, DbAppointmentType>(
        r#"
        INSERT INTO appointment_types (name)
        VALUES ($1)
        RETURNING id, name, visible, created_at
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(appointment_type)
}

pub async fn update_appointment_type(
    pool: &DbPool,
    appointment_type: &AppointmentType,
) -> Result<DbAppointmentType> {
    let updated = sqlx::query_as::<_, DbAppointmentType>(
        r#"
        UPDATE appointment_types
        SET name = $2, visible = $3
        WHERE id = $1
        RETURNING id, name, visible, created_at
        "#,
    )
    .bind(appointment_type.id)
    .bind(&appointment_type.name)
    .bind(appointment_type.visible)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

fn map_write_error(err: eyre::Report) -> BookingError {
    if violated_constraint(&err) == Some(APPOINTMENT_TYPE_NAME_KEY) {
        return Conflict::Duplicate("Appointment type".to_string()).into();
    }
    BookingError::Database(err)
}

#[derive(Clone)]
pub struct PgAppointmentTypeRepository {
    pool: DbPool,
}

impl PgAppointmentTypeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentTypeRepository for PgAppointmentTypeRepository {
    async fn list(&self, visible_only: bool) -> BookingResult<Vec<AppointmentType>> {
        let rows = get_appointment_types(&self.pool, visible_only).await?;
        Ok(rows.into_iter().map(AppointmentType::from).collect())
    }

    async fn find(&self, id: i32) -> BookingResult<Option<AppointmentType>> {
        Ok(get_appointment_type_by_id(&self.pool, id)
            .await?
            .map(AppointmentType::from))
    }

    async fn create(&self, name: &str) -> BookingResult<AppointmentType> {
        let row = create_appointment_type(&self.pool, name)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn save(&self, appointment_type: &AppointmentType) -> BookingResult<AppointmentType> {
        let row = update_appointment_type(&self.pool, appointment_type)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }
}
