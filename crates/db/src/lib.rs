pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use std::sync::Arc;

use eyre::Result;
use slotbook_core::repository::Repositories;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::repositories::{
    PgAppointmentRepository, PgAppointmentTypeRepository, PgAvailabilityRuleRepository,
    PgBankAccountRepository, PgUserRepository,
};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed repositories sharing one pool.
pub fn pg_repositories(pool: DbPool) -> Repositories {
    Repositories {
        appointments: Arc::new(PgAppointmentRepository::new(pool.clone())),
        rules: Arc::new(PgAvailabilityRuleRepository::new(pool.clone())),
        appointment_types: Arc::new(PgAppointmentTypeRepository::new(pool.clone())),
        bank_accounts: Arc::new(PgBankAccountRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool)),
    }
}

/// Name of the unique constraint a failed statement violated, if any.
pub fn violated_constraint(report: &eyre::Report) -> Option<&str> {
    match report.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
