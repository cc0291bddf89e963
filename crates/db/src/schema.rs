use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Unique index that keeps two live appointments off the same slot.
pub const ACTIVE_SLOT_INDEX: &str = "uniq_appointments_active_slot";
pub const APPOINTMENT_TYPE_NAME_KEY: &str = "appointment_types_name_key";
pub const USER_EMAIL_KEY: &str = "users_email_key";

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT users_email_key UNIQUE (email)
        );
        "#,
    ),
    (
        "appointment_types",
        r#"
        CREATE TABLE IF NOT EXISTS appointment_types (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            visible BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT appointment_types_name_key UNIQUE (name)
        );
        "#,
    ),
    (
        "bank_accounts",
        r#"
        CREATE TABLE IF NOT EXISTS bank_accounts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            bank_name VARCHAR(255) NOT NULL,
            account_number VARCHAR(255) NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "availability_rules",
        r#"
        CREATE TABLE IF NOT EXISTS availability_rules (
            id SERIAL PRIMARY KEY,
            day_of_week SMALLINT NULL,
            specific_date DATE NULL,
            unavailable_hours INTEGER[] NOT NULL DEFAULT '{}',
            all_day BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_day_of_week CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT single_target CHECK ((day_of_week IS NULL) <> (specific_date IS NULL))
        );
        "#,
    ),
    (
        "appointments",
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            short_id VARCHAR(8) NOT NULL UNIQUE,
            first_name VARCHAR(255) NOT NULL,
            last_name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            phone_number VARCHAR(12) NOT NULL,
            appointment_date DATE NOT NULL,
            appointment_hour INTEGER NOT NULL,
            appointment_type_id INTEGER NOT NULL REFERENCES appointment_types(id),
            bank_account_id UUID NULL REFERENCES bank_accounts(id),
            bank_transfer VARCHAR(255) NOT NULL DEFAULT '',
            receipt_path TEXT NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            rejection_reason TEXT NULL,
            meeting_link TEXT NULL,
            admin_note TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_hour CHECK (appointment_hour BETWEEN 0 AND 23),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'approved', 'rejected', 'done'))
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_rules_day_of_week ON availability_rules(day_of_week) WHERE day_of_week IS NOT NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_rules_specific_date ON availability_rules(specific_date) WHERE specific_date IS NOT NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_appointments_active_slot ON appointments(appointment_date, appointment_hour) WHERE status <> 'rejected'",
    "CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(appointment_date)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status)",
];

/// Creates every table and index that does not exist yet. Safe to run on
/// each start.
pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for (table, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        tracing::debug!("Ensured table {}", table);
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
