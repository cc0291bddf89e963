use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use slotbook_core::{
    errors::{BookingError, BookingResult, Conflict},
    models::user::User,
    repository::UserRepository,
};
use uuid::Uuid;

use crate::{DbPool, models::DbUser, schema::USER_EMAIL_KEY, violated_constraint};

pub async fn get_user_by_id(pool: &DbPool, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn create_user(pool: &DbPool, email: &str, password_hash: &str) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}", id, email);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find(&self, id: Uuid) -> BookingResult<Option<User>> {
        Ok(get_user_by_id(&self.pool, id).await?.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> BookingResult<Option<User>> {
        Ok(get_user_by_email(&self.pool, email).await?.map(User::from))
    }

    async fn create(&self, email: &str, password_hash: &str) -> BookingResult<User> {
        let row = create_user(&self.pool, email, password_hash)
            .await
            .map_err(|err| {
                if violated_constraint(&err) == Some(USER_EMAIL_KEY) {
                    return BookingError::from(Conflict::Duplicate("User".to_string()));
                }
                BookingError::Database(err)
            })?;
        Ok(row.into())
    }
}
