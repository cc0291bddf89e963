use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use slotbook_core::{
    errors::BookingResult, models::bank_account::BankAccount, repository::BankAccountRepository,
};
use uuid::Uuid;

use crate::{DbPool, models::DbBankAccount};

pub async fn get_bank_accounts(pool: &DbPool, active_only: bool) -> Result<Vec<DbBankAccount>> {
    let accounts = sqlx::query_as::<_, DbBankAccount>(
        r#"
        SELECT id, bank_name, account_number, is_active, created_at, updated_at
        FROM bank_accounts
        WHERE is_active OR NOT $1
        ORDER BY bank_name, created_at
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

pub async fn get_bank_account_by_id(pool: &DbPool, id: Uuid) -> Result<Option<DbBankAccount>> {
    let account = sqlx::query_as::<_, DbBankAccount>(
        r#"
        SELECT id, bank_name, account_number, is_active, created_at, updated_at
        FROM bank_accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub async fn create_bank_account(
    pool: &DbPool,
    bank_name: &str,
    account_number: &str,
) -> Result<DbBankAccount> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let account = sqlx::query_as::<_, DbBankAccount>(
        r#"
        INSERT INTO bank_accounts (id, bank_name, account_number, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, TRUE, $4, $4)
        RETURNING id, bank_name, account_number, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(bank_name)
    .bind(account_number)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

pub async fn update_bank_account(pool: &DbPool, account: &BankAccount) -> Result<DbBankAccount> {
    let updated = sqlx::query_as::<_, DbBankAccount>(
        r#"
        UPDATE bank_accounts
        SET bank_name = $2, account_number = $3, is_active = $4, updated_at = $5
        WHERE id = $1
        RETURNING id, bank_name, account_number, is_active, created_at, updated_at
        "#,
    )
    .bind(account.id)
    .bind(&account.bank_name)
    .bind(&account.account_number)
    .bind(account.is_active)
    .bind(account.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

#[derive(Clone)]
pub struct PgBankAccountRepository {
    pool: DbPool,
}

impl PgBankAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankAccountRepository for PgBankAccountRepository {
    async fn list(&self, active_only: bool) -> BookingResult<Vec<BankAccount>> {
        let rows = get_bank_accounts(&self.pool, active_only).await?;
        Ok(rows.into_iter().map(BankAccount::from).collect())
    }

    async fn find(&self, id: Uuid) -> BookingResult<Option<BankAccount>> {
        Ok(get_bank_account_by_id(&self.pool, id)
            .await?
            .map(BankAccount::from))
    }

    async fn create(&self, bank_name: &str, account_number: &str) -> BookingResult<BankAccount> {
        Ok(create_bank_account(&self.pool, bank_name, account_number)
            .await?
            .into())
    }

    async fn save(&self, account: &BankAccount) -> BookingResult<BankAccount> {
        Ok(update_bank_account(&self.pool, account).await?.into())
    }
}
