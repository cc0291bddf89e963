use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{BookingError, BookingResult},
    models::{
        appointment_type::AppointmentType,
        bank_account::{BankAccount, CreateBankAccountRequest, UpdateBankAccountRequest},
    },
    repository::{AppointmentTypeRepository, BankAccountRepository},
};

/// Appointment types and bank accounts offered to clients.
#[derive(Clone)]
pub struct CatalogService {
    types: Arc<dyn AppointmentTypeRepository>,
    bank_accounts: Arc<dyn BankAccountRepository>,
}

impl CatalogService {
    pub fn new(
        types: Arc<dyn AppointmentTypeRepository>,
        bank_accounts: Arc<dyn BankAccountRepository>,
    ) -> Self {
        Self {
            types,
            bank_accounts,
        }
    }

    /// Types shown on the public booking form.
    pub async fn visible_types(&self) -> BookingResult<Vec<AppointmentType>> {
        self.types.list(true).await
    }

    pub async fn all_types(&self) -> BookingResult<Vec<AppointmentType>> {
        self.types.list(false).await
    }

    pub async fn create_type(&self, name: &str) -> BookingResult<AppointmentType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookingError::validation("Name is required"));
        }

        let appointment_type = self.types.create(name).await?;
        info!(
            "Appointment type {} created: {}",
            appointment_type.id, appointment_type.name
        );
        Ok(appointment_type)
    }

    pub async fn set_type_visibility(
        &self,
        id: i32,
        visible: bool,
    ) -> BookingResult<AppointmentType> {
        let mut appointment_type = self
            .types
            .find(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Appointment type"))?;
        appointment_type.visible = visible;
        self.types.save(&appointment_type).await
    }

    pub async fn active_accounts(&self) -> BookingResult<Vec<BankAccount>> {
        self.bank_accounts.list(true).await
    }

    pub async fn all_accounts(&self) -> BookingResult<Vec<BankAccount>> {
        self.bank_accounts.list(false).await
    }

    pub async fn create_account(
        &self,
        request: &CreateBankAccountRequest,
    ) -> BookingResult<BankAccount> {
        let bank_name = request.bank_name.trim();
        let account_number = request.account_number.trim();
        if bank_name.is_empty() || account_number.is_empty() {
            return Err(BookingError::validation(
                "Bank name and account number are required",
            ));
        }

        let account = self.bank_accounts.create(bank_name, account_number).await?;
        info!("Bank account {} created", account.id);
        Ok(account)
    }

    /// Applies only the fields present in `request`.
    pub async fn update_account(
        &self,
        id: Uuid,
        request: &UpdateBankAccountRequest,
    ) -> BookingResult<BankAccount> {
        let mut account = self.find_account(id).await?;

        if let Some(bank_name) = request.bank_name.as_deref().map(str::trim) {
            if bank_name.is_empty() {
                return Err(BookingError::validation("Bank name cannot be empty"));
            }
            account.bank_name = bank_name.to_string();
        }
        if let Some(account_number) = request.account_number.as_deref().map(str::trim) {
            if account_number.is_empty() {
                return Err(BookingError::validation("Account number cannot be empty"));
            }
            account.account_number = account_number.to_string();
        }
        if let Some(is_active) = request.is_active {
            account.is_active = is_active;
        }
        account.updated_at = Utc::now();

        self.bank_accounts.save(&account).await
    }

    /// Soft delete: the account stays referenced by past appointments.
    pub async fn deactivate_account(&self, id: Uuid) -> BookingResult<BankAccount> {
        let mut account = self.find_account(id).await?;
        account.is_active = false;
        account.updated_at = Utc::now();

        let account = self.bank_accounts.save(&account).await?;
        info!("Bank account {} deactivated", account.id);
        Ok(account)
    }

    async fn find_account(&self, id: Uuid) -> BookingResult<BankAccount> {
        self.bank_accounts
            .find(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Bank account"))
    }
}
