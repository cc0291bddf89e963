use color_eyre::eyre::{Result, WrapErr, eyre};
use dotenv::dotenv;
use slotbook_api::middleware::auth::hash_password;
use slotbook_core::{errors::BookingError, repository::UserRepository};
use slotbook_db::{create_pool, repositories::user::PgUserRepository, schema::initialize_database};

/// Creates the admin account from `ADMIN_EMAIL` and `ADMIN_PASSWORD`.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;
    let email = std::env::var("ADMIN_EMAIL").wrap_err("ADMIN_EMAIL must be set")?;
    let password = std::env::var("ADMIN_PASSWORD").wrap_err("ADMIN_PASSWORD must be set")?;

    let email = email.trim().to_lowercase();
    if !email.contains('@') || password.len() < 8 {
        return Err(eyre!(
            "ADMIN_EMAIL must be an email address and ADMIN_PASSWORD at least 8 characters"
        ));
    }

    let db_pool = create_pool(&database_url).await?;
    initialize_database(&db_pool).await?;

    let users = PgUserRepository::new(db_pool);
    let password_hash = hash_password(&password)?;
    match users.create(&email, &password_hash).await {
        Ok(user) => println!("Admin {} created with id {}", user.email, user.id),
        Err(BookingError::Conflict(_)) => println!("Admin {} already exists", email),
        Err(e) => return Err(eyre!("Failed to create admin: {}", e)),
    }

    Ok(())
}
