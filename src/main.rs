use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::{ApiState, config::ApiConfig, init_tracing};
use slotbook_core::notifications::Outbox;
use slotbook_db::{create_pool, pg_repositories, schema::initialize_database};
use slotbook_notifier::{config::NotifierConfig, start_dispatcher};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    let notifier_config = NotifierConfig::from_env()?;
    init_tracing(config.log_level)?;
    info!("Booking timezone: {}", config.timezone);

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Email notifications run on their own task
    let (outbox, receiver) = Outbox::channel();
    let dispatcher = start_dispatcher(&notifier_config, receiver)?;

    // Start API server
    let state = ApiState::new(config, &pg_repositories(db_pool), outbox);
    slotbook_api::start_server(state).await?;

    dispatcher.abort();
    Ok(())
}
