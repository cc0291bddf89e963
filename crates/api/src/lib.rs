//! # SlotBook API
//!
//! The API crate provides the web server for the SlotBook booking service.
//! Clients book hourly slots and check their booking; admins review bookings,
//! manage availability rules and maintain the catalogue.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into service calls
//! - **Middleware**: Authentication and error mapping
//! - **Storage**: Receipt files on disk
//! - **Config**: Environment and application configuration
//!
//! Business rules live in `slotbook-core` services; handlers never talk to
//! repositories except for user lookups during authentication.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Uploaded receipt files
pub mod storage;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use slotbook_core::{
    clock::{Clock, SystemClock},
    notifications::Outbox,
    repository::{Repositories, UserRepository},
    services::{AppointmentService, CatalogService, RuleService},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::{config::ApiConfig, storage::ReceiptStore};

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use slotbook_api::{ApiState, build_router, config::ApiConfig};
/// use slotbook_core::{notifications::Outbox, repository::Repositories};
///
/// fn example(config: ApiConfig, repos: Repositories) {
///     let (outbox, _receiver) = Outbox::channel();
///     let state = ApiState::new(config, &repos, outbox);
///     let _app = build_router(state);
/// }
/// ```
pub struct ApiState {
    pub config: Arc<ApiConfig>,
    pub appointments: AppointmentService,
    pub rules: RuleService,
    pub catalog: CatalogService,
    pub users: Arc<dyn UserRepository>,
    pub receipts: ReceiptStore,
}

impl ApiState {
    /// State using the wall clock of the configured booking timezone.
    pub fn new(config: ApiConfig, repos: &Repositories, outbox: Outbox) -> Arc<Self> {
        let clock = Arc::new(SystemClock::new(config.timezone));
        Self::with_clock(config, repos, outbox, clock)
    }

    pub fn with_clock(
        config: ApiConfig,
        repos: &Repositories,
        outbox: Outbox,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let receipts = ReceiptStore::new(config.uploads_path.clone());
        Arc::new(Self {
            appointments: AppointmentService::new(repos, clock, outbox),
            rules: RuleService::new(repos.rules.clone()),
            catalog: CatalogService::new(repos.appointment_types.clone(), repos.bank_accounts.clone()),
            users: repos.users.clone(),
            receipts,
            config: Arc::new(config),
        })
    }
}

/// Installs the global `tracing` subscriber
///
/// Call once per process, before anything logs.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Builds the application router with every route and layer attached
pub fn build_router(state: Arc<ApiState>) -> Router {
    let config = state.config.clone();

    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Public booking endpoints
        .merge(routes::appointments::routes())
        // Sign-in and current user
        .merge(routes::auth::routes(state.clone()))
        // Admin endpoints
        .merge(routes::admin::routes(state.clone()))
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until the process is stopped
///
/// Tracing must already be initialised, see [`init_tracing`].
pub async fn start_server(state: Arc<ApiState>) -> Result<()> {
    let addr = state.config.server_addr();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
