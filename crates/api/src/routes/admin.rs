use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;

use crate::{
    ApiState,
    handlers::{admin, availability, catalog},
    middleware::auth::require_auth,
};

fn appointment_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/appointments", get(admin::list_appointments))
        .route("/appointments/:id", get(admin::get_appointment))
        .route("/appointments/:id/receipt", get(admin::get_receipt))
        .route("/appointments/:id/approve", post(admin::approve_appointment))
        .route("/appointments/:id/reject", post(admin::reject_appointment))
        .route("/appointments/:id/done", post(admin::mark_done))
        .route("/appointments/:id/move", patch(admin::move_appointment))
        .route("/calendar", get(admin::calendar))
}

fn rule_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/availability-rules", get(availability::list_rules))
        .route(
            "/availability-rules/weekday",
            post(availability::upsert_weekday_rule),
        )
        .route(
            "/availability-rules/weekday/:day",
            delete(availability::delete_weekday_rule),
        )
        .route(
            "/availability-rules/specific-date",
            post(availability::upsert_specific_date_rule),
        )
        .route(
            "/availability-rules/specific-date/:date",
            delete(availability::delete_specific_date_rule),
        )
        .route(
            "/availability-rules/:id",
            put(availability::update_rule).delete(availability::delete_rule),
        )
}

fn catalog_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/appointment-types",
            get(catalog::list_types).post(catalog::create_type),
        )
        .route(
            "/appointment-types/:id/visibility",
            patch(catalog::update_type_visibility),
        )
        .route(
            "/bank-accounts",
            get(catalog::list_bank_accounts).post(catalog::create_bank_account),
        )
        .route(
            "/bank-accounts/:id",
            patch(catalog::update_bank_account).delete(catalog::deactivate_bank_account),
        )
}

/// Everything under `/admin`. Requests without a valid bearer token are
/// rejected before reaching a handler.
pub fn routes(state: Arc<ApiState>) -> Router<Arc<ApiState>> {
    let admin = Router::new()
        .merge(appointment_routes())
        .merge(rule_routes())
        .merge(catalog_routes())
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().nest("/admin", admin)
}
