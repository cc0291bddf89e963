use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/appointments",
            post(handlers::appointments::create_appointment),
        )
        .route(
            "/appointments/short/:short_id",
            get(handlers::appointments::get_by_short_id),
        )
        .route(
            "/appointments/receipt/:short_id",
            get(handlers::appointments::get_receipt_by_short_id),
        )
        .route(
            "/appointments/available-hours",
            get(handlers::appointments::available_hours),
        )
        .route("/appointments/types", get(handlers::appointments::list_types))
        .route(
            "/bank-accounts",
            get(handlers::appointments::list_bank_accounts),
        )
}
