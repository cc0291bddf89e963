use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers, middleware::auth::require_auth};

pub fn routes(state: Arc<ApiState>) -> Router<Arc<ApiState>> {
    let protected = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/sign-in", post(handlers::auth::sign_in))
        .merge(protected)
}
