use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn portal_routes(state: Arc<AppConfig>) -> Router {
    // Every admin route needs a valid token
    Router::new()
        .route("/applications/{application_id}/checklist", get(handlers::get_application_checklist))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
