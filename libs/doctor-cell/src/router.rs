use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers::{self, DoctorCellState};

pub fn doctor_routes(config: Arc<AppConfig>) -> Router {
    let state = Arc::new(DoctorCellState::new(config));

    // Directory browsing is public
    Router::new()
        .route("/search", get(handlers::search_doctors))
        .route("/match", post(handlers::match_doctors))
        .with_state(state)
}
