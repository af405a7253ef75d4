use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::PortalError;
use crate::services::{
    navigation::{Access, Route},
    review::{build_checklist, ApplicationReviewService},
    session::AuthSession,
};

#[axum::debug_handler]
pub async fn get_application_checklist(
    State(config): State<Arc<AppConfig>>,
    Path(application_id): Path<String>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let session = AuthSession::from_user(auth.token(), &user);
    let route = Route::AdminApplication { id: application_id.clone() };

    match session.access(&route) {
        Access::Allowed => {}
        Access::RequiresLogin => return Err(PortalError::LoginRequired.into()),
        Access::Forbidden => {
            warn!("User {} ({}) denied {}", user.id, session.role.as_str(), route.path());
            return Err(PortalError::Forbidden("ADMIN".to_string()).into());
        }
    }

    debug!("Building checklist for application {}", application_id);

    let service = ApplicationReviewService::new(&config);
    let application = service.fetch_application(&application_id, &session).await?;
    let report = build_checklist(&application).report(&application);

    Ok(Json(json!(report)))
}
