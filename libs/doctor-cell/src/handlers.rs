use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ConsultationType, FilterSet, Language};
use crate::services::{
    directory::DoctorDirectoryService,
    presentation::DoctorPresenter,
    search::DoctorSearchService,
    sequencing::SearchSequencer,
    survey::{self, SurveyAnswers},
};

/// Header a client sends so that an older in-flight search can be superseded.
pub const SEARCH_SESSION_HEADER: &str = "x-search-session";

pub struct DoctorCellState {
    pub config: Arc<AppConfig>,
    pub sequencer: Arc<SearchSequencer>,
}

impl DoctorCellState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            sequencer: Arc::new(SearchSequencer::new()),
        }
    }

    fn language(&self, requested: Option<&str>) -> Language {
        Language::from_code(requested.unwrap_or(&self.config.default_language))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub main_search: Option<String>,
    pub q: Option<String>,
    pub specialty: Option<String>,
    pub concern: Option<String>,
    pub approach: Option<String>,
    pub language: Option<String>,
    pub session_type: Option<String>,
    #[serde(alias = "location")]
    pub city: Option<String>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub consultation_type: Option<ConsultationType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub available_within_days: Option<u32>,
    pub lang: Option<String>,
}

impl From<DoctorSearchQuery> for FilterSet {
    fn from(query: DoctorSearchQuery) -> Self {
        FilterSet {
            main_search: query.main_search,
            keyword: query.q,
            specialty: query.specialty,
            concern: query.concern,
            approach: query.approach,
            language: query.language,
            session_type: query.session_type,
            location: query.city,
            gender: query.gender,
            insurance: query.insurance,
            consultation_type: query.consultation_type,
            min_price: query.min_price,
            max_price: query.max_price,
            available_within_days: query.available_within_days,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub answers: SurveyAnswers,
    pub lang: Option<String>,
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<DoctorCellState>>,
    headers: HeaderMap,
    query: Result<Query<DoctorSearchQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let language = state.language(query.lang.as_deref());
    let session = headers
        .get(SEARCH_SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    let filters = FilterSet::from(query);
    let service = DoctorSearchService::new(&state.config, language, state.sequencer.clone());

    let results = service.search(&filters, session).await?;
    info!("Search returned {} doctors", results.total);

    Ok(Json(json!(results)))
}

#[axum::debug_handler]
pub async fn match_doctors(
    State(state): State<Arc<DoctorCellState>>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<Value>, AppError> {
    let language = state.language(request.lang.as_deref());
    debug!("Matching survey answers: {:?}", request.answers);

    let directory = DoctorDirectoryService::new(&state.config);
    let records = directory.fetch_doctors(&FilterSet::default()).await?;

    let matches = survey::match_doctors(&request.answers, records, language, Utc::now());
    let presenter = DoctorPresenter::new(&state.config, language);
    let views: Vec<_> = matches.iter().map(|m| m.to_view(&presenter)).collect();

    Ok(Json(json!({
        "matches": views,
        "total": views.len()
    })))
}
