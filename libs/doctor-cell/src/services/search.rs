use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{DoctorError, FilterSet, Language, SearchResults};
use crate::services::directory::DoctorDirectoryService;
use crate::services::presentation::DoctorPresenter;
use crate::services::sequencing::SearchSequencer;
use crate::services::shaping::shape_results;

/// Fetch, rank, shape and present one search interaction.
pub struct DoctorSearchService {
    directory: DoctorDirectoryService,
    presenter: DoctorPresenter,
    sequencer: Arc<SearchSequencer>,
}

impl DoctorSearchService {
    pub fn new(config: &AppConfig, language: Language, sequencer: Arc<SearchSequencer>) -> Self {
        Self {
            directory: DoctorDirectoryService::new(config),
            presenter: DoctorPresenter::new(config, language),
            sequencer,
        }
    }

    pub async fn search(
        &self,
        filters: &FilterSet,
        session: Option<&str>,
    ) -> Result<SearchResults, DoctorError> {
        let ticket = self.sequencer.begin(session);
        debug!("Search {} with filters: {:?}", ticket.seq(), filters);

        let records = self.directory.fetch_doctors(filters).await?;

        if !self.sequencer.is_current(&ticket) {
            warn!("Discarding stale search {} ({} doctors)", ticket.seq(), records.len());
            return Err(DoctorError::Superseded);
        }

        let shaped = shape_results(records, filters, Utc::now());
        let doctors = self.presenter.present_all(&shaped);

        Ok(SearchResults {
            total: doctors.len(),
            name_search: filters.name_search().is_some(),
            doctors,
        })
    }
}
