// libs/doctor-cell/src/services/directory.rs
use tracing::{debug, info};

use shared_api::DirectoryClient;
use shared_config::AppConfig;

use crate::models::{DoctorError, DoctorRecord, FilterSet};

pub const DOCTORS_PATH: &str = "/doctors";

/// Reads the public therapist directory from the upstream API.
pub struct DoctorDirectoryService {
    client: DirectoryClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DirectoryClient::new(config),
        }
    }

    /// Fetch doctors matching the server-side filters, in API order.
    pub async fn fetch_doctors(&self, filters: &FilterSet) -> Result<Vec<DoctorRecord>, DoctorError> {
        filters.validate()?;

        let params = filters.to_query_params();
        debug!("Fetching doctors with params: {:?}", params);

        let doctors: Vec<DoctorRecord> = self.client.get_json(DOCTORS_PATH, &params, None).await?;

        info!("Directory returned {} doctors", doctors.len());
        Ok(doctors)
    }
}
