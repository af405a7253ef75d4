use serde_json::Value;
use tracing::{debug, info};

use shared_api::DirectoryClient;
use shared_config::AppConfig;

use crate::models::{
    DoctorApplication, IdentityChecks, LicensingChecks, PortalError, PracticeChecks,
    ProfileChecks, VerificationChecklist,
};
use crate::services::session::AuthSession;

pub const APPLICATIONS_PATH: &str = "/admin/applications";

/// Loads doctor applications on behalf of a signed-in admin.
pub struct ApplicationReviewService {
    client: DirectoryClient,
}

impl ApplicationReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DirectoryClient::new(config),
        }
    }

    pub async fn fetch_application(
        &self,
        application_id: &str,
        session: &AuthSession,
    ) -> Result<DoctorApplication, PortalError> {
        let id = application_id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(PortalError::InvalidApplicationId);
        }

        let path = format!("{}/{}", APPLICATIONS_PATH, urlencoding::encode(id));
        debug!("Fetching application {}", id);

        let application: DoctorApplication =
            self.client.get_json(&path, &[], Some(&session.token)).await?;

        info!("Loaded application {} for review", application.id);
        Ok(application)
    }
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// A fee counts when it is a non-negative number, or a string that parses as one.
fn valid_fee(fee: &Option<Value>) -> bool {
    let amount = match fee {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.is_some_and(|a| a.is_finite() && a >= 0.0)
}

pub fn build_checklist(application: &DoctorApplication) -> VerificationChecklist {
    let languages = application
        .languages
        .as_ref()
        .is_some_and(|langs| langs.iter().any(|l| !l.trim().is_empty()));
    let schedule = application
        .schedule
        .as_ref()
        .is_some_and(|slots| slots.iter().any(|s| !s.day.trim().is_empty()));
    let location = filled(&application.location_city)
        || filled(&application.location_country)
        || application.online_available == Some(true);

    VerificationChecklist {
        identity: IdentityChecks {
            full_name: filled(&application.full_name),
            photo: filled(&application.photo_url),
            national_id: filled(&application.national_id),
        },
        licensing: LicensingChecks {
            license_number: filled(&application.license_number),
            license_document: filled(&application.license_document_url),
        },
        practice: PracticeChecks {
            specialty: filled(&application.specialty),
            languages,
            location,
            schedule,
        },
        profile: ProfileChecks {
            short_bio: filled(&application.short_bio),
            consultation_fee: valid_fee(&application.consultation_fee),
        },
    }
}
