use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_api::ApiError;
use shared_models::error::AppError;

// ==============================================================================
// UPSTREAM RECORDS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub start: String,
    pub end: String,
}

/// A doctor application as returned by `GET /admin/applications/{id}`.
/// Nullable lists are kept as `Option` so `null` and missing both decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorApplication {
    pub id: String,
    pub doctor_user_id: Option<String>,
    pub status: Option<String>,
    pub full_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub national_id: Option<String>,
    pub license_number: Option<String>,
    pub license_document_url: Option<String>,
    pub specialty: Option<String>,
    pub languages: Option<Vec<String>>,
    pub location_city: Option<String>,
    pub location_country: Option<String>,
    pub online_available: Option<bool>,
    /// String or number upstream.
    pub consultation_fee: Option<Value>,
    pub short_bio: Option<String>,
    pub schedule: Option<Vec<ScheduleEntry>>,
    pub created_at: Option<String>,
}

// ==============================================================================
// VERIFICATION CHECKLIST
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Complete,
    Partial,
    Missing,
}

impl SectionStatus {
    pub fn from_leaves(leaves: &[bool]) -> Self {
        let done = leaves.iter().filter(|leaf| **leaf).count();
        match done {
            0 => SectionStatus::Missing,
            n if n == leaves.len() => SectionStatus::Complete,
            _ => SectionStatus::Partial,
        }
    }
}

pub trait ChecklistSection {
    fn leaves(&self) -> Vec<bool>;

    fn status(&self) -> SectionStatus {
        SectionStatus::from_leaves(&self.leaves())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityChecks {
    pub full_name: bool,
    pub photo: bool,
    pub national_id: bool,
}

impl ChecklistSection for IdentityChecks {
    fn leaves(&self) -> Vec<bool> {
        vec![self.full_name, self.photo, self.national_id]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensingChecks {
    pub license_number: bool,
    pub license_document: bool,
}

impl ChecklistSection for LicensingChecks {
    fn leaves(&self) -> Vec<bool> {
        vec![self.license_number, self.license_document]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeChecks {
    pub specialty: bool,
    pub languages: bool,
    pub location: bool,
    pub schedule: bool,
}

impl ChecklistSection for PracticeChecks {
    fn leaves(&self) -> Vec<bool> {
        vec![self.specialty, self.languages, self.location, self.schedule]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChecks {
    pub short_bio: bool,
    pub consultation_fee: bool,
}

impl ChecklistSection for ProfileChecks {
    fn leaves(&self) -> Vec<bool> {
        vec![self.short_bio, self.consultation_fee]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationChecklist {
    pub identity: IdentityChecks,
    pub licensing: LicensingChecks,
    pub practice: PracticeChecks,
    pub profile: ProfileChecks,
}

impl VerificationChecklist {
    pub fn is_complete(&self) -> bool {
        self.identity
            .leaves()
            .into_iter()
            .chain(self.licensing.leaves())
            .chain(self.practice.leaves())
            .chain(self.profile.leaves())
            .all(|leaf| leaf)
    }

    pub fn report(&self, application: &DoctorApplication) -> ChecklistReport {
        ChecklistReport {
            application_id: application.id.clone(),
            application_status: application.status.clone(),
            identity: SectionReport::new(self.identity),
            licensing: SectionReport::new(self.licensing),
            practice: SectionReport::new(self.practice),
            profile: SectionReport::new(self.profile),
            is_complete: self.is_complete(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport<T> {
    #[serde(flatten)]
    pub checks: T,
    pub status: SectionStatus,
}

impl<T: ChecklistSection> SectionReport<T> {
    fn new(checks: T) -> Self {
        let status = checks.status();
        Self { checks, status }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistReport {
    pub application_id: String,
    pub application_status: Option<String>,
    pub identity: SectionReport<IdentityChecks>,
    pub licensing: SectionReport<LicensingChecks>,
    pub practice: SectionReport<PracticeChecks>,
    pub profile: SectionReport<ProfileChecks>,
    pub is_complete: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Sign in to continue")]
    LoginRequired,

    #[error("{0} role required")]
    Forbidden(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Invalid application id")]
    InvalidApplicationId,

    #[error(transparent)]
    Directory(#[from] ApiError),
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        let text = err.to_string();
        match err {
            PortalError::LoginRequired | PortalError::InvalidToken(_) => AppError::Auth(text),
            PortalError::Forbidden(_) => AppError::Forbidden(text),
            PortalError::InvalidApplicationId => AppError::BadRequest(text),
            PortalError::Directory(api) => api.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_status() {
        assert_eq!(SectionStatus::from_leaves(&[true, true]), SectionStatus::Complete);
        assert_eq!(SectionStatus::from_leaves(&[true, false]), SectionStatus::Partial);
        assert_eq!(SectionStatus::from_leaves(&[false, false]), SectionStatus::Missing);
    }

    #[test]
    fn test_application_decodes_nulls() {
        let app: DoctorApplication = serde_json::from_value(serde_json::json!({
            "id": "app-1",
            "languages": null,
            "schedule": null,
            "consultation_fee": 35
        }))
        .unwrap();
        assert_eq!(app.languages, None);
        assert_eq!(app.consultation_fee, Some(serde_json::json!(35)));
    }

    #[test]
    fn test_report_flattens_sections() {
        let checklist = VerificationChecklist {
            identity: IdentityChecks { full_name: true, photo: false, national_id: true },
            ..VerificationChecklist::default()
        };
        let report = checklist.report(&DoctorApplication::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["identity"]["full_name"], true);
        assert_eq!(json["identity"]["status"], "partial");
        assert_eq!(json["licensing"]["status"], "missing");
        assert_eq!(json["is_complete"], false);
    }
}
