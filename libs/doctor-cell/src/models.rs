use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_api::ApiError;
use shared_models::error::AppError;

pub const VERIFIED_BADGE: &str = "VERIFIED_DOCTOR";

/// Session types that can be delivered remotely.
pub const ONLINE_SESSION_TYPES: [&str; 4] = ["VIDEO", "AUDIO", "CHAT", "ONLINE"];

// ==============================================================================
// UPSTREAM RECORDS
// ==============================================================================

/// A therapist as returned by the directory API `GET /doctors`.
///
/// Every field is optional on the wire. Numbers may arrive as JSON numbers or
/// numeric strings; anything else degrades to "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorRecord {
    #[serde(rename = "doctor_user_id", alias = "id", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient::string")]
    pub display_name: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub headline: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub photo_url: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub specialties: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub concerns: Vec<String>,
    #[serde(rename = "therapy_approaches", alias = "approaches", deserialize_with = "lenient::string_list")]
    pub approaches: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub session_types: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub gender_identity: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub insurance_providers: Vec<String>,
    #[serde(rename = "location_city", alias = "city", deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(rename = "location_country", alias = "country", deserialize_with = "lenient::opt_string")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub pricing_currency: Option<String>,
    #[serde(rename = "pricing_per_session", deserialize_with = "lenient::number")]
    pub price_per_session: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub follow_up_price: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub reviews_count: u32,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub next_available_at: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub verification_badges: Vec<String>,
}

impl DoctorRecord {
    pub fn offers_online(&self) -> bool {
        self.session_types.iter().any(|t| {
            let upper = t.trim().to_ascii_uppercase();
            ONLINE_SESSION_TYPES.contains(&upper.as_str())
        })
    }

    pub fn offers_in_person(&self) -> bool {
        self.session_types
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case("IN_PERSON"))
    }

    pub fn is_verified(&self) -> bool {
        self.verification_badges.iter().any(|b| b == VERIFIED_BADGE)
    }
}

// ==============================================================================
// SEARCH INPUT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    Online,
    InPerson,
}

/// User-entered search constraints. The all-default value is the browse state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    /// Name search box; a non-empty value keeps the API order untouched.
    pub main_search: Option<String>,
    /// Free-text term scored against the whole profile.
    pub keyword: Option<String>,
    pub specialty: Option<String>,
    pub concern: Option<String>,
    pub approach: Option<String>,
    pub language: Option<String>,
    pub session_type: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub consultation_type: Option<ConsultationType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub available_within_days: Option<u32>,
}

/// Trimmed, non-blank view of an optional text filter.
pub fn active_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FilterSet {
    pub fn name_search(&self) -> Option<&str> {
        active_text(&self.main_search)
    }

    pub fn is_active(&self) -> bool {
        [
            &self.main_search,
            &self.keyword,
            &self.specialty,
            &self.concern,
            &self.approach,
            &self.language,
            &self.session_type,
            &self.location,
            &self.gender,
            &self.insurance,
        ]
        .into_iter()
        .any(|field| active_text(field).is_some())
            || self.consultation_type.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.available_within_days.is_some()
    }

    pub fn validate(&self) -> Result<(), DoctorError> {
        for (name, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(price) = value {
                if !price.is_finite() || price < 0.0 {
                    return Err(DoctorError::InvalidFilter(format!("{} must be >= 0", name)));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(DoctorError::InvalidFilter("min_price must be <= max_price".to_string()));
            }
        }
        if let Some(days) = self.available_within_days {
            if !(1..=90).contains(&days) {
                return Err(DoctorError::InvalidFilter(
                    "available_within_days must be between 1 and 90".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Query string for the directory `GET /doctors` endpoint.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        let text_params = [
            ("specialty", &self.specialty),
            ("concern", &self.concern),
            ("approach", &self.approach),
            ("language", &self.language),
        ];
        for (key, value) in text_params {
            if let Some(v) = active_text(value) {
                push(key, v.to_string());
            }
        }

        match (active_text(&self.session_type), self.consultation_type) {
            (Some(v), _) => push("session_type", v.to_string()),
            (None, Some(ConsultationType::InPerson)) => push("session_type", "IN_PERSON".to_string()),
            _ => {}
        }
        if self.consultation_type == Some(ConsultationType::Online) {
            push("online_only", "true".to_string());
        }

        let trailing = [
            ("city", &self.location),
            ("gender", &self.gender),
            ("insurance", &self.insurance),
        ];
        for (key, value) in trailing {
            if let Some(v) = active_text(value) {
                push(key, v.to_string());
            }
        }

        if let Some(days) = self.available_within_days {
            push("available_within_days", days.to_string());
        }
        if let Some(min) = self.min_price {
            push("min_price", min.to_string());
        }
        if let Some(max) = self.max_price {
            push("max_price", max.to_string());
        }

        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" => Language::Ar,
            _ => Language::En,
        }
    }
}

// ==============================================================================
// OUTPUT
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorViewModel {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub photo_url: Option<String>,
    pub tags: Vec<String>,
    pub location: String,
    pub price: String,
    pub rating: f64,
    pub reviews_count: u32,
    pub is_verified: bool,
    pub is_top_doctor: bool,
    pub offers_online: bool,
    pub next_available_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub doctors: Vec<DoctorViewModel>,
    pub total: usize,
    pub name_search: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Search superseded by a newer request")]
    Superseded,

    #[error(transparent)]
    Directory(#[from] ApiError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        let text = err.to_string();
        match err {
            DoctorError::InvalidFilter(msg) => AppError::BadRequest(msg),
            DoctorError::Superseded => AppError::Conflict(text),
            DoctorError::Directory(api) => api.into(),
        }
    }
}

// ==============================================================================
// LENIENT WIRE DECODING
// ==============================================================================

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn finite(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|v| v.is_finite())
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(finite(&Value::deserialize(deserializer)?))
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = finite(&Value::deserialize(deserializer)?).unwrap_or(0.0);
        Ok(n.max(0.0).min(u32::MAX as f64) as u32)
    }

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_tolerates_messy_payload() {
        let record: DoctorRecord = serde_json::from_value(json!({
            "doctor_user_id": "d-1",
            "display_name": "Dr. Sara",
            "rating": "4.7",
            "reviews_count": "NaN",
            "pricing_per_session": null,
            "specialties": null,
            "concerns": ["Anxiety", 3],
            "location_city": 12
        }))
        .unwrap();

        assert_eq!(record.id, "d-1");
        assert_eq!(record.rating, Some(4.7));
        assert_eq!(record.reviews_count, 0);
        assert_eq!(record.price_per_session, None);
        assert!(record.specialties.is_empty());
        assert_eq!(record.concerns, vec!["Anxiety".to_string()]);
        assert_eq!(record.city, None);
    }

    #[test]
    fn test_blank_filters_are_inactive() {
        let filters = FilterSet {
            main_search: Some("   ".to_string()),
            keyword: Some(String::new()),
            ..FilterSet::default()
        };
        assert!(!filters.is_active());
        assert!(filters.name_search().is_none());

        let filters = FilterSet {
            max_price: Some(60.0),
            ..FilterSet::default()
        };
        assert!(filters.is_active());
    }

    #[test]
    fn test_validate_price_bounds() {
        let filters = FilterSet {
            min_price: Some(80.0),
            max_price: Some(60.0),
            ..FilterSet::default()
        };
        assert!(matches!(filters.validate(), Err(DoctorError::InvalidFilter(_))));

        let filters = FilterSet {
            available_within_days: Some(120),
            ..FilterSet::default()
        };
        assert!(filters.validate().is_err());

        assert!(FilterSet::default().validate().is_ok());
    }

    #[test]
    fn test_query_params_from_filters() {
        let filters = FilterSet {
            specialty: Some(" CBT ".to_string()),
            location: Some("Amman".to_string()),
            consultation_type: Some(ConsultationType::InPerson),
            max_price: Some(60.0),
            ..FilterSet::default()
        };

        let params = filters.to_query_params();
        assert_eq!(
            params,
            vec![
                ("specialty".to_string(), "CBT".to_string()),
                ("session_type".to_string(), "IN_PERSON".to_string()),
                ("city".to_string(), "Amman".to_string()),
                ("max_price".to_string(), "60".to_string()),
            ]
        );
    }

    #[test]
    fn test_online_consultation_sets_online_only() {
        let filters = FilterSet {
            consultation_type: Some(ConsultationType::Online),
            ..FilterSet::default()
        };
        assert_eq!(
            filters.to_query_params(),
            vec![("online_only".to_string(), "true".to_string())]
        );
    }
}
