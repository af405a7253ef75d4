// libs/doctor-cell/src/services/matching.rs
use crate::models::{active_text, DoctorRecord, FilterSet};

pub const KEYWORD_WEIGHT: u32 = 5;
pub const SPECIALTY_WEIGHT: u32 = 4;
pub const CONCERN_WEIGHT: u32 = 4;
pub const APPROACH_WEIGHT: u32 = 4;
pub const LANGUAGE_WEIGHT: u32 = 3;
pub const SESSION_TYPE_WEIGHT: u32 = 3;
pub const LOCATION_WEIGHT: u32 = 3;
pub const GENDER_WEIGHT: u32 = 2;
pub const INSURANCE_WEIGHT: u32 = 2;

/// How well a doctor satisfies the filters: the sum of the weights of every
/// satisfied filter field. Unset fields contribute nothing.
pub fn match_score(doctor: &DoctorRecord, filters: &FilterSet) -> u32 {
    let mut score = 0;

    if let Some(term) = active_text(&filters.keyword) {
        if contains_ci(&searchable_text(doctor), term) {
            score += KEYWORD_WEIGHT;
        }
    }

    let membership = [
        (&filters.specialty, &doctor.specialties, SPECIALTY_WEIGHT),
        (&filters.concern, &doctor.concerns, CONCERN_WEIGHT),
        (&filters.approach, &doctor.approaches, APPROACH_WEIGHT),
        (&filters.language, &doctor.languages, LANGUAGE_WEIGHT),
        (&filters.session_type, &doctor.session_types, SESSION_TYPE_WEIGHT),
        (&filters.insurance, &doctor.insurance_providers, INSURANCE_WEIGHT),
    ];
    for (wanted, offered, weight) in membership {
        if let Some(wanted) = active_text(wanted) {
            if offered.iter().any(|item| item.trim().eq_ignore_ascii_case(wanted)) {
                score += weight;
            }
        }
    }

    if let Some(place) = active_text(&filters.location) {
        let in_city = doctor.city.as_deref().is_some_and(|c| contains_ci(c, place));
        let in_country = doctor.country.as_deref().is_some_and(|c| contains_ci(c, place));
        if in_city || in_country {
            score += LOCATION_WEIGHT;
        }
    }

    if let Some(gender) = active_text(&filters.gender) {
        if doctor
            .gender_identity
            .as_deref()
            .is_some_and(|g| g.trim().to_lowercase() == gender.to_lowercase())
        {
            score += GENDER_WEIGHT;
        }
    }

    score
}

/// Everything the free-text term is matched against, joined by spaces.
fn searchable_text(doctor: &DoctorRecord) -> String {
    let singles = [
        Some(doctor.display_name.as_str()),
        doctor.headline.as_deref(),
        doctor.city.as_deref(),
        doctor.country.as_deref(),
        doctor.gender_identity.as_deref(),
    ];

    singles
        .into_iter()
        .flatten()
        .chain(doctor.specialties.iter().map(String::as_str))
        .chain(doctor.concerns.iter().map(String::as_str))
        .chain(doctor.approaches.iter().map(String::as_str))
        .chain(doctor.languages.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
