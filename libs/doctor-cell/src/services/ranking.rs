use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{DoctorRecord, FilterSet};
use crate::services::matching::match_score;

pub const MAX_RATING: f64 = 5.0;

/// Absent or non-numeric ratings count as 0; the rest are clamped into [0, 5].
pub fn normalize_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() => r.clamp(0.0, MAX_RATING),
        _ => 0.0,
    }
}

/// Parses an upstream timestamp. Offsets are honored; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Next slot if it lies in the future; `None` sorts as infinitely far.
pub fn upcoming_availability(doctor: &DoctorRecord, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    doctor
        .next_available_at
        .as_deref()
        .and_then(parse_timestamp)
        .filter(|at| *at >= now)
}

/// Precomputed sort key; computed once per record rather than per comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct RankKey {
    pub score: u32,
    pub rating: f64,
    pub reviews: u32,
    pub available_at: Option<DateTime<Utc>>,
}

impl RankKey {
    pub fn for_doctor(doctor: &DoctorRecord, filters: &FilterSet, now: DateTime<Utc>) -> Self {
        Self {
            score: match_score(doctor, filters),
            rating: normalize_rating(doctor.rating),
            reviews: doctor.reviews_count,
            available_at: upcoming_availability(doctor, now),
        }
    }

    /// `Less` means `self` ranks ahead of `other`.
    pub fn compare(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.rating.total_cmp(&self.rating))
            .then_with(|| other.reviews.cmp(&self.reviews))
            .then_with(|| match (self.available_at, other.available_at) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

/// Orders doctors best-first. Stable: full ties keep their input order.
pub fn rank_doctors(
    doctors: Vec<DoctorRecord>,
    filters: &FilterSet,
    now: DateTime<Utc>,
) -> Vec<DoctorRecord> {
    let mut keyed: Vec<(RankKey, DoctorRecord)> = doctors
        .into_iter()
        .map(|doctor| (RankKey::for_doctor(&doctor, filters, now), doctor))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    keyed.into_iter().map(|(_, doctor)| doctor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn doctor(slug: &str, rating: Option<f64>, reviews: u32, next: Option<String>) -> DoctorRecord {
        DoctorRecord {
            slug: slug.to_string(),
            rating,
            reviews_count: reviews,
            next_available_at: next,
            ..DoctorRecord::default()
        }
    }

    fn slugs(doctors: &[DoctorRecord]) -> Vec<&str> {
        doctors.iter().map(|d| d.slug.as_str()).collect()
    }

    #[test]
    fn test_rating_clamp() {
        assert_eq!(normalize_rating(Some(7.5)), 5.0);
        assert_eq!(normalize_rating(Some(-2.0)), 0.0);
        assert_eq!(normalize_rating(Some(3.3)), 3.3);
        assert_eq!(normalize_rating(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_rating(None), 0.0);
    }

    #[test]
    fn test_out_of_range_ratings_tie_at_the_bound() {
        let ranked = rank_doctors(
            vec![
                doctor("inflated", Some(9.0), 3, None),
                doctor("perfect", Some(5.0), 3, None),
            ],
            &FilterSet::default(),
            now(),
        );
        // Clamped to 5.0 both, so input order survives.
        assert_eq!(slugs(&ranked), vec!["inflated", "perfect"]);
    }

    #[test]
    fn test_rating_then_reviews_then_availability() {
        let soon = Some((now() + Duration::hours(3)).to_rfc3339());
        let later = Some((now() + Duration::days(4)).to_rfc3339());

        let ranked = rank_doctors(
            vec![
                doctor("later", Some(4.0), 10, later),
                doctor("few-reviews", Some(4.0), 2, None),
                doctor("soon", Some(4.0), 10, soon),
                doctor("best", Some(4.8), 0, None),
            ],
            &FilterSet::default(),
            now(),
        );
        assert_eq!(slugs(&ranked), vec!["best", "soon", "later", "few-reviews"]);
    }

    #[test]
    fn test_past_and_garbage_timestamps_sort_last() {
        let future = Some((now() + Duration::days(1)).to_rfc3339());
        let past = Some((now() - Duration::days(1)).to_rfc3339());

        let ranked = rank_doctors(
            vec![
                doctor("past", None, 0, past),
                doctor("garbage", None, 0, Some("next tuesday".to_string())),
                doctor("future", None, 0, future),
            ],
            &FilterSet::default(),
            now(),
        );
        assert_eq!(slugs(&ranked), vec!["future", "past", "garbage"]);
    }

    #[test]
    fn test_stable_for_full_ties() {
        let input: Vec<DoctorRecord> = (0..8)
            .map(|i| doctor(&format!("d{}", i), Some(4.0), 5, None))
            .collect();
        let ranked = rank_doctors(input.clone(), &FilterSet::default(), now());
        assert_eq!(ranked, input);
    }

    #[test]
    fn test_score_dominates_rating() {
        let mut a = doctor("a", Some(4.9), 0, None);
        let mut b = doctor("b", Some(4.2), 0, None);
        let c = doctor("c", Some(5.0), 0, None);
        a.specialties = vec!["CBT".to_string()];
        b.specialties = vec!["CBT".to_string()];

        let filters = FilterSet {
            specialty: Some("CBT".to_string()),
            ..FilterSet::default()
        };
        let ranked = rank_doctors(vec![c, b, a], &filters, now());
        assert_eq!(slugs(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let parsed = parse_timestamp("2026-03-02T09:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap());
        assert!(parse_timestamp("").is_none());
    }
}
