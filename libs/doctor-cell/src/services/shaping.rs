use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{DoctorRecord, FilterSet};
use crate::services::ranking::rank_doctors;

/// Number of doctors shown while browsing without any filter.
pub const BROWSE_CAP: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedDoctor {
    pub record: DoctorRecord,
    pub is_top_doctor: bool,
}

/// Where the best match is displayed for a list of `len` doctors.
/// `None` when the list is too short to move anything.
pub fn promotion_slot(len: usize) -> Option<usize> {
    match len {
        0 | 1 => None,
        2 => Some(len / 2),
        _ => Some(1),
    }
}

/// Moves the first element to `promotion_slot`, keeping everyone else in order.
pub fn promote_first<T>(items: &mut Vec<T>) {
    if let Some(slot) = promotion_slot(items.len()) {
        let best = items.remove(0);
        items.insert(slot, best);
    }
}

/// Turns the upstream list into the list that is actually displayed.
pub fn shape_results(
    doctors: Vec<DoctorRecord>,
    filters: &FilterSet,
    now: DateTime<Utc>,
) -> Vec<ShapedDoctor> {
    if let Some(name) = filters.name_search() {
        debug!("Name search '{}': keeping API order for {} doctors", name, doctors.len());
        return doctors
            .into_iter()
            .map(|record| ShapedDoctor { record, is_top_doctor: false })
            .collect();
    }

    let mut ranked = rank_doctors(doctors, filters, now);

    if !filters.is_active() {
        ranked.truncate(BROWSE_CAP);
    }

    let mut shaped: Vec<ShapedDoctor> = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, record)| ShapedDoctor { record, is_top_doctor: idx == 0 })
        .collect();

    promote_first(&mut shaped);

    debug!("Shaped {} doctors (filtered: {})", shaped.len(), filters.is_active());
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn rated(slug: &str, rating: f64) -> DoctorRecord {
        DoctorRecord {
            slug: slug.to_string(),
            rating: Some(rating),
            ..DoctorRecord::default()
        }
    }

    fn slugs(shaped: &[ShapedDoctor]) -> Vec<&str> {
        shaped.iter().map(|d| d.record.slug.as_str()).collect()
    }

    #[test]
    fn test_promotion_slot_table() {
        assert_eq!(promotion_slot(0), None);
        assert_eq!(promotion_slot(1), None);
        assert_eq!(promotion_slot(2), Some(1));
        assert_eq!(promotion_slot(3), Some(1));
        assert_eq!(promotion_slot(10), Some(1));
    }

    #[test]
    fn test_promote_first_is_a_splice() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        promote_first(&mut items);
        assert_eq!(items, vec!['b', 'a', 'c', 'd', 'e']);

        let mut pair = vec![1, 2];
        promote_first(&mut pair);
        assert_eq!(pair, vec![2, 1]);

        let mut single = vec![1];
        promote_first(&mut single);
        assert_eq!(single, vec![1]);
    }

    #[test]
    fn test_browse_caps_at_six() {
        let doctors: Vec<DoctorRecord> = (0..10).map(|i| rated(&format!("d{}", i), i as f64 / 2.0)).collect();
        let shaped = shape_results(doctors, &FilterSet::default(), now());
        assert_eq!(shaped.len(), BROWSE_CAP);

        let few: Vec<DoctorRecord> = (0..4).map(|i| rated(&format!("d{}", i), 3.0)).collect();
        assert_eq!(shape_results(few, &FilterSet::default(), now()).len(), 4);
    }

    #[test]
    fn test_active_filter_is_uncapped() {
        let doctors: Vec<DoctorRecord> = (0..10).map(|i| rated(&format!("d{}", i), 3.0)).collect();
        let filters = FilterSet {
            language: Some("English".to_string()),
            ..FilterSet::default()
        };
        assert_eq!(shape_results(doctors, &filters, now()).len(), 10);
    }

    #[test]
    fn test_single_top_doctor_in_second_slot() {
        let doctors = vec![rated("low", 3.0), rated("high", 4.9), rated("mid", 4.0), rated("min", 1.0)];
        let shaped = shape_results(doctors, &FilterSet::default(), now());

        assert_eq!(slugs(&shaped), vec!["mid", "high", "low", "min"]);
        assert_eq!(shaped.iter().filter(|d| d.is_top_doctor).count(), 1);
        assert!(shaped[1].is_top_doctor);
    }

    #[test]
    fn test_name_search_bypasses_ranking() {
        let doctors = vec![rated("low", 1.0), rated("high", 5.0), rated("mid", 3.0)];
        let filters = FilterSet {
            main_search: Some("Dr.".to_string()),
            ..FilterSet::default()
        };
        let shaped = shape_results(doctors, &filters, now());

        assert_eq!(slugs(&shaped), vec!["low", "high", "mid"]);
        assert!(shaped.iter().all(|d| !d.is_top_doctor));
    }

    #[test]
    fn test_single_result_is_marked_but_not_moved() {
        let shaped = shape_results(vec![rated("only", 4.0)], &FilterSet::default(), now());
        assert_eq!(shaped.len(), 1);
        assert!(shaped[0].is_top_doctor);
    }
}
