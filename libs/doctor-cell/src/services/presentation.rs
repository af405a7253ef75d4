use shared_config::AppConfig;

use crate::models::{DoctorRecord, DoctorViewModel, Language};
use crate::services::matching::contains_ci;
use crate::services::media::MediaResolver;
use crate::services::ranking::normalize_rating;
use crate::services::shaping::ShapedDoctor;

pub const MAX_TAGS: usize = 5;
pub const LOCATION_SEPARATOR: &str = " · ";

/// Localized fallback strings used by the display adapter.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub general_therapy: &'static str,
    pub contact_for_price: &'static str,
    pub online: &'static str,
    pub unknown_location: &'static str,
    pub per_session: &'static str,
    pub therapist: &'static str,
}

impl Language {
    pub fn labels(self) -> Labels {
        match self {
            Language::En => Labels {
                general_therapy: "General Therapy",
                contact_for_price: "Contact for price",
                online: "Online",
                unknown_location: "Unknown",
                per_session: "session",
                therapist: "Therapist",
            },
            Language::Ar => Labels {
                general_therapy: "علاج عام",
                contact_for_price: "تواصل لمعرفة السعر",
                online: "أونلاين",
                unknown_location: "غير محدد",
                per_session: "جلسة",
                therapist: "معالج نفسي",
            },
        }
    }
}

/// Maps upstream records onto display-ready view models.
#[derive(Debug, Clone)]
pub struct DoctorPresenter {
    media: MediaResolver,
    language: Language,
}

impl DoctorPresenter {
    pub fn new(config: &AppConfig, language: Language) -> Self {
        Self::with_media(MediaResolver::new(config), language)
    }

    pub fn with_media(media: MediaResolver, language: Language) -> Self {
        Self { media, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn present(&self, doctor: &DoctorRecord, is_top_doctor: bool) -> DoctorViewModel {
        let labels = self.language.labels();

        DoctorViewModel {
            id: doctor.id.clone(),
            slug: doctor.slug.clone(),
            name: doctor.display_name.clone(),
            title: doctor
                .headline
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .unwrap_or(labels.therapist)
                .to_string(),
            photo_url: self.media.resolve(doctor.photo_url.as_deref()),
            tags: build_tags(doctor, &labels),
            location: build_location(doctor, &labels),
            price: format_price(doctor, &labels),
            rating: normalize_rating(doctor.rating),
            reviews_count: doctor.reviews_count,
            is_verified: doctor.is_verified(),
            is_top_doctor,
            offers_online: doctor.offers_online(),
            next_available_at: doctor.next_available_at.clone(),
        }
    }

    pub fn present_all(&self, shaped: &[ShapedDoctor]) -> Vec<DoctorViewModel> {
        shaped
            .iter()
            .map(|entry| self.present(&entry.record, entry.is_top_doctor))
            .collect()
    }
}

/// Specialties, concerns and approaches, de-duplicated by trimmed value.
pub fn build_tags(doctor: &DoctorRecord, labels: &Labels) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    let all = doctor
        .specialties
        .iter()
        .chain(doctor.concerns.iter())
        .chain(doctor.approaches.iter());

    for tag in all {
        let trimmed = tag.trim();
        if trimmed.is_empty() || tags.iter().any(|t| t == trimmed) {
            continue;
        }
        tags.push(trimmed.to_string());
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    if tags.is_empty() {
        tags.push(labels.general_therapy.to_string());
    }
    tags
}

pub fn build_location(doctor: &DoctorRecord, labels: &Labels) -> String {
    let base = [doctor.city.as_deref(), doctor.country.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(LOCATION_SEPARATOR);

    match (base.is_empty(), doctor.offers_online()) {
        (true, true) => labels.online.to_string(),
        (true, false) => labels.unknown_location.to_string(),
        (false, true) if !contains_ci(&base, labels.online) => {
            format!("{}{}{}", base, LOCATION_SEPARATOR, labels.online)
        }
        (false, _) => base,
    }
}

pub fn format_price(doctor: &DoctorRecord, labels: &Labels) -> String {
    match doctor.price_per_session.filter(|p| p.is_finite()) {
        Some(amount) => {
            let currency = doctor.pricing_currency.as_deref().unwrap_or("").trim();
            let amount = format_amount(amount);
            if currency.is_empty() {
                format!("{} / {}", amount, labels.per_session)
            } else {
                format!("{} {} / {}", amount, currency, labels.per_session)
            }
        }
        None => labels.contact_for_price.to_string(),
    }
}

/// Whole amounts print without a fractional part.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}
