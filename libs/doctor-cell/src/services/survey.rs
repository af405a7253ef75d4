use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DoctorRecord, DoctorViewModel, Language};
use crate::services::presentation::DoctorPresenter;
use crate::services::ranking::{normalize_rating, parse_timestamp};

pub const MAX_SURVEY_RESULTS: usize = 8;
/// Below this many eligible doctors the hard filters are dropped.
pub const MIN_ELIGIBLE: usize = 3;
/// Days reported when a doctor has no known next slot.
pub const UNKNOWN_AVAILABILITY_DAYS: u32 = 99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

/// Questionnaire answers keyed by step id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyAnswers(HashMap<String, AnswerValue>);

impl SurveyAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), AnswerValue::One(value.to_string()));
        self
    }

    /// First answer for `key`, or "" when unanswered.
    pub fn get(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(AnswerValue::One(v)) => v.as_str(),
            Some(AnswerValue::Many(values)) => values.first().map(String::as_str).unwrap_or(""),
            None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WeightProfile {
    concern: f64,
    access: f64,
    preference: f64,
    reviews: f64,
}

fn weights_for(priority: &str) -> WeightProfile {
    match priority {
        "fastest" => WeightProfile { concern: 0.35, access: 0.52, preference: 0.10, reviews: 0.03 },
        "top_rated" => WeightProfile { concern: 0.30, access: 0.18, preference: 0.17, reviews: 0.35 },
        "experienced" => WeightProfile { concern: 0.38, access: 0.22, preference: 0.20, reviews: 0.20 },
        _ => WeightProfile { concern: 0.42, access: 0.30, preference: 0.18, reviews: 0.10 },
    }
}

fn concern_keywords(answer: &str) -> &'static [&'static str] {
    match answer {
        "anxiety_stress" => &["anxiety", "stress", "panic", "worry", "ocd"],
        "depression" => &["depression", "mood", "sadness", "grief", "bipolar"],
        "trauma" => &["trauma", "ptsd", "abuse", "grief", "loss"],
        "relationships" => &["couples", "relationship", "family", "communication", "marriage"],
        "work_burnout" => &["burnout", "stress", "work", "career", "life transitions"],
        "self_growth" => &["self", "growth", "confidence", "identity", "mindfulness"],
        "child_support" => &["child", "adhd", "behaviour", "school", "adolescent", "teen"],
        "ocd" => &["ocd", "obsessive", "compulsive"],
        "panic" => &["panic", "anxiety"],
        "grief" => &["grief", "loss", "bereavement"],
        "addiction" => &["addiction", "substance", "dependency", "recovery"],
        "adhd" => &["adhd", "attention", "hyperactivity"],
        "phobia" => &["phobia", "fear", "anxiety"],
        "insomnia" => &["insomnia", "sleep"],
        "anger" => &["anger", "emotion", "regulation"],
        _ => &[],
    }
}

fn approach_keywords(answer: &str) -> &'static [&'static str] {
    match answer {
        "cbt" => &["cbt", "cognitive", "behavioral", "cognitive-behavioral"],
        "mindfulness" => &["mindfulness", "mbsr", "mindfulness-based", "acceptance"],
        "psychodynamic" => &["psychodynamic", "psychoanalytic", "relational", "depth"],
        "supportive" => &["supportive", "humanistic", "person-centred", "talk"],
        _ => &[],
    }
}

fn includes_keyword<'a>(items: impl IntoIterator<Item = &'a String>, keywords: &[&str]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    items.into_iter().any(|item| {
        let item = item.to_lowercase();
        keywords.iter().any(|kw| item.contains(kw))
    })
}

fn concern_tags(doctor: &DoctorRecord) -> impl Iterator<Item = &String> {
    doctor.concerns.iter().chain(doctor.specialties.iter())
}

/// Whole days until the next slot, rounded up. Past or current slots are 0.
pub fn days_until_available(next_available_at: Option<&str>, now: DateTime<Utc>) -> u32 {
    let Some(at) = next_available_at.and_then(parse_timestamp) else {
        return UNKNOWN_AVAILABILITY_DAYS;
    };
    let millis = (at - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let days = (millis + 86_400_000 - 1) / 86_400_000;
    days.min(u32::MAX as i64) as u32
}

fn passes_filter(answers: &SurveyAnswers, doctor: &DoctorRecord) -> bool {
    match answers.get("session_format") {
        "in_person" if !doctor.offers_in_person() => return false,
        "online" if !doctor.offers_online() => return false,
        _ => {}
    }

    if answers.get("who_is_it_for") == "my_child" {
        let child_focused = doctor
            .specialties
            .iter()
            .chain(doctor.concerns.iter())
            .map(|t| t.to_lowercase())
            .any(|t| ["child", "adolescent", "adhd", "paediatric"].iter().any(|k| t.contains(k)));
        if !child_focused {
            return false;
        }
    }

    true
}

fn concern_score(answers: &SurveyAnswers, doctor: &DoctorRecord) -> f64 {
    let mut score = 0.0;
    if includes_keyword(concern_tags(doctor), concern_keywords(answers.get("care_goal"))) {
        score += 0.55;
    }
    if includes_keyword(concern_tags(doctor), concern_keywords(answers.get("concern_detail"))) {
        score += 0.45;
    }
    f64::min(score, 1.0)
}

fn access_score(days: u32) -> f64 {
    (1.0 - days as f64 / 7.0).max(0.0)
}

fn speaks(doctor: &DoctorRecord, language: &str) -> bool {
    doctor.languages.iter().any(|l| l.to_lowercase().contains(language))
}

fn has_gender(doctor: &DoctorRecord, gender: &str) -> bool {
    doctor
        .gender_identity
        .as_deref()
        .is_some_and(|g| g.trim().eq_ignore_ascii_case(gender))
}

fn preference_score(answers: &SurveyAnswers, doctor: &DoctorRecord) -> f64 {
    let mut score = 0.4;

    score += match answers.get("therapist_preference") {
        "" | "no_pref" => 0.3,
        "lang_arabic" if speaks(doctor, "arabic") => 0.6,
        "lang_english" if speaks(doctor, "english") => 0.6,
        "gender_female" if has_gender(doctor, "female") => 0.6,
        "gender_male" if has_gender(doctor, "male") => 0.6,
        _ => 0.0,
    };

    let approach = answers.get("approach_style");
    if approach.is_empty()
        || approach == "no_pref_app"
        || includes_keyword(&doctor.approaches, approach_keywords(approach))
    {
        score += 0.2;
    }

    f64::min(score, 1.0)
}

fn review_score(rating: f64, reviews: u32) -> f64 {
    let normalized = (rating - 1.0) / 4.0;
    let confidence = (reviews as f64 / 100.0).min(1.0);
    normalized * confidence
}

fn build_explanation(
    answers: &SurveyAnswers,
    doctor: &DoctorRecord,
    days: u32,
    language: Language,
) -> Vec<String> {
    let ar = language == Language::Ar;
    let pick = |en: &str, arabic: &str| if ar { arabic.to_string() } else { en.to_string() };
    let mut reasons = Vec::new();

    let goal = answers.get("care_goal");
    let detail = answers.get("concern_detail");
    if includes_keyword(concern_tags(doctor), concern_keywords(goal))
        || includes_keyword(concern_tags(doctor), concern_keywords(detail))
    {
        reasons.push(pick("Specializes in your concern", "متخصص في حالتك"));
    }

    match days {
        0 => reasons.push(pick("Available today", "متاح اليوم")),
        1 => reasons.push(pick("Available in 1 day", "متاح خلال 1 يوم")),
        2 => reasons.push(pick("Available in 2 days", "متاح خلال 2 يوم")),
        _ => {}
    }

    match answers.get("session_format") {
        "online" if doctor.offers_online() => {
            reasons.push(pick("Offers online sessions", "يقدم جلسات أونلاين"))
        }
        "in_person" if doctor.offers_in_person() => {
            reasons.push(pick("Offers in-person sessions", "يقدم جلسات حضورية"))
        }
        _ => {}
    }

    match answers.get("therapist_preference") {
        "lang_arabic" if speaks(doctor, "arabic") => reasons.push(pick("Arabic-speaking", "يتحدث العربية")),
        "lang_english" if speaks(doctor, "english") => reasons.push(pick("English-speaking", "يتحدث الإنجليزية")),
        "gender_female" if has_gender(doctor, "female") => reasons.push(pick("Female therapist", "معالجة")),
        "gender_male" if has_gender(doctor, "male") => reasons.push(pick("Male therapist", "معالج")),
        _ => {}
    }

    let approach = answers.get("approach_style");
    if !approach.is_empty()
        && approach != "no_pref_app"
        && includes_keyword(&doctor.approaches, approach_keywords(approach))
    {
        let label = match approach {
            "cbt" => pick("CBT approach", "نهج العلاج المعرفي السلوكي"),
            "mindfulness" => pick("Mindfulness-based", "نهج اليقظة الذهنية"),
            "psychodynamic" => pick("Psychodynamic", "نهج ديناميكي نفسي"),
            "supportive" => pick("Supportive style", "أسلوب داعم"),
            _ => pick("Matches your preferred approach", "يتوافق مع الأسلوب المفضل لديك"),
        };
        reasons.push(label);
    }

    if doctor.is_verified() {
        reasons.push(pick("Verified therapist", "معالج موثق"));
    }

    let rating = normalize_rating(doctor.rating);
    if answers.get("priority") == "top_rated" && rating >= 4.5 {
        reasons.push(if ar {
            format!("تقييم {:.1} ⭐", rating)
        } else {
            format!("Rated {:.1} ⭐", rating)
        });
    }

    reasons.truncate(4);
    reasons
}

fn build_warnings(days: u32, reviews: u32, language: Language) -> Vec<String> {
    let ar = language == Language::Ar;
    let mut warnings = Vec::new();
    if days >= 7 {
        warnings.push(if ar { "قد يكون الموعد القادم بعد أكثر من أسبوع" } else { "Next slot may be over a week away" });
    }
    if reviews < 10 {
        warnings.push(if ar { "عدد التقييمات ما يزال محدودًا" } else { "Limited reviews so far" });
    }
    warnings.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMatch {
    pub record: DoctorRecord,
    pub score: f64,
    pub explanation: Vec<String>,
    pub warnings: Vec<String>,
    pub is_recommended: bool,
    pub next_available_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyMatchView {
    pub doctor: DoctorViewModel,
    pub score: f64,
    pub explanation: Vec<String>,
    pub warnings: Vec<String>,
    pub is_recommended: bool,
    pub next_available_days: u32,
}

impl SurveyMatch {
    pub fn to_view(&self, presenter: &DoctorPresenter) -> SurveyMatchView {
        SurveyMatchView {
            doctor: presenter.present(&self.record, false),
            score: self.score,
            explanation: self.explanation.clone(),
            warnings: self.warnings.clone(),
            is_recommended: self.is_recommended,
            next_available_days: self.next_available_days,
        }
    }
}

/// Scores every doctor against the questionnaire and returns the best few.
pub fn match_doctors(
    answers: &SurveyAnswers,
    doctors: Vec<DoctorRecord>,
    language: Language,
    now: DateTime<Utc>,
) -> Vec<SurveyMatch> {
    let priority = match answers.get("priority") {
        "" => "balanced",
        p => p,
    };
    let weights = weights_for(priority);

    let eligible_count = doctors.iter().filter(|d| passes_filter(answers, d)).count();
    let relax = eligible_count < MIN_ELIGIBLE;
    if relax {
        debug!("Only {} doctors pass survey filters, relaxing", eligible_count);
    }

    let mut scored: Vec<SurveyMatch> = doctors
        .into_iter()
        .filter(|d| relax || passes_filter(answers, d))
        .map(|doctor| {
            let days = days_until_available(doctor.next_available_at.as_deref(), now);
            let rating = normalize_rating(doctor.rating);

            let score = weights.concern * concern_score(answers, &doctor)
                + weights.access * access_score(days)
                + weights.preference * preference_score(answers, &doctor)
                + weights.reviews * review_score(rating, doctor.reviews_count);

            SurveyMatch {
                explanation: build_explanation(answers, &doctor, days, language),
                warnings: build_warnings(days, doctor.reviews_count, language),
                record: doctor,
                score,
                is_recommended: false,
                next_available_days: days,
            }
        })
        .collect();

    // Scores within the same hundredth are treated as equal and fall back to availability.
    scored.sort_by(|a, b| {
        score_bucket(b.score)
            .cmp(&score_bucket(a.score))
            .then_with(|| a.next_available_days.cmp(&b.next_available_days))
    });

    if let Some(first) = scored.first_mut() {
        first.is_recommended = true;
    }

    scored.truncate(MAX_SURVEY_RESULTS);
    scored
}

fn score_bucket(score: f64) -> i64 {
    (score * 100.0).round() as i64
}
