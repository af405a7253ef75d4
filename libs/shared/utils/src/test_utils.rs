use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub directory_api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            directory_api_base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the directory client at a mock server.
    pub fn with_directory(base_url: &str) -> Self {
        Self {
            directory_api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Host fallbacks are aimed at a closed port so only the configured base answers.
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            directory_api_base_url: self.directory_api_base_url.clone(),
            public_host: "127.0.0.1".to_string(),
            directory_fallback_port: 9,
            directory_timeout_secs: 2,
            jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "USER".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "DOCTOR")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "USER")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Canned upstream directory payloads.
pub struct MockDirectoryResponses;

impl MockDirectoryResponses {
    pub fn doctor(slug: &str, display_name: &str) -> serde_json::Value {
        json!({
            "doctor_user_id": Uuid::new_v4(),
            "slug": slug,
            "display_name": display_name,
            "headline": "Clinical Psychologist",
            "photo_url": format!("/media/{}.jpg", slug),
            "specialties": ["Anxiety"],
            "concerns": ["Stress"],
            "therapy_approaches": ["CBT"],
            "languages": ["English", "Arabic"],
            "session_types": ["VIDEO", "IN_PERSON"],
            "gender_identity": "female",
            "insurance_providers": ["MedNet"],
            "location_city": "Amman",
            "location_country": "Jordan",
            "next_available_at": (Utc::now() + Duration::days(2)).to_rfc3339(),
            "rating": 4.5,
            "reviews_count": 25,
            "pricing_currency": "JOD",
            "pricing_per_session": 40,
            "follow_up_price": null,
            "verification_badges": ["VERIFIED_DOCTOR"]
        })
    }

    pub fn rated_doctor(slug: &str, display_name: &str, rating: f64) -> serde_json::Value {
        let mut doctor = Self::doctor(slug, display_name);
        doctor["rating"] = json!(rating);
        doctor
    }

    pub fn complete_application(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_user_id": Uuid::new_v4(),
            "status": "PENDING",
            "full_name": "Dr. Lina Haddad",
            "display_name": "Dr. Lina",
            "email": "lina@example.com",
            "photo_url": "/media/lina.jpg",
            "national_id": "9871234560",
            "license_number": "JMA-4411",
            "specialty": "Clinical Psychology",
            "languages": ["Arabic", "English"],
            "location_city": "Amman",
            "location_country": "Jordan",
            "online_available": true,
            "consultation_fee": "35",
            "short_bio": "CBT-focused therapist.",
            "schedule": [{ "day": "SUN", "start": "09:00", "end": "13:00" }],
            "license_document_url": "/media/license.pdf",
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({ "detail": message })
    }
}
