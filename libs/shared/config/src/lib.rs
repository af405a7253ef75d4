use std::env;
use tracing::warn;

pub const DEFAULT_FALLBACK_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory_api_base_url: String,
    pub public_host: String,
    pub directory_fallback_port: u16,
    pub directory_timeout_secs: u64,
    pub jwt_secret: String,
    pub default_language: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directory_api_base_url: String::new(),
            public_host: "localhost".to_string(),
            directory_fallback_port: DEFAULT_FALLBACK_PORT,
            directory_timeout_secs: 10,
            jwt_secret: String::new(),
            default_language: "en".to_string(),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            directory_api_base_url: env::var("DIRECTORY_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DIRECTORY_API_BASE_URL not set, relying on host fallbacks");
                    String::new()
                }),
            public_host: env::var("PUBLIC_HOST")
                .unwrap_or_else(|_| {
                    warn!("PUBLIC_HOST not set, using default");
                    defaults.public_host.clone()
                }),
            directory_fallback_port: parse_var("DIRECTORY_FALLBACK_PORT", defaults.directory_fallback_port),
            directory_timeout_secs: parse_var("DIRECTORY_TIMEOUT_SECS", defaults.directory_timeout_secs),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            default_language: env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| defaults.default_language.clone()),
            server_port: parse_var("PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.directory_api_base_url.is_empty() && !self.jwt_secret.is_empty()
    }

    /// Same-host base used when no explicit directory base is configured.
    pub fn host_fallback_base(&self) -> String {
        format!("http://{}:{}", self.public_host, self.directory_fallback_port)
    }
}

fn parse_var<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
