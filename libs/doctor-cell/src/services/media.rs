use std::sync::LazyLock;

use regex::Regex;

use shared_config::AppConfig;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?:)?//").expect("static regex"));
static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("static regex"));

/// Resolves profile photo paths against the directory API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self::from_bases(&config.directory_api_base_url, &config.host_fallback_base())
    }

    /// The configured base wins unless it is empty or the relative `/api` proxy.
    pub fn from_bases(configured: &str, fallback: &str) -> Self {
        let configured = configured.trim();
        let chosen = if configured.is_empty() || configured == "/api" {
            fallback.trim()
        } else {
            configured
        };

        let trimmed = chosen.trim_end_matches('/');
        let base = trimmed.strip_suffix("/api").unwrap_or(trimmed);

        Self { base: base.to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn resolve(&self, raw: Option<&str>) -> Option<String> {
        let url = raw.map(str::trim).filter(|u| !u.is_empty())?;

        if ABSOLUTE_URL.is_match(url) || url.starts_with("data:") || url.starts_with("blob:") {
            return Some(url.to_string());
        }

        let path = REPEATED_SLASHES.replace_all(url, "/");
        let path = path.trim_start_matches('/');
        Some(format!("{}/{}", self.base, path))
    }
}
