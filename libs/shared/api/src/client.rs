use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::ApiError;

/// Statuses that mean "this base is not the API", so the next candidate is tried.
const FALLTHROUGH_STATUSES: [StatusCode; 4] = [
    StatusCode::NOT_FOUND,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

pub struct DirectoryClient {
    client: Client,
    candidates: Vec<String>,
}

impl DirectoryClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.directory_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build directory HTTP client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            candidates: build_candidates(config),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Dropping auth token with invalid header characters"),
            }
        }

        headers
    }

    /// Tries every candidate base in order and returns the first response that
    /// is not a fallthrough status.
    pub async fn fetch_first_reachable(
        &self,
        path: &str,
        query: &[(String, String)],
        auth_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidPath(path.to_string()));
        }

        let mut attempts = Vec::new();

        for base in &self.candidates {
            let url = format!("{}{}", base, path);
            debug!("Making request to {}", url);

            let request = self
                .client
                .get(&url)
                .headers(self.get_headers(auth_token))
                .query(query);

            match request.send().await {
                Ok(response) if FALLTHROUGH_STATUSES.contains(&response.status()) => {
                    debug!("{} answered {}, trying next base", url, response.status());
                    attempts.push(format!("{} -> {}", url, response.status().as_u16()));
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!("{} unreachable: {}", url, e);
                    attempts.push(format!("{} -> network_error", url));
                }
            }
        }

        error!("Failed to reach directory API for {}", path);
        Err(ApiError::Unreachable {
            path: path.to_string(),
            attempts,
        })
    }

    pub async fn get_json<T>(
        &self,
        path: &str,
        query: &[(String, String)],
        auth_token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.fetch_first_reachable(path, query, auth_token).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Candidate bases in priority order: configured base, then same-host fallbacks.
pub fn build_candidates(config: &AppConfig) -> Vec<String> {
    let port = config.directory_fallback_port;
    let raw = [
        config.directory_api_base_url.clone(),
        config.host_fallback_base(),
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ];

    let mut candidates: Vec<String> = Vec::new();
    for value in raw {
        let base = value.trim().trim_end_matches('/').to_string();
        if base.is_empty() || candidates.contains(&base) {
            continue;
        }
        if !is_absolute_base(&base) {
            debug!("Skipping relative directory base {}", base);
            continue;
        }
        candidates.push(base);
    }
    candidates
}

fn is_absolute_base(base: &str) -> bool {
    let lower = base.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
