//! JobPing API client: the request gateway plus the typed operations.
//!
//! Every HTTP exchange goes through [`ApiClient::send`], which attaches the
//! session token, normalizes failures into [`ApiError`], and short-circuits
//! empty-body responses. The operations above it are thin, total mappings:
//! one intent, one exchange, one typed result.

use std::sync::Arc;

use reqwest::{header, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::session::{FileCredentialStore, SessionStore};
use crate::types::{
    AuthRequest, AuthResponse, CreatePreferenceRequest, ErrorBody, FetchRequest, FetchResponse,
    Job, JobMatch, JobsResponse, MatchesResponse, MessageResponse, Preference,
    PreferencesResponse, Profile, ScanResponse, UpdatePreferenceRequest, UpdatePromptRequest,
    UpdateThresholdRequest,
};

/// Fallback search term when the caller doesn't narrow the fetch.
pub const DEFAULT_SEARCH_TERM: &str = "software engineer";
/// Fallback location when the caller doesn't narrow the fetch.
pub const DEFAULT_LOCATION: &str = "San Francisco, CA";
/// Fallback number of postings to request from the fetcher.
pub const DEFAULT_RESULTS_WANTED: u32 = 5;

/// Caller-facing fetch parameters. Unset fields fall back to the documented
/// defaults so the request never reaches the fetcher with missing fields.
#[derive(Debug, Clone, Default)]
pub struct FetchParams {
    pub search_term: Option<String>,
    pub location: Option<String>,
    pub results_wanted: Option<u32>,
}

/// Typed client for the JobPing API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            session,
        }
    }

    /// Client wired for normal use: base address from the environment and
    /// the token persisted under the user's config directory.
    pub fn from_env() -> Self {
        let session = SessionStore::new(Arc::new(FileCredentialStore::default()));
        Self::new(ClientConfig::from_env(), Arc::new(session))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request through the gateway. Attaches the JSON content type
    /// and, when a token is held, the bearer authorization header; an absent
    /// token is not an error here; rejecting unauthenticated calls is the
    /// server's job. Returns the raw body, or `None` on `204 No Content`.
    async fn send(&self, req: RequestBuilder) -> Result<Option<String>> {
        let req = req.header(header::CONTENT_TYPE, "application/json");
        let req = match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let response = req.send().await.map_err(|e| {
            warn!(error = %e, "request never reached the server");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) if !body.message.is_empty() => body.message,
                Ok(_) => format!("HTTP {}", status.as_u16()),
                Err(_) => "Request failed".to_string(),
            };
            warn!(status = status.as_u16(), reason = %message, "server rejected request");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Some(body))
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let body = self.send(req).await?.unwrap_or_default();
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn execute_unit(&self, req: RequestBuilder) -> Result<()> {
        self.send(req).await.map(|_| ())
    }

    // ---- auth ----

    /// Create an account. The returned token is pushed into the session
    /// store before this returns, so callers never persist it themselves.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = AuthRequest {
            username: required("username", username)?,
            password: required("password", password)?,
        };
        let response: AuthResponse = self
            .execute(self.http.post(self.url("/api/register")).json(&body))
            .await?;
        self.session.set_token(Some(response.token.clone()));
        debug!(username = %response.user.username, "registered and authenticated");
        Ok(response)
    }

    /// Log in. Same token contract as [`ApiClient::register`].
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = AuthRequest {
            username: required("username", username)?,
            password: required("password", password)?,
        };
        let response: AuthResponse = self
            .execute(self.http.post(self.url("/api/login")).json(&body))
            .await?;
        self.session.set_token(Some(response.token.clone()));
        debug!(username = %response.user.username, "logged in");
        Ok(response)
    }

    /// Log out. Purely local: the token is dropped and unpersisted, the
    /// server is not notified. Safe to call repeatedly.
    pub fn logout(&self) {
        self.session.set_token(None);
    }

    // ---- preferences ----

    pub async fn preferences(&self) -> Result<Vec<Preference>> {
        let response: PreferencesResponse = self
            .execute(self.http.get(self.url("/api/preferences")))
            .await?;
        Ok(response.preferences)
    }

    pub async fn create_preference(&self, key: &str, value: &str) -> Result<Preference> {
        let body = CreatePreferenceRequest {
            key: required("key", key)?,
            value: required("value", value)?,
        };
        self.execute(self.http.post(self.url("/api/preferences")).json(&body))
            .await
    }

    pub async fn update_preference(&self, id: Uuid, value: &str) -> Result<Preference> {
        let body = UpdatePreferenceRequest {
            value: required("value", value)?,
        };
        self.execute(
            self.http
                .put(self.url(&format!("/api/preferences/{id}")))
                .json(&body),
        )
        .await
    }

    pub async fn delete_preference(&self, id: Uuid) -> Result<()> {
        self.execute_unit(self.http.delete(self.url(&format!("/api/preferences/{id}"))))
            .await
    }

    // ---- jobs ----

    /// List stored jobs, newest first, optionally bounded by `limit`.
    pub async fn jobs(&self, limit: Option<u32>) -> Result<Vec<Job>> {
        if limit == Some(0) {
            return Err(ApiError::Validation("limit must be positive".into()));
        }
        let mut req = self.http.get(self.url("/api/jobs"));
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let response: JobsResponse = self.execute(req).await?;
        Ok(response.jobs)
    }

    pub async fn job(&self, id: Uuid) -> Result<Job> {
        self.execute(self.http.get(self.url(&format!("/api/jobs/{id}"))))
            .await
    }

    /// Ask the fetcher service to scrape new postings. The work is queued
    /// server-side; the response only says how much was found and enqueued.
    pub async fn fetch_jobs(&self, params: FetchParams) -> Result<FetchResponse> {
        let body = FetchRequest {
            search_term: params
                .search_term
                .unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string()),
            location: params
                .location
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            results_wanted: params.results_wanted.unwrap_or(DEFAULT_RESULTS_WANTED),
        };
        debug!(search_term = %body.search_term, location = %body.location, "triggering fetch");
        self.execute(self.http.post(self.url("/api/jobs/fetch")).json(&body))
            .await
    }

    /// Run a synchronous scan-and-ingest pass. Unlike a fetch, the jobs are
    /// already stored by the time the response arrives.
    pub async fn scan_jobs(&self) -> Result<ScanResponse> {
        debug!("triggering scan");
        self.execute(self.http.post(self.url("/api/jobs/scan"))).await
    }

    // ---- profile ----

    pub async fn profile(&self) -> Result<Profile> {
        self.execute(self.http.get(self.url("/api/profile"))).await
    }

    pub async fn update_prompt(&self, prompt: &str) -> Result<String> {
        let body = UpdatePromptRequest {
            prompt: required("prompt", prompt)?,
        };
        let response: MessageResponse = self
            .execute(self.http.put(self.url("/api/profile/prompt")).json(&body))
            .await?;
        Ok(response.message)
    }

    /// Set the score threshold above which matches trigger a notification.
    pub async fn update_threshold(&self, threshold: i32) -> Result<String> {
        if !(0..=100).contains(&threshold) {
            return Err(ApiError::Validation(
                "threshold must be between 0 and 100".into(),
            ));
        }
        let body = UpdateThresholdRequest { threshold };
        let response: MessageResponse = self
            .execute(self.http.put(self.url("/api/profile/threshold")).json(&body))
            .await?;
        Ok(response.message)
    }

    pub async fn matches(&self) -> Result<Vec<JobMatch>> {
        let response: MatchesResponse =
            self.execute(self.http.get(self.url("/api/matches"))).await?;
        Ok(response.matches)
    }

    /// Liveness probe. Unauthenticated.
    pub async fn health(&self) -> Result<()> {
        self.execute_unit(self.http.get(self.url("/health"))).await
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
