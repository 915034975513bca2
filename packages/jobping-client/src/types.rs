//! Wire types for the JobPing API.
//!
//! Response shapes are tolerant: collection fields the server may omit
//! default to empty, and fields that only some deployments populate are
//! `Option`s. The client never treats an absent collection as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/register` and `POST /api/login`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// The authenticated user, returned alongside the token.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// Successful login/register response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// One user-defined key/value preference row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preference {
    pub id: Uuid,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferencesResponse {
    #[serde(default)]
    pub preferences: Vec<Preference>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePreferenceRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdatePreferenceRequest {
    pub value: String,
}

/// A scraped job posting. Immutable from the client's perspective; the
/// client only ever replaces whole snapshots of the server's collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "url")]
    pub job_url: String,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub max_salary: Option<f64>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_score: Option<i32>,
    #[serde(default)]
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Body of `POST /api/jobs/fetch`. All fields are required by the fetcher
/// service, so [`crate::FetchParams`] defaults are applied before this is
/// built.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FetchRequest {
    pub search_term: String,
    pub location: String,
    pub results_wanted: u32,
}

/// Summary of a fetch trigger: the fetcher found jobs and queued them for
/// background ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    pub message: String,
    #[serde(default)]
    pub jobs_found: u32,
    #[serde(default)]
    pub jobs_queued: u32,
}

/// Summary of a scan trigger: jobs were fetched and stored synchronously.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    pub message: String,
    #[serde(default)]
    pub fetched: u32,
    #[serde(default)]
    pub stored: u32,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// The authenticated user's profile and notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub ai_prompt: Option<String>,
    #[serde(default)]
    pub discord_webhook: Option<String>,
    #[serde(default)]
    pub notify_threshold: i32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdatePromptRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateThresholdRequest {
    pub threshold: i32,
}

/// A per-user AI match against a stored job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobMatch {
    pub id: Uuid,
    pub job_id: Uuid,
    pub score: i32,
    #[serde(default)]
    pub analysis: serde_json::Value,
    #[serde(default)]
    pub notified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<JobMatch>,
}

/// Generic `{"message": ...}` acknowledgement body.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body the server writes on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
