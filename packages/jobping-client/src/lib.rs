//! Typed client for the JobPing API.
//!
//! Owns the session token lifecycle, routes every HTTP exchange through one
//! normalizing gateway, and coordinates the scan/fetch-then-reload flow the
//! job board UI is built on.
//!
//! # Example
//!
//! ```rust,ignore
//! use jobping_client::{ApiClient, FetchParams, JobBoard};
//!
//! let client = ApiClient::from_env();
//! client.login("ada", "hunter2").await?;
//!
//! let board = JobBoard::new(client);
//! board.load_jobs().await;
//! board.trigger_fetch(FetchParams::default()).await;
//! board.drain_pending_reloads().await;
//!
//! for job in board.state().jobs {
//!     println!("{} @ {}", job.title, job.company);
//! }
//! ```

pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use board::{BoardState, JobBoard, ReloadStrategy, DEFAULT_FETCH_RELOAD_DELAY, DEFAULT_JOB_LIMIT};
pub use client::{
    ApiClient, FetchParams, DEFAULT_LOCATION, DEFAULT_RESULTS_WANTED, DEFAULT_SEARCH_TERM,
};
pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use session::{CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionStore};
pub use types::{
    AuthResponse, FetchResponse, Job, JobMatch, Preference, Profile, ScanResponse, User,
};
