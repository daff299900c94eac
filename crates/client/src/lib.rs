//! HTTP client for the Nano Banana image API.
//!
//! [`JobApi`] is the job-facing contract consumed by the poller and slot
//! orchestrator; [`ApiClient`] implements it over [`reqwest`] and adds the
//! account, gallery and billing reads used by the other pages.

pub mod api;
pub mod config;
pub mod error;
pub mod job_api;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::RequestError;
pub use job_api::JobApi;
