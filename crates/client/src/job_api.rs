use async_trait::async_trait;
use banana_core::types::AssetId;
use banana_core::{Asset, EditRequest, GenerationRequest, Job, JobRequest};

use crate::error::RequestError;

/// Job-facing half of the remote API.
///
/// Every call is a single-shot request with no client-side state and no
/// retries. [`get_job`](Self::get_job) is an idempotent read and may be
/// called repeatedly.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// `POST /generate`. Returns the job in a non-terminal status.
    async fn create_generation_job(&self, request: &GenerationRequest)
        -> Result<Job, RequestError>;

    /// `POST /edit`. `request.input_asset_id` must come from
    /// [`upload_asset`](Self::upload_asset).
    async fn create_edit_job(&self, request: &EditRequest) -> Result<Job, RequestError>;

    /// `POST /upload` (multipart). Returns the new asset's id.
    async fn upload_asset(&self, bytes: Vec<u8>, file_name: &str)
        -> Result<AssetId, RequestError>;

    /// `GET /jobs/{job_id}`.
    async fn get_job(&self, job_id: &str) -> Result<Job, RequestError>;

    /// `GET /assets/{asset_id}`.
    async fn get_asset(&self, asset_id: &str) -> Result<Asset, RequestError>;

    /// Dispatch either kind of creation request.
    async fn create_job(&self, request: &JobRequest) -> Result<Job, RequestError> {
        match request {
            JobRequest::Generate(req) => self.create_generation_job(req).await,
            JobRequest::Edit(req) => self.create_edit_job(req).await,
        }
    }
}
