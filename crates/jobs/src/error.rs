use banana_client::RequestError;
use banana_core::types::JobId;
use banana_core::CoreError;

/// Why a job did not produce an image.
///
/// `Display` is the text shown inline in the job's slot.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Job creation was rejected or never reached the server.
    #[error("{0}")]
    Creation(#[from] RequestError),

    /// A status or asset read failed. Polling stops after one failure.
    #[error("Could not fetch job status.")]
    StatusCheck { reason: String },

    /// The server reported `failed`.
    #[error("{0}")]
    JobFailed(String),

    /// The server reported `completed` without an output asset.
    #[error("Job {job_id} completed without an output image.")]
    ProtocolViolation { job_id: JobId },

    /// No terminal status within the configured attempt budget.
    #[error("Timed out waiting for the job after {attempts} status checks.")]
    PollTimeout { attempts: u32 },
}

/// Errors returned synchronously by [`SlotOrchestrator::submit`](crate::SlotOrchestrator::submit).
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Cannot submit {count} jobs to {capacity} slots")]
    InvalidCount { count: usize, capacity: usize },

    #[error(transparent)]
    Invalid(#[from] CoreError),
}
