use banana_client::RequestError;
use banana_jobs::OrchestratorError;

/// Page-level errors. `Display` is the text shown under the action button.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Please enter a prompt.")]
    EmptyPrompt,

    #[error("Please upload an image and provide an edit prompt.")]
    MissingEditInput,

    #[error("Unsupported file type. Supported file types: JPG, PNG, WEBP.")]
    UnsupportedFormat,

    #[error("File is too large ({size} bytes). Max size 10MB.")]
    TooLarge { size: usize },

    /// The previous request has not settled yet.
    #[error("A request is already in progress.")]
    Busy,

    #[error("There is no previous edit to try again.")]
    NothingToRetry,

    /// The input image could not be uploaded. Slots are left untouched.
    #[error("{0}")]
    Upload(RequestError),

    #[error(transparent)]
    Submit(#[from] OrchestratorError),
}
