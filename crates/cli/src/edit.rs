//! Image edit page: upload one image, apply a prompt edit, show one result.

use std::sync::Arc;

use banana_client::JobApi;
use banana_core::types::AssetId;
use banana_core::{EditRequest, Slot};
use banana_jobs::{PollConfig, SlotEvent, SlotOrchestrator};
use image::ImageFormat;
use tokio::sync::broadcast;

use crate::error::PageError;

/// Largest accepted input image.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Slot error text when an edit job fails without a reason.
pub const EDIT_FAILURE_MESSAGE: &str = "Editing failed.";

pub const EDIT_PLACEHOLDER: &str = "Your edited image will appear here";

/// A validated input image.
#[derive(Debug, Clone)]
pub struct EditInput {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl EditInput {
    /// Accept JPEG, PNG or WEBP bytes up to [`MAX_UPLOAD_BYTES`]. The format
    /// is sniffed from the content, not the file name.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PageError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(PageError::TooLarge { size: bytes.len() });
        }

        let format = match image::guess_format(&bytes) {
            Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => format,
            _ => return Err(PageError::UnsupportedFormat),
        };

        Ok(Self {
            file_name: file_name.into(),
            format,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub struct EditController {
    api: Arc<dyn JobApi>,
    orchestrator: SlotOrchestrator,
    input: Option<EditInput>,
    /// Asset id of `input` once uploaded.
    uploaded: Option<AssetId>,
    last_prompt: Option<String>,
}

impl EditController {
    pub fn new(api: Arc<dyn JobApi>, config: PollConfig) -> Self {
        let config = config.with_failure_message(EDIT_FAILURE_MESSAGE);
        Self {
            orchestrator: SlotOrchestrator::new(Arc::clone(&api), 1, config),
            api,
            input: None,
            uploaded: None,
            last_prompt: None,
        }
    }

    /// Replace the input image. A previous upload is forgotten.
    pub fn select_image(&mut self, input: EditInput) {
        tracing::debug!(file_name = %input.file_name, size = input.len(), "Input image selected");
        self.input = Some(input);
        self.uploaded = None;
        self.last_prompt = None;
    }

    pub fn input(&self) -> Option<&EditInput> {
        self.input.as_ref()
    }

    /// Upload the selected image (once) and start an edit job for `prompt`.
    pub async fn apply_edit(&mut self, prompt: &str) -> Result<(), PageError> {
        if prompt.trim().is_empty() {
            return Err(PageError::MissingEditInput);
        }
        let Some(input) = &self.input else {
            return Err(PageError::MissingEditInput);
        };
        if self.is_editing() {
            return Err(PageError::Busy);
        }

        let asset_id = match &self.uploaded {
            Some(asset_id) => asset_id.clone(),
            None => {
                let asset_id = self
                    .api
                    .upload_asset(input.bytes.clone(), &input.file_name)
                    .await
                    .map_err(PageError::Upload)?;
                tracing::info!(asset_id = %asset_id, "Input image uploaded");
                self.uploaded = Some(asset_id.clone());
                asset_id
            }
        };

        self.last_prompt = Some(prompt.to_string());
        self.submit(asset_id, prompt).await
    }

    /// Re-run the last edit against the already uploaded image.
    pub async fn try_again(&mut self) -> Result<(), PageError> {
        let (Some(asset_id), Some(prompt)) = (self.uploaded.clone(), self.last_prompt.clone())
        else {
            return Err(PageError::NothingToRetry);
        };
        if self.is_editing() {
            return Err(PageError::Busy);
        }
        self.submit(asset_id, &prompt).await
    }

    pub fn is_editing(&self) -> bool {
        !self.orchestrator.is_settled()
    }

    pub fn result(&self) -> Slot {
        self.orchestrator.slot(0).unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SlotEvent> {
        self.orchestrator.subscribe()
    }

    pub fn orchestrator(&self) -> &SlotOrchestrator {
        &self.orchestrator
    }

    pub fn dispose(&self) {
        self.orchestrator.dispose();
    }

    async fn submit(&self, asset_id: AssetId, prompt: &str) -> Result<(), PageError> {
        let request = EditRequest::prompt_edit(asset_id, prompt);
        self.orchestrator
            .submit(1, |_| request.clone().into())
            .await?;
        Ok(())
    }
}
