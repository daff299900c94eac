//! Text-to-image page: one prompt fans out into four generation jobs.

use std::sync::Arc;

use banana_client::JobApi;
use banana_core::{AspectRatio, GenerationRequest, Slot, StylePreset};
use banana_jobs::{PollConfig, SlotEvent, SlotOrchestrator};
use tokio::sync::broadcast;

use crate::error::PageError;

/// Number of images requested per prompt.
pub const GENERATE_SLOTS: usize = 4;

/// Slot error text when a generation job fails without a reason.
pub const GENERATE_FAILURE_MESSAGE: &str = "Generation failed.";

/// Placeholder shown for a slot that has not been requested.
pub const GENERATE_PLACEHOLDER: &str = "Your creation will appear here";

pub struct GenerateController {
    orchestrator: SlotOrchestrator,
    style: StylePreset,
    aspect_ratio: AspectRatio,
}

impl GenerateController {
    pub fn new(api: Arc<dyn JobApi>, config: PollConfig) -> Self {
        let config = config.with_failure_message(GENERATE_FAILURE_MESSAGE);
        Self {
            orchestrator: SlotOrchestrator::new(api, GENERATE_SLOTS, config),
            style: StylePreset::default(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn with_style(mut self, style: StylePreset) -> Self {
        self.style = style;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn style(&self) -> StylePreset {
        self.style
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Request four images for `prompt` in the selected style and ratio.
    ///
    /// Returns once every creation call has finished. Slots keep updating
    /// in the background until [`is_generating`](Self::is_generating)
    /// turns false.
    pub async fn generate(&self, prompt: &str) -> Result<(), PageError> {
        if prompt.trim().is_empty() {
            return Err(PageError::EmptyPrompt);
        }
        if self.is_generating() {
            return Err(PageError::Busy);
        }

        let request = GenerationRequest::new(self.style.apply(prompt)).with_params(
            serde_json::json!({ "aspectRatio": self.aspect_ratio.as_str() }),
        );

        tracing::info!(
            style = self.style.name(),
            aspect_ratio = self.aspect_ratio.as_str(),
            "Starting generation",
        );

        self.orchestrator
            .submit(GENERATE_SLOTS, |_| request.clone().into())
            .await?;
        Ok(())
    }

    pub fn is_generating(&self) -> bool {
        !self.orchestrator.is_settled()
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.orchestrator.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SlotEvent> {
        self.orchestrator.subscribe()
    }

    pub fn orchestrator(&self) -> &SlotOrchestrator {
        &self.orchestrator
    }

    /// Stop all polling. Called when the page goes away.
    pub fn dispose(&self) {
        self.orchestrator.dispose();
    }
}
