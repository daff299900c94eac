//! Job-creation request bodies for `POST /generate` and `POST /edit`,
//! plus the generate page's style and aspect-ratio choices.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::AssetId;

/// Edit type sent for free-form prompt edits.
pub const PROMPT_EDIT: &str = "prompt_edit";

/// Output aspect ratio, serialized as the literal ratio string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Tall,
}

impl AspectRatio {
    pub fn all() -> [AspectRatio; 5] {
        [
            Self::Square,
            Self::Landscape,
            Self::Portrait,
            Self::Standard,
            Self::Tall,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::Tall => "3:4",
        }
    }

    /// Label shown in the ratio picker, e.g. `16:9 (Landscape)`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1 (Square)",
            Self::Landscape => "16:9 (Landscape)",
            Self::Portrait => "9:16 (Portrait)",
            Self::Standard => "4:3 (Standard)",
            Self::Tall => "3:4 (Tall)",
        }
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown aspect ratio '{s}'")))
    }
}

/// Style preset appended to the user's prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StylePreset {
    #[default]
    Photorealistic,
    Anime,
    Render3d,
    Cinematic,
    Fantasy,
    Vector,
}

impl StylePreset {
    pub fn all() -> [StylePreset; 6] {
        [
            Self::Photorealistic,
            Self::Anime,
            Self::Render3d,
            Self::Cinematic,
            Self::Fantasy,
            Self::Vector,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Photorealistic => "Photorealistic",
            Self::Anime => "Anime",
            Self::Render3d => "3D Render",
            Self::Cinematic => "Cinematic",
            Self::Fantasy => "Fantasy",
            Self::Vector => "Vector",
        }
    }

    /// Compose the prompt actually sent to the server.
    pub fn apply(self, prompt: &str) -> String {
        format!("{prompt}, {} style.", self.name())
    }
}

impl std::str::FromStr for StylePreset {
    type Err = CoreError;

    /// Case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Validation(format!("unknown style preset '{s}'")))
    }
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub params: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            params: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Body of `POST /edit`. Requires a previously uploaded input asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EditRequest {
    #[validate(length(min = 1, message = "input asset id must not be empty"))]
    pub input_asset_id: AssetId,
    #[validate(length(min = 1, message = "edit type must not be empty"))]
    pub edit_type: String,
    pub params: serde_json::Value,
}

impl EditRequest {
    /// A free-form prompt edit of `input_asset_id`.
    pub fn prompt_edit(input_asset_id: impl Into<AssetId>, prompt: &str) -> Self {
        Self {
            input_asset_id: input_asset_id.into(),
            edit_type: PROMPT_EDIT.to_string(),
            params: serde_json::json!({ "prompt": prompt }),
        }
    }
}

/// Either kind of job-creation request.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    Generate(GenerationRequest),
    Edit(EditRequest),
}

impl JobRequest {
    pub fn check(&self) -> Result<(), CoreError> {
        match self {
            Self::Generate(req) => req.validate()?,
            Self::Edit(req) => req.validate()?,
        }
        Ok(())
    }
}

impl From<GenerationRequest> for JobRequest {
    fn from(req: GenerationRequest) -> Self {
        Self::Generate(req)
    }
}

impl From<EditRequest> for JobRequest {
    fn from(req: EditRequest) -> Self {
        Self::Edit(req)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn style_is_appended_to_prompt() {
        assert_eq!(
            StylePreset::Render3d.apply("a red fox"),
            "a red fox, 3D Render style."
        );
        assert_eq!(
            StylePreset::default().apply("a red fox"),
            "a red fox, Photorealistic style."
        );
    }

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("anime".parse::<StylePreset>().unwrap(), StylePreset::Anime);
        assert_eq!("3d render".parse::<StylePreset>().unwrap(), StylePreset::Render3d);
        assert_matches!("oil".parse::<StylePreset>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn aspect_ratio_uses_literal_strings() {
        let value = serde_json::to_value(AspectRatio::Portrait).unwrap();
        assert_eq!(value, serde_json::json!("9:16"));
        assert_eq!("4:3".parse::<AspectRatio>().unwrap(), AspectRatio::Standard);
        assert!("2:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn generation_body_omits_missing_negative_prompt() {
        let req = GenerationRequest::new("a cat")
            .with_params(serde_json::json!({ "aspectRatio": AspectRatio::Square }));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"prompt": "a cat", "params": {"aspectRatio": "1:1"}})
        );

        let value = serde_json::to_value(req.with_negative_prompt("blurry")).unwrap();
        assert_eq!(value["negative_prompt"], "blurry");
    }

    #[test]
    fn prompt_edit_body() {
        let req = EditRequest::prompt_edit("a9", "make it watercolor");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "input_asset_id": "a9",
                "edit_type": "prompt_edit",
                "params": {"prompt": "make it watercolor"}
            })
        );
    }

    #[test]
    fn empty_prompt_fails_validation() {
        let req = JobRequest::from(GenerationRequest::new(""));
        assert_matches!(req.check(), Err(CoreError::Validation(_)));

        let req = JobRequest::from(EditRequest::prompt_edit("", "x"));
        assert_matches!(req.check(), Err(CoreError::Validation(_)));

        assert!(JobRequest::from(GenerationRequest::new("ok")).check().is_ok());
    }
}
