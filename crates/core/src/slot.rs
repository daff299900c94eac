//! Client-local view model for one requested unit of work.
//!
//! Each variant carries exactly the data its status allows, so a slot is
//! `completed` iff it holds an image URL and `failed` iff it holds error
//! text.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Display status of a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Idle,
    Loading,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Slot {
    /// No job has been requested for this slot yet.
    #[default]
    Idle,
    /// Work requested. `job_id` is `None` while the creation call is in
    /// flight.
    Loading {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
    },
    Completed {
        job_id: JobId,
        image_url: String,
    },
    /// `job_id` is `None` when job creation itself failed.
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        error: String,
    },
}

impl Slot {
    pub fn loading() -> Self {
        Self::Loading { job_id: None }
    }

    pub fn status(&self) -> SlotStatus {
        match self {
            Self::Idle => SlotStatus::Idle,
            Self::Loading { .. } => SlotStatus::Loading,
            Self::Completed { .. } => SlotStatus::Completed,
            Self::Failed { .. } => SlotStatus::Failed,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { job_id } | Self::Failed { job_id, .. } => job_id.as_deref(),
            Self::Completed { job_id, .. } => Some(job_id),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Completed { image_url, .. } => Some(image_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_slot_is_idle() {
        let slot = Slot::default();
        assert_eq!(slot.status(), SlotStatus::Idle);
        assert!(slot.job_id().is_none());
        assert!(!slot.is_terminal());
    }

    #[test]
    fn completed_slot_exposes_url_but_no_error() {
        let slot = Slot::Completed {
            job_id: "j1".into(),
            image_url: "https://x/a1.png".into(),
        };
        assert_eq!(slot.status(), SlotStatus::Completed);
        assert_eq!(slot.image_url(), Some("https://x/a1.png"));
        assert_eq!(slot.job_id(), Some("j1"));
        assert!(slot.error().is_none());
        assert!(slot.is_terminal());
    }

    #[test]
    fn failed_creation_has_no_job_id() {
        let slot = Slot::Failed {
            job_id: None,
            error: "rate limited".into(),
        };
        assert_eq!(slot.error(), Some("rate limited"));
        assert!(slot.job_id().is_none());
        assert!(slot.image_url().is_none());
    }

    #[test]
    fn serializes_with_status_tag() {
        let slot = Slot::Failed {
            job_id: Some("j2".into()),
            error: "nsfw content detected".into(),
        };
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "failed", "job_id": "j2", "error": "nsfw content detected"})
        );

        let loading = serde_json::to_value(Slot::loading()).unwrap();
        assert_eq!(loading, serde_json::json!({"status": "loading"}));
    }

    #[test]
    fn parses_completed_slot() {
        let slot: Slot = serde_json::from_str(
            r#"{"status":"completed","job_id":"j1","image_url":"https://x/a1.png"}"#,
        )
        .unwrap();
        assert_matches!(slot, Slot::Completed { ref image_url, .. } if image_url == "https://x/a1.png");
    }
}
