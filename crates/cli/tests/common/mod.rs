//! Recording [`JobApi`] fake for the page controller tests.
//!
//! Every created job gets the id `job-<n>`. Each job's first status check
//! reports it completed with asset `asset-<n>`, unless the fake was told to
//! fail jobs.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use banana_client::{JobApi, RequestError};
use banana_core::types::AssetId;
use banana_core::{Asset, EditRequest, GenerationRequest, Job, JobStatus};

pub fn dyn_api(api: &Arc<FakeApi>) -> Arc<dyn JobApi> {
    Arc::clone(api) as Arc<dyn JobApi>
}

#[derive(Default)]
pub struct FakeApi {
    pub generations: Mutex<Vec<GenerationRequest>>,
    pub edits: Mutex<Vec<EditRequest>>,
    pub uploads: Mutex<Vec<String>>,
    fail_upload: Option<(u16, String)>,
    /// `Some(reason)` fails every job; an empty reason omits `error`.
    fail_jobs: Option<String>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upload(mut self, status: u16, message: &str) -> Self {
        self.fail_upload = Some((status, message.to_string()));
        self
    }

    pub fn failing_jobs(mut self, reason: &str) -> Self {
        self.fail_jobs = Some(reason.to_string());
        self
    }

    fn next_job(&self) -> Job {
        let n = self.generations.lock().unwrap().len() + self.edits.lock().unwrap().len();
        Job {
            id: format!("job-{n}"),
            status: JobStatus::Pending,
            error: None,
            output_asset_id: None,
        }
    }
}

#[async_trait]
impl JobApi for FakeApi {
    async fn create_generation_job(
        &self,
        request: &GenerationRequest,
    ) -> Result<Job, RequestError> {
        self.generations.lock().unwrap().push(request.clone());
        Ok(self.next_job())
    }

    async fn create_edit_job(&self, request: &EditRequest) -> Result<Job, RequestError> {
        self.edits.lock().unwrap().push(request.clone());
        Ok(self.next_job())
    }

    async fn upload_asset(
        &self,
        _bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<AssetId, RequestError> {
        if let Some((status, message)) = &self.fail_upload {
            return Err(RequestError::api(*status, message.clone()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(file_name.to_string());
        Ok(format!("upload-{}", uploads.len()))
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, RequestError> {
        let n = job_id.trim_start_matches("job-");
        let job = match &self.fail_jobs {
            Some(reason) => Job {
                id: job_id.to_string(),
                status: JobStatus::Failed,
                error: Some(reason.clone()).filter(|r| !r.is_empty()),
                output_asset_id: None,
            },
            None => Job {
                id: job_id.to_string(),
                status: JobStatus::Completed,
                error: None,
                output_asset_id: Some(format!("asset-{n}")),
            },
        };
        Ok(job)
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Asset, RequestError> {
        Ok(Asset {
            id: asset_id.to_string(),
            url: format!("https://cdn/{asset_id}.png"),
        })
    }
}
