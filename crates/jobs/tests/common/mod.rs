//! Scripted in-memory [`JobApi`] shared by the poller and orchestrator
//! tests.
//!
//! Generation jobs are created with `id == prompt`, so a test scripts a
//! job's status sequence under the same string it used as the prompt.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use banana_client::{JobApi, RequestError};
use banana_core::types::AssetId;
use banana_core::{Asset, EditRequest, GenerationRequest, Job, JobStatus};
use tokio::sync::Notify;

pub type Scripted<T> = Result<T, (u16, String)>;

/// Pauses `get_job` for one job until the test releases it.
pub struct Gate {
    /// Notified when the gated request is in flight.
    pub entered: Arc<Notify>,
    /// Notify to let the gated request complete.
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub struct ScriptedApi {
    creation_failures: HashMap<String, (u16, String)>,
    statuses: Mutex<HashMap<String, VecDeque<Scripted<Job>>>>,
    assets: HashMap<String, Scripted<Asset>>,
    gates: HashMap<String, (Arc<Notify>, Arc<Notify>)>,
    job_checks: Mutex<HashMap<String, usize>>,
    asset_fetches: AtomicUsize,
    creations: AtomicUsize,
    uploads: AtomicUsize,
}

pub fn pending(id: &str) -> Scripted<Job> {
    Ok(job(id, JobStatus::Pending, None, None))
}

pub fn processing(id: &str) -> Scripted<Job> {
    Ok(job(id, JobStatus::Processing, None, None))
}

pub fn completed(id: &str, asset_id: &str) -> Scripted<Job> {
    Ok(job(id, JobStatus::Completed, None, Some(asset_id)))
}

pub fn completed_without_output(id: &str) -> Scripted<Job> {
    Ok(job(id, JobStatus::Completed, None, None))
}

pub fn failed(id: &str, error: Option<&str>) -> Scripted<Job> {
    Ok(job(id, JobStatus::Failed, error, None))
}

pub fn http_error(status: u16, message: &str) -> Scripted<Job> {
    Err((status, message.to_string()))
}

fn job(id: &str, status: JobStatus, error: Option<&str>, asset: Option<&str>) -> Job {
    Job {
        id: id.to_string(),
        status,
        error: error.map(str::to_string),
        output_asset_id: asset.map(str::to_string),
    }
}

/// Upcast for APIs that take the trait object.
pub fn dyn_api(api: &Arc<ScriptedApi>) -> Arc<dyn JobApi> {
    Arc::clone(api) as Arc<dyn JobApi>
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject creation of the job whose prompt is `prompt`.
    pub fn fail_creation(mut self, prompt: &str, status: u16, message: &str) -> Self {
        self.creation_failures
            .insert(prompt.to_string(), (status, message.to_string()));
        self
    }

    /// Successive `get_job` responses. The last one repeats forever; a job
    /// with no script stays pending.
    pub fn statuses(self, job_id: &str, script: impl IntoIterator<Item = Scripted<Job>>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(job_id.to_string(), script.into_iter().collect());
        self
    }

    pub fn asset(mut self, asset_id: &str, url: &str) -> Self {
        self.assets.insert(
            asset_id.to_string(),
            Ok(Asset {
                id: asset_id.to_string(),
                url: url.to_string(),
            }),
        );
        self
    }

    pub fn missing_asset(mut self, asset_id: &str) -> Self {
        self.assets
            .insert(asset_id.to_string(), Err((404, "Asset not found".into())));
        self
    }

    pub fn gate(&mut self, job_id: &str) -> Gate {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.gates.insert(
            job_id.to_string(),
            (Arc::clone(&entered), Arc::clone(&release)),
        );
        Gate { entered, release }
    }

    pub fn job_checks(&self, job_id: &str) -> usize {
        self.job_checks
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn asset_fetches(&self) -> usize {
        self.asset_fetches.load(Ordering::SeqCst)
    }

    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    fn create(&self, key: &str) -> Result<Job, RequestError> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        match self.creation_failures.get(key) {
            Some((status, message)) => Err(RequestError::api(*status, message.clone())),
            None => Ok(job(key, JobStatus::Pending, None, None)),
        }
    }

    fn next_status(&self, job_id: &str) -> Scripted<Job> {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.get_mut(job_id) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap_or_else(|| pending(job_id)),
            None => pending(job_id),
        }
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn create_generation_job(
        &self,
        request: &GenerationRequest,
    ) -> Result<Job, RequestError> {
        self.create(&request.prompt)
    }

    async fn create_edit_job(&self, request: &EditRequest) -> Result<Job, RequestError> {
        self.create(&request.input_asset_id)
    }

    async fn upload_asset(
        &self,
        _bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<AssetId, RequestError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("upload-{file_name}"))
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, RequestError> {
        *self
            .job_checks
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default() += 1;

        if let Some((entered, release)) = self.gates.get(job_id) {
            entered.notify_one();
            release.notified().await;
        }

        self.next_status(job_id)
            .map_err(|(status, message)| RequestError::api(status, message))
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Asset, RequestError> {
        self.asset_fetches.fetch_add(1, Ordering::SeqCst);
        match self.assets.get(asset_id) {
            Some(Ok(asset)) => Ok(asset.clone()),
            Some(Err((status, message))) => Err(RequestError::api(*status, message.clone())),
            None => Err(RequestError::api(404, "Asset not found")),
        }
    }
}
