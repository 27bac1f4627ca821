//! In-process job registry.
//!
//! One entry per job: the `JobRecord`, the resumes uploaded for it, and the
//! handle of its pipeline task once started. Entries live for the process
//! lifetime. The lock is only held for single-record updates and is never
//! held across an LLM call.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::job::{JobPosting, JobRecord, JobStatus, TransitionError};
use crate::models::resume::Resume;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("no resumes uploaded for this job")]
    NoResumes,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

struct JobEntry {
    record: JobRecord,
    resumes: Vec<Resume>,
    task: Option<JoinHandle<()>>,
}

#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, posting: JobPosting) -> JobRecord {
        let record = JobRecord::new(posting);
        let snapshot = record.clone();
        self.inner.write().await.insert(
            record.id,
            JobEntry {
                record,
                resumes: Vec::new(),
                task: None,
            },
        );
        snapshot
    }

    /// Snapshot of one record.
    pub async fn get(&self, job_id: Uuid) -> Result<JobRecord, RegistryError> {
        self.inner
            .read()
            .await
            .get(&job_id)
            .map(|entry| entry.record.clone())
            .ok_or(RegistryError::JobNotFound(job_id))
    }

    /// Snapshots of every record, oldest first.
    pub async fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self
            .inner
            .read()
            .await
            .values()
            .map(|entry| entry.record.clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    pub async fn resumes(&self, job_id: Uuid) -> Result<Vec<Resume>, RegistryError> {
        self.inner
            .read()
            .await
            .get(&job_id)
            .map(|entry| entry.resumes.clone())
            .ok_or(RegistryError::JobNotFound(job_id))
    }

    /// Fails fast before an upload is processed, so extraction work isn't
    /// wasted on a job that can't accept it.
    pub async fn ensure_accepts_upload(&self, job_id: Uuid) -> Result<(), RegistryError> {
        let record = self.get(job_id).await?;
        let next = JobStatus::Uploaded;
        if !record.status.can_transition_to(next) {
            return Err(TransitionError {
                from: record.status,
                to: next,
            }
            .into());
        }
        Ok(())
    }

    /// Appends extracted resumes and returns the new total.
    pub async fn add_resumes(
        &self,
        job_id: Uuid,
        resumes: Vec<Resume>,
    ) -> Result<usize, RegistryError> {
        let mut jobs = self.inner.write().await;
        let entry = jobs
            .get_mut(&job_id)
            .ok_or(RegistryError::JobNotFound(job_id))?;
        let total = entry.resumes.len() + resumes.len();
        entry.record.record_upload(total)?;
        entry.resumes.extend(resumes);
        Ok(total)
    }

    /// Moves a job to `processing` and hands back what the pipeline needs.
    /// Nothing changes if the job has no resumes or is not in `uploaded`.
    pub async fn begin_processing(
        &self,
        job_id: Uuid,
    ) -> Result<(JobPosting, Vec<Resume>), RegistryError> {
        let mut jobs = self.inner.write().await;
        let entry = jobs
            .get_mut(&job_id)
            .ok_or(RegistryError::JobNotFound(job_id))?;
        if entry.resumes.is_empty() {
            return Err(RegistryError::NoResumes);
        }
        entry.record.begin_processing()?;
        Ok((entry.record.job_posting.clone(), entry.resumes.clone()))
    }

    /// Applies one mutation to a record under the write lock.
    pub async fn update<T, F>(&self, job_id: Uuid, apply: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut JobRecord) -> Result<T, TransitionError>,
    {
        let mut jobs = self.inner.write().await;
        let entry = jobs
            .get_mut(&job_id)
            .ok_or(RegistryError::JobNotFound(job_id))?;
        Ok(apply(&mut entry.record)?)
    }

    pub async fn attach_task(&self, job_id: Uuid, handle: JoinHandle<()>) {
        if let Some(entry) = self.inner.write().await.get_mut(&job_id) {
            entry.task = Some(handle);
        }
    }

    /// Removes and returns the pipeline handle so a caller can await it.
    #[allow(dead_code)] // only joined from tests; the server never waits on a pipeline
    pub async fn take_task(&self, job_id: Uuid) -> Option<JoinHandle<()>> {
        self.inner
            .write()
            .await
            .get_mut(&job_id)
            .and_then(|entry| entry.task.take())
    }
}
