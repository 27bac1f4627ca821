//! Job postings and the run state machine that carries them through shortlisting.
//!
//! ```text
//! pending → uploaded → processing → phase1 → phase2 → completed
//!                          └──────────┴────────┴──→ error
//! ```
//!
//! Every mutation goes through a `JobRecord` method that checks the transition
//! first, so a rejected call leaves the record untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::{Resume, ShortlistedCandidate};

/// Immutable description of the role being hired for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_title: String,
    pub description: String,
    pub required_tech_stack: Vec<String>,
    pub minimum_experience: u32,
    pub hiring_slots: u32,
    pub phase1_shortlist_count: usize,
    pub phase2_shortlist_count: usize,
}

impl JobPosting {
    /// Rejects postings the pipeline cannot do anything useful with.
    pub fn validate(&self) -> Result<(), String> {
        if self.job_title.trim().is_empty() {
            return Err("job_title cannot be empty".to_string());
        }
        if self.phase1_shortlist_count == 0 {
            return Err("phase1_shortlist_count must be at least 1".to_string());
        }
        if self.phase2_shortlist_count == 0 {
            return Err("phase2_shortlist_count must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Uploaded,
    Processing,
    Phase1,
    Phase2,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Phase1 => "phase1",
            JobStatus::Phase2 => "phase2",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// True while a pipeline task owns the record.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            JobStatus::Processing | JobStatus::Phase1 | JobStatus::Phase2
        )
    }

    /// `uploaded → uploaded` is allowed so several PDFs can be added before starting.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Pending | Uploaded, Uploaded) => true,
            (Uploaded, Processing) => true,
            (Processing, Phase1) => true,
            (Phase1, Phase2) => true,
            (Phase2, Completed) => true,
            (from, Error) => from.is_running(),
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job is '{from}' and cannot move to '{to}'")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Everything the service knows about one job. Snapshots of this are what
/// status readers see.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub job_posting: JobPosting,
    pub total_resumes: usize,
    pub resumes_in_review: usize,
    pub phase1_completed: usize,
    pub phase2_completed: usize,
    pub shortlisted_count: usize,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub phase1_results: Vec<Resume>,
    pub shortlisted: Vec<ShortlistedCandidate>,
    pub error: Option<String>,
    pub error_details: Option<String>,
}

impl JobRecord {
    pub fn new(job_posting: JobPosting) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_posting,
            total_resumes: 0,
            resumes_in_review: 0,
            phase1_completed: 0,
            phase2_completed: 0,
            shortlisted_count: 0,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            phase1_results: Vec::new(),
            shortlisted: Vec::new(),
            error: None,
            error_details: None,
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Records the running resume total after an upload finished extracting.
    pub fn record_upload(&mut self, total_resumes: usize) -> Result<(), TransitionError> {
        self.transition(JobStatus::Uploaded)?;
        self.total_resumes = total_resumes;
        self.resumes_in_review = total_resumes;
        Ok(())
    }

    pub fn begin_processing(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Processing)
    }

    pub fn begin_phase1(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Phase1)
    }

    pub fn finish_phase1(&mut self, results: Vec<Resume>) -> Result<(), TransitionError> {
        if self.status != JobStatus::Phase1 {
            return Err(TransitionError {
                from: self.status,
                to: JobStatus::Phase1,
            });
        }
        self.phase1_completed = results.len().min(self.total_resumes);
        self.resumes_in_review = self.phase1_completed;
        self.phase1_results = results;
        Ok(())
    }

    pub fn begin_phase2(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Phase2)
    }

    pub fn complete(&mut self, shortlist: Vec<ShortlistedCandidate>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Completed)?;
        self.phase2_completed = shortlist.len().min(self.phase1_completed);
        self.shortlisted_count = self.phase2_completed;
        self.resumes_in_review = 0;
        self.shortlisted = shortlist;
        Ok(())
    }

    pub fn fail(&mut self, error: String, details: String) -> Result<(), TransitionError> {
        self.transition(JobStatus::Error)?;
        self.error = Some(error);
        self.error_details = Some(details);
        Ok(())
    }
}

/// Wire shape of `GET /api/jobs/:job_id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: Uuid,
    pub job_title: String,
    pub total_resumes: usize,
    pub resumes_in_review: usize,
    pub phase1_completed: usize,
    pub phase2_completed: usize,
    pub shortlisted_count: usize,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl From<&JobRecord> for JobStatusView {
    fn from(record: &JobRecord) -> Self {
        Self {
            job_id: record.id,
            job_title: record.job_posting.job_title.clone(),
            total_resumes: record.total_resumes,
            resumes_in_review: record.resumes_in_review,
            phase1_completed: record.phase1_completed,
            phase2_completed: record.phase2_completed,
            shortlisted_count: record.shortlisted_count,
            status: record.status,
            created_at: record.created_at,
            error: record.error.clone(),
        }
    }
}

/// One row of `GET /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub job_title: String,
    pub status: JobStatus,
    pub total_resumes: usize,
    pub shortlisted_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&JobRecord> for JobSummary {
    fn from(record: &JobRecord) -> Self {
        Self {
            job_id: record.id,
            job_title: record.job_posting.job_title.clone(),
            status: record.status,
            total_resumes: record.total_resumes,
            shortlisted_count: record.shortlisted_count,
            created_at: record.created_at,
        }
    }
}
