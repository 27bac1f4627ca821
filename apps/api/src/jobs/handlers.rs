//! Axum route handlers for the Job API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::UploadedBatch;
use crate::models::job::{JobPosting, JobStatus, JobStatusView, JobSummary};
use crate::models::resume::{ResumeSummary, ShortlistedCandidate};
use crate::shortlisting::pipeline::start_shortlisting;
use crate::state::AppState;
use crate::tools::{execute_tool, tool_definitions, ToolDefinition};

/// Multipart field carrying the PDF.
const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
    pub message: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub total_resumes: usize,
    /// Ids of the resumes added by this upload.
    pub resume_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeListResponse {
    pub job_id: Uuid,
    pub resumes: Vec<ResumeSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub message: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortlistedResponse {
    pub job_id: Uuid,
    pub job_title: String,
    pub status: JobStatus,
    pub shortlisted: Vec<ShortlistedCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDefinition>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/jobs/create
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(posting): Json<JobPosting>,
) -> Result<Json<CreateJobResponse>, AppError> {
    posting.validate().map_err(AppError::Validation)?;

    let record = state.jobs.create(posting).await;
    info!(
        "Created job {} ({})",
        record.id, record.job_posting.job_title
    );

    Ok(Json(CreateJobResponse {
        job_id: record.id,
        message: "Job created successfully".to_string(),
        status: record.status,
    }))
}

/// POST /api/jobs/:job_id/upload-resumes
///
/// Accepts one multi-page PDF; every non-blank page becomes a resume.
/// The job is left untouched if the file cannot be read.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    state.jobs.ensure_accepts_upload(job_id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resumes.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{UPLOAD_FIELD}'"))
    })?;

    let batch = state
        .extractor
        .ingest_upload(job_id, &filename, bytes)
        .await?;
    let extracted = batch.resumes.len();
    let resume_ids: Vec<Uuid> = batch.resumes.iter().map(|r| r.id).collect();
    let total_resumes = commit_upload(&state, job_id, batch).await?;

    info!("Job {job_id}: {extracted} resumes from {filename}, {total_resumes} total");

    Ok(Json(UploadResponse {
        message: format!("Uploaded and processed {extracted} resumes"),
        total_resumes,
        resume_ids,
    }))
}

/// Records an extracted batch on the job. If the job stopped accepting
/// uploads while extraction ran, the stored file is removed.
async fn commit_upload(
    state: &AppState,
    job_id: Uuid,
    batch: UploadedBatch,
) -> Result<usize, AppError> {
    let UploadedBatch { path, resumes } = batch;
    match state.jobs.add_resumes(job_id, resumes).await {
        Ok(total) => Ok(total),
        Err(e) => {
            state.extractor.discard_upload(&path).await;
            Err(e.into())
        }
    }
}

/// POST /api/jobs/:job_id/start-shortlisting
///
/// Returns as soon as the pipeline is running; poll the status endpoint.
pub async fn handle_start_shortlisting(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StartResponse>, AppError> {
    start_shortlisting(&state.jobs, state.reviewer.clone(), job_id).await?;

    Ok(Json(StartResponse {
        message: "Shortlisting process started".to_string(),
        status: JobStatus::Processing,
    }))
}

/// GET /api/jobs/:job_id/status
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusView>, AppError> {
    let record = state.jobs.get(job_id).await?;
    Ok(Json(JobStatusView::from(&record)))
}

/// GET /api/jobs/:job_id/shortlisted
pub async fn handle_shortlisted(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ShortlistedResponse>, AppError> {
    let record = state.jobs.get(job_id).await?;
    Ok(Json(ShortlistedResponse {
        job_id: record.id,
        job_title: record.job_posting.job_title,
        status: record.status,
        shortlisted: record.shortlisted,
    }))
}

/// GET /api/jobs/:job_id/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.jobs.resumes(job_id).await?;
    Ok(Json(ResumeListResponse {
        job_id,
        resumes: resumes.iter().map(ResumeSummary::from).collect(),
    }))
}

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    let jobs = state.jobs.list().await;
    Json(JobListResponse {
        jobs: jobs.iter().map(JobSummary::from).collect(),
    })
}

/// GET /api/mcp/tools
pub async fn handle_list_tools() -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: tool_definitions(),
    })
}

/// POST /api/jobs/:job_id/tools/:tool_name
pub async fn handle_execute_tool(
    State(state): State<AppState>,
    Path((job_id, tool_name)): Path<(Uuid, String)>,
    Json(params): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let resumes = state.jobs.resumes(job_id).await?;
    let result = execute_tool(&tool_name, params, &resumes)?;
    Ok(Json(result))
}
