//! Shortlisting pipeline: drives one job from `processing` to a terminal state.
//!
//! Flow: begin_processing (caller's request) → spawn →
//!       phase1 shortlist → phase2 review → complete.
//!
//! The run happens in a background task. Any error or panic inside it is
//! written to the job record as status `error`; nothing is retried.

use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::jobs::registry::{JobRegistry, RegistryError};
use crate::models::job::{JobPosting, JobRecord};
use crate::models::resume::Resume;
use crate::shortlisting::phase1;
use crate::shortlisting::phase2::Phase2Reviewer;

/// Validates and starts shortlisting for a job. Returns once the job is in
/// `processing` and its task is spawned; the run itself continues in the
/// background.
pub async fn start_shortlisting(
    registry: &JobRegistry,
    reviewer: Arc<Phase2Reviewer>,
    job_id: Uuid,
) -> Result<(), RegistryError> {
    let (posting, resumes) = registry.begin_processing(job_id).await?;
    info!(
        "Starting shortlisting for job {job_id} with {} resumes",
        resumes.len()
    );
    let handle = spawn_shortlisting(registry.clone(), reviewer, job_id, posting, resumes);
    registry.attach_task(job_id, handle).await;
    Ok(())
}

fn spawn_shortlisting(
    registry: JobRegistry,
    reviewer: Arc<Phase2Reviewer>,
    job_id: Uuid,
    posting: JobPosting,
    resumes: Vec<Resume>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // inner task so a panic surfaces as a JoinError instead of killing the watcher
        let run = tokio::spawn(run_shortlisting(
            registry.clone(),
            reviewer,
            job_id,
            posting,
            resumes,
        ));

        let (message, details) = match run.await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => (e.to_string(), format!("{e:?}")),
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                (format!("pipeline panicked: {message}"), message)
            }
            Err(join_err) => (join_err.to_string(), format!("{join_err:?}")),
        };

        error!("Shortlisting failed for job {job_id}: {details}");
        let recorded = registry
            .update(job_id, |record| record.fail(message, details))
            .await;
        if let Err(e) = recorded {
            warn!("Could not record failure for job {job_id}: {e}");
        }
    })
}

async fn run_shortlisting(
    registry: JobRegistry,
    reviewer: Arc<Phase2Reviewer>,
    job_id: Uuid,
    posting: JobPosting,
    resumes: Vec<Resume>,
) -> Result<()> {
    registry
        .update(job_id, JobRecord::begin_phase1)
        .await
        .context("entering phase 1")?;

    let phase1_results = phase1::shortlist(&resumes, &posting, posting.phase1_shortlist_count);
    info!(
        "Phase 1 for job {job_id}: {} of {} resumes shortlisted",
        phase1_results.len(),
        resumes.len()
    );

    let recorded = phase1_results.clone();
    registry
        .update(job_id, move |record| record.finish_phase1(recorded))
        .await
        .context("recording phase 1 results")?;

    registry
        .update(job_id, JobRecord::begin_phase2)
        .await
        .context("entering phase 2")?;

    let shortlisted = reviewer
        .shortlist(&phase1_results, &posting, posting.phase2_shortlist_count)
        .await;
    let count = shortlisted.len();

    registry
        .update(job_id, move |record| record.complete(shortlisted))
        .await
        .context("recording final shortlist")?;

    info!("Shortlisting completed for job {job_id}: {count} candidates");
    Ok(())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
