//! Phase 2: qualitative LLM review of the Phase 1 shortlist.
//!
//! Candidates are reviewed one at a time, in Phase 1 order. Each review is
//! contained: a failed call drops that candidate and the loop moves on.
//! Unreadable model output is accepted at 0.5 confidence with a templated
//! cover letter instead of being treated as a failure.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{strip_json_fences, CompletionClient, LlmError};
use crate::models::job::JobPosting;
use crate::models::resume::{Resume, ShortlistedCandidate};
use crate::shortlisting::prompts::{
    render_template, FALLBACK_COVER_LETTER_TEMPLATE, REVIEW_PROMPT_TEMPLATE,
};

/// Resume text beyond this many characters is left out of the prompt.
pub const RESUME_EXCERPT_CHARS: usize = 1500;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_SKILL_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("completion call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("verdict has an unexpected shape: {0}")]
    MalformedVerdict(serde_json::Error),

    #[error("confidence is not a number: {0}")]
    BadConfidence(String),
}

/// The JSON object the model is asked to return.
#[derive(Debug, Deserialize)]
pub struct ReviewVerdict {
    #[serde(default)]
    pub is_suitable: bool,
    #[serde(default)]
    pub confidence: Option<RawConfidence>,
    /// Logged only.
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub cover_letter: String,
}

/// Models sometimes quote the number, so `"0.8"` is read like `0.8`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawConfidence {
    Number(f64),
    Text(String),
}

impl RawConfidence {
    fn value(&self) -> Result<f64, ReviewError> {
        let parsed = match self {
            RawConfidence::Number(v) => Some(*v),
            RawConfidence::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| ReviewError::BadConfidence(format!("{self:?}")))
    }
}

pub struct Phase2Reviewer {
    llm: Arc<dyn CompletionClient>,
}

impl Phase2Reviewer {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Reviews every candidate sequentially, then keeps the `target_count`
    /// most confident, best first.
    pub async fn shortlist(
        &self,
        resumes: &[Resume],
        posting: &JobPosting,
        target_count: usize,
    ) -> Vec<ShortlistedCandidate> {
        info!(
            "Phase 2: starting LLM review of {} candidates (model: {})",
            resumes.len(),
            self.llm.model()
        );

        let total = resumes.len();
        let mut shortlisted = Vec::new();

        for (idx, resume) in resumes.iter().enumerate() {
            info!("[{}/{}] Reviewing {}", idx + 1, total, resume.name);
            match self.review_resume(resume, posting).await {
                Ok(Some(candidate)) => {
                    info!(
                        "[{}/{}] Shortlisted {} with confidence {:.2}",
                        idx + 1,
                        total,
                        candidate.name,
                        candidate.confidence
                    );
                    shortlisted.push(candidate);
                }
                Ok(None) => info!("[{}/{}] {} not suitable", idx + 1, total, resume.name),
                Err(e) => warn!(
                    "[{}/{}] Skipping {}: {e}{}",
                    idx + 1,
                    total,
                    resume.name,
                    match &e {
                        ReviewError::Llm(llm) if llm.is_timeout() => " (timed out)",
                        _ => "",
                    }
                ),
            }
        }

        info!(
            "Phase 2: completed, {} of {} candidates accepted",
            shortlisted.len(),
            total
        );

        rank_candidates(shortlisted, target_count)
    }

    /// One completion call for one candidate. `Ok(None)` means the model
    /// judged the candidate unsuitable.
    pub async fn review_resume(
        &self,
        resume: &Resume,
        posting: &JobPosting,
    ) -> Result<Option<ShortlistedCandidate>, ReviewError> {
        let prompt = build_review_prompt(resume, posting);
        let generated = self.llm.generate(&prompt).await?;
        parse_verdict(&generated, resume)
    }
}

/// Stable sort by confidence, best first, then truncate.
fn rank_candidates(
    mut candidates: Vec<ShortlistedCandidate>,
    target_count: usize,
) -> Vec<ShortlistedCandidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates.truncate(target_count);
    candidates
}

pub fn build_review_prompt(resume: &Resume, posting: &JobPosting) -> String {
    let excerpt: String = resume.text_content.chars().take(RESUME_EXCERPT_CHARS).collect();
    let experience = resume
        .experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Not specified".to_string());

    let tech_stack = posting.required_tech_stack.join(", ");
    let minimum_experience = posting.minimum_experience.to_string();
    let skills = resume.skills.join(", ");

    render_template(
        REVIEW_PROMPT_TEMPLATE,
        &[
            ("job_title", posting.job_title.as_str()),
            ("description", posting.description.as_str()),
            ("tech_stack", tech_stack.as_str()),
            ("minimum_experience", minimum_experience.as_str()),
            ("name", resume.name.as_str()),
            ("email", resume.email.as_deref().unwrap_or("Not provided")),
            ("skills", skills.as_str()),
            ("experience", experience.as_str()),
            ("resume_text", excerpt.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// Turns generated text into a shortlist decision.
///
/// - not JSON at all → fallback acceptance
/// - JSON that doesn't fit `ReviewVerdict`, or a confidence that isn't a
///   number → error, candidate skipped
/// - `is_suitable: false` → `None`
pub fn parse_verdict(
    generated: &str,
    resume: &Resume,
) -> Result<Option<ShortlistedCandidate>, ReviewError> {
    let value: serde_json::Value = match serde_json::from_str(strip_json_fences(generated)) {
        Ok(v) => v,
        Err(e) => {
            let preview: String = generated.chars().take(200).collect();
            warn!(
                "Unreadable verdict for {} ({e}), accepting at {FALLBACK_CONFIDENCE}: {preview}",
                resume.name
            );
            return Ok(Some(fallback_candidate(resume)));
        }
    };

    let verdict: ReviewVerdict =
        serde_json::from_value(value).map_err(ReviewError::MalformedVerdict)?;

    let confidence = match &verdict.confidence {
        Some(raw) => raw.value()?,
        None => FALLBACK_CONFIDENCE,
    };

    info!(
        "LLM decision for {}: is_suitable={}, confidence={:.2}, reasoning={}",
        resume.name, verdict.is_suitable, confidence, verdict.reasoning
    );

    if !verdict.is_suitable {
        return Ok(None);
    }

    Ok(Some(ShortlistedCandidate::from_resume(
        resume,
        confidence.clamp(0.0, 1.0),
        verdict.cover_letter,
    )))
}

fn fallback_candidate(resume: &Resume) -> ShortlistedCandidate {
    let skills = resume
        .skills
        .iter()
        .take(FALLBACK_SKILL_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let cover_letter =
        render_template(FALLBACK_COVER_LETTER_TEMPLATE, &[("skills", skills.as_str())]);
    ShortlistedCandidate::from_resume(resume, FALLBACK_CONFIDENCE, cover_letter)
}
