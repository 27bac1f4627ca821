use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One candidate extracted from a single PDF page. Never mutated after upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub skills: Vec<String>,
    /// Years of experience, when the text states it.
    pub experience: Option<u32>,
    /// Upload path plus page anchor, e.g. `uploads/<job>_batch.pdf#page=3`.
    pub cv_path: String,
    pub text_content: String,
}

/// Listing view of a resume, without the page text. The `id` is what the
/// resume tools take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub cv_path: String,
    pub skills: Vec<String>,
    pub experience: Option<u32>,
}

impl From<&Resume> for ResumeSummary {
    fn from(resume: &Resume) -> Self {
        Self {
            id: resume.id,
            name: resume.name.clone(),
            email: resume.email.clone(),
            cv_path: resume.cv_path.clone(),
            skills: resume.skills.clone(),
            experience: resume.experience,
        }
    }
}

/// A candidate that survived the LLM review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistedCandidate {
    pub resume_id: Uuid,
    pub name: String,
    /// 0.0 – 1.0
    pub confidence: f64,
    pub email: Option<String>,
    pub cv_path: String,
    pub skills: Vec<String>,
    pub experience: Option<u32>,
    pub cover_letter: String,
}

impl ShortlistedCandidate {
    pub fn from_resume(resume: &Resume, confidence: f64, cover_letter: String) -> Self {
        Self {
            resume_id: resume.id,
            name: resume.name.clone(),
            confidence,
            email: resume.email.clone(),
            cv_path: resume.cv_path.clone(),
            skills: resume.skills.clone(),
            experience: resume.experience,
            cover_letter,
        }
    }
}
