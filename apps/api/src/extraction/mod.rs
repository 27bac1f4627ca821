// Resume extraction: one uploaded PDF in, one `Resume` per non-blank page out.
// PDF text extraction is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod parser;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::resume::Resume;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("'{0}' is not a PDF file")]
    NotPdf(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One stored upload and the resumes read from it.
#[derive(Debug)]
pub struct UploadedBatch {
    pub path: PathBuf,
    pub resumes: Vec<Resume>,
}

/// Stores uploads under `upload_dir` and splits them into per-page resumes.
#[derive(Debug, Clone)]
pub struct ResumeExtractor {
    upload_dir: PathBuf,
}

impl ResumeExtractor {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    /// Saves the upload as `<upload_dir>/<job_id>_<file name>` and extracts it.
    /// Nothing about the job is touched here; the caller records the result.
    /// A file that fails extraction is removed again.
    pub async fn ingest_upload(
        &self,
        job_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedBatch, ExtractionError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ExtractionError::NotPdf(filename.to_string()));
        }

        let path = self.save_upload(job_id, filename, &bytes).await?;

        let source = path.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_resumes(&bytes, &source))
            .await
            .map_err(|e| ExtractionError::Pdf(format!("extraction aborted: {e}")))
            .and_then(|result| result);

        let resumes = match extracted {
            Ok(resumes) => resumes,
            Err(e) => {
                self.discard_upload(&path).await;
                return Err(e);
            }
        };

        info!(
            "Extracted {} resumes from {}",
            resumes.len(),
            path.display()
        );
        Ok(UploadedBatch { path, resumes })
    }

    /// Removes a stored upload that no job ended up referencing.
    pub async fn discard_upload(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Removed unused upload {}", path.display()),
            Err(e) => warn!("Could not remove unused upload {}: {e}", path.display()),
        }
    }

    async fn save_upload(
        &self,
        job_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, ExtractionError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self
            .upload_dir
            .join(format!("{job_id}_{}", sanitize_filename(filename)));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// Splits PDF bytes into pages and parses each page as a separate resume.
/// Blank pages are dropped.
pub fn extract_resumes(pdf_bytes: &[u8], source: &Path) -> Result<Vec<Resume>, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    Ok(resumes_from_pages(&pages, source))
}

fn resumes_from_pages(pages: &[String], source: &Path) -> Vec<Resume> {
    pages
        .iter()
        .enumerate()
        .filter_map(|(idx, text)| {
            let cv_path = format!("{}#page={}", source.display(), idx + 1);
            let parsed = parser::parse_resume_text(text, cv_path);
            if parsed.is_none() {
                warn!("Skipping page {} of {}: no usable text", idx + 1, source.display());
            }
            parsed
        })
        .collect()
}

/// Keeps only the final path component so uploads cannot escape `upload_dir`.
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload.pdf")
        .to_string()
}
