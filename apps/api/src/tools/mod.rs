//! Resume tool catalog.
//!
//! Four read-only tools over a job's extracted resumes, published with JSON
//! schemas so an agent can discover them. The shortlisting pipeline never calls
//! these; they are served through the API only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::Resume;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Resume {0} not found")]
    ResumeNotFound(Uuid),

    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn resume_id_schema() -> Value {
    json!({
        "type": "string",
        "description": "The unique identifier of the resume"
    })
}

fn single_resume_parameters() -> Value {
    json!({
        "type": "object",
        "properties": { "resume_id": resume_id_schema() },
        "required": ["resume_id"]
    })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_resume_content",
            description: "Get the full text content of a resume",
            parameters: single_resume_parameters(),
        },
        ToolDefinition {
            name: "extract_skills",
            description: "Extract and list all skills from a resume",
            parameters: single_resume_parameters(),
        },
        ToolDefinition {
            name: "check_experience",
            description: "Check the years of experience mentioned in a resume",
            parameters: single_resume_parameters(),
        },
        ToolDefinition {
            name: "match_requirements",
            description: "Match resume skills and experience against job requirements",
            parameters: json!({
                "type": "object",
                "properties": {
                    "resume_id": resume_id_schema(),
                    "required_skills": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of required skills for the job"
                    },
                    "min_experience": {
                        "type": "integer",
                        "description": "Minimum years of experience required"
                    }
                },
                "required": ["resume_id", "required_skills", "min_experience"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct ResumeRef {
    resume_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct MatchParams {
    resume_id: Uuid,
    required_skills: Vec<String>,
    min_experience: u32,
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

fn find_resume(resumes: &[Resume], resume_id: Uuid) -> Result<&Resume, ToolError> {
    resumes
        .iter()
        .find(|r| r.id == resume_id)
        .ok_or(ToolError::ResumeNotFound(resume_id))
}

/// Runs one tool against the given resumes.
pub fn execute_tool(name: &str, params: Value, resumes: &[Resume]) -> Result<Value, ToolError> {
    match name {
        "get_resume_content" => {
            let p: ResumeRef = parse_params(params)?;
            let resume = find_resume(resumes, p.resume_id)?;
            Ok(json!({
                "content": resume.text_content,
                "name": resume.name,
                "email": resume.email,
            }))
        }
        "extract_skills" => {
            let p: ResumeRef = parse_params(params)?;
            let resume = find_resume(resumes, p.resume_id)?;
            Ok(json!({
                "skills": resume.skills,
                "skill_count": resume.skills.len(),
            }))
        }
        "check_experience" => {
            let p: ResumeRef = parse_params(params)?;
            let resume = find_resume(resumes, p.resume_id)?;
            Ok(json!({
                "experience_years": resume.experience,
                "has_experience": resume.experience.is_some(),
            }))
        }
        "match_requirements" => {
            let p: MatchParams = parse_params(params)?;
            let resume = find_resume(resumes, p.resume_id)?;
            Ok(match_requirements(resume, &p.required_skills, p.min_experience))
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

fn match_requirements(resume: &Resume, required_skills: &[String], min_experience: u32) -> Value {
    let have: BTreeSet<String> = resume.skills.iter().map(|s| s.to_lowercase()).collect();
    let want: BTreeSet<String> = required_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched: Vec<&String> = want.intersection(&have).collect();
    let missing: Vec<&String> = want.difference(&have).collect();
    let match_percentage = if want.is_empty() {
        0.0
    } else {
        matched.len() as f64 / want.len() as f64
    };

    json!({
        "matched_skills": matched,
        "missing_skills": missing,
        "match_percentage": match_percentage,
        "experience_met": resume.experience.is_some_and(|y| y >= min_experience),
        "candidate_experience": resume.experience,
        "required_experience": min_experience,
    })
}
