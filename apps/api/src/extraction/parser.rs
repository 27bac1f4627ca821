//! Heuristic field extraction from the plain text of one resume page.
//!
//! Keyword and regex matching only. Names come from the first few lines, skills
//! from a fixed vocabulary, experience from phrases like "5+ years of experience".

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::resume::Resume;

/// Pages with less trimmed text than this are treated as blank.
const MIN_PAGE_CHARS: usize = 50;
const NAME_SEARCH_LINES: usize = 5;
const MAX_NAME_WORDS: usize = 4;
const HEADER_WORDS: [&str; 5] = ["resume", "cv", "curriculum", "vitae", "page"];

const KNOWN_SKILLS: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Ruby", "PHP", "Go", "Rust",
    "React", "Angular", "Vue", "Node.js", "Django", "Flask", "FastAPI", "Spring", "Express",
    "SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "Cassandra", "Oracle",
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "Git", "CI/CD",
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "NLP", "Computer Vision",
    "Data Analysis", "Data Science", "Pandas", "NumPy", "Scikit-learn",
    "HTML", "CSS", "REST API", "GraphQL", "Microservices", "Agile", "Scrum",
    "Linux", "Windows", "MacOS", "Bash", "Shell Scripting",
    "Frontend Development", "Backend Development", "Full Stack",
    "UI/UX", "Testing", "QA", "Selenium", "Jest", "Pytest",
];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern is valid")
    })
}

fn experience_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(\d+)\+?\s*years?\s+(?:of\s+)?experience",
            r"experience[:\s]+(\d+)\+?\s*years?",
            r"(\d+)\+?\s*yrs?\s+(?:of\s+)?experience",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("experience pattern is valid"))
        .collect()
    })
}

/// Builds a `Resume` from one page of text, or `None` for a blank page.
pub fn parse_resume_text(text: &str, cv_path: String) -> Option<Resume> {
    if text.trim().chars().count() < MIN_PAGE_CHARS {
        return None;
    }

    Some(Resume {
        id: Uuid::new_v4(),
        name: extract_name(text),
        email: extract_email(text),
        skills: extract_skills(text),
        experience: extract_experience(text),
        cv_path,
        text_content: text.to_string(),
    })
}

/// First short, capitalised line near the top that isn't a document header.
pub fn extract_name(text: &str) -> String {
    text.lines()
        .take(NAME_SEARCH_LINES)
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && line.split_whitespace().count() <= MAX_NAME_WORDS
                && line.chars().next().is_some_and(char::is_uppercase)
                && !HEADER_WORDS
                    .iter()
                    .any(|header| line.to_lowercase().contains(header))
        })
        .map(String::from)
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn extract_email(text: &str) -> Option<String> {
    email_regex()
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// Vocabulary skills mentioned anywhere in the text, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .filter(|skill| text_lower.contains(&skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect()
}

/// Years of experience from the first pattern that matches, tried in order.
pub fn extract_experience(text: &str) -> Option<u32> {
    let text_lower = text.to_lowercase();
    experience_regexes().iter().find_map(|re| {
        re.captures(&text_lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    })
}
