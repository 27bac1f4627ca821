//! Phase 1: keyword and experience shortlisting. No LLM call.
//!
//! Algorithm:
//! 1. score = 0.7 × (|required ∩ skills| / |required|) + 0.3 × experience component
//!    (skills compared case-insensitively)
//! 2. Stable sort by score, best first
//! 3. Keep resumes whose stated experience meets the minimum
//! 4. If that leaves fewer than N, append every resume with unknown experience
//!    in score order
//! 5. Truncate to N

use std::collections::HashSet;

use crate::models::job::JobPosting;
use crate::models::resume::Resume;

pub const KEYWORD_WEIGHT: f64 = 0.7;
pub const EXPERIENCE_WEIGHT: f64 = 0.3;

/// Match score in `[0, 1]` for one resume against a posting.
pub fn score_resume(resume: &Resume, posting: &JobPosting) -> f64 {
    let keyword = keyword_component(&resume.skills, &posting.required_tech_stack);
    let experience = experience_component(resume.experience, posting.minimum_experience);
    (KEYWORD_WEIGHT * keyword + EXPERIENCE_WEIGHT * experience).clamp(0.0, 1.0)
}

/// Fraction of required skills present. Zero when nothing is required.
fn keyword_component(skills: &[String], required: &[String]) -> f64 {
    let required: HashSet<String> = required.iter().map(|s| s.to_lowercase()).collect();
    if required.is_empty() {
        return 0.0;
    }
    let skills: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let matched = required.intersection(&skills).count();
    matched as f64 / required.len() as f64
}

/// Unknown or insufficient experience scores zero; otherwise it ramps up to
/// full credit at twice the minimum.
fn experience_component(experience: Option<u32>, minimum: u32) -> f64 {
    match experience {
        None => 0.0,
        Some(_) if minimum == 0 => 1.0,
        Some(years) if years >= minimum => {
            (f64::from(years) / (2.0 * f64::from(minimum))).min(1.0)
        }
        Some(_) => 0.0,
    }
}

fn meets_minimum(resume: &Resume, minimum: u32) -> bool {
    resume.experience.is_some_and(|years| years >= minimum)
}

/// A resume paired with its Phase 1 score.
#[derive(Debug, Clone)]
pub struct ScoredResume {
    pub resume: Resume,
    pub score: f64,
}

/// Scores every resume and returns them best first. Ties keep input order.
pub fn rank_resumes(resumes: &[Resume], posting: &JobPosting) -> Vec<ScoredResume> {
    let mut scored: Vec<ScoredResume> = resumes
        .iter()
        .map(|resume| ScoredResume {
            score: score_resume(resume, posting),
            resume: resume.clone(),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Returns up to `target_count` resumes, best first.
///
/// Unknown-experience resumes only pad the list when too few candidates meet
/// the minimum; the padding is not filtered further.
pub fn shortlist(resumes: &[Resume], posting: &JobPosting, target_count: usize) -> Vec<Resume> {
    let ranked = rank_resumes(resumes, posting);
    let minimum = posting.minimum_experience;

    let mut selected: Vec<&ScoredResume> = ranked
        .iter()
        .filter(|s| meets_minimum(&s.resume, minimum))
        .collect();

    if selected.len() < target_count {
        selected.extend(ranked.iter().filter(|s| s.resume.experience.is_none()));
    }

    selected
        .into_iter()
        .take(target_count)
        .map(|s| s.resume.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::tests::make_posting;
    use uuid::Uuid;

    fn make_resume(name: &str, skills: &[&str], experience: Option<u32>) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience,
            cv_path: format!("uploads/batch.pdf#{name}"),
            text_content: String::new(),
        }
    }

    fn names(resumes: &[Resume]) -> Vec<&str> {
        resumes.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_half_skills_three_years_over_two_minimum() {
        let posting = make_posting(&["Python", "Docker"], 2);
        let resume = make_resume("a", &["Python"], Some(3));
        // 0.7 * 1/2 + 0.3 * min(1, 3/4) = 0.35 + 0.225
        let score = score_resume(&resume, &posting);
        assert!((score - 0.575).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_no_required_skills_unknown_experience_scores_zero() {
        let posting = make_posting(&[], 3);
        let resume = make_resume("a", &["Python", "Rust"], None);
        assert_eq!(score_resume(&resume, &posting), 0.0);
    }

    #[test]
    fn test_zero_minimum_gives_full_experience_credit() {
        let posting = make_posting(&[], 0);
        let resume = make_resume("a", &[], Some(0));
        assert!((score_resume(&resume, &posting) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_below_minimum_gets_no_experience_credit() {
        let posting = make_posting(&["Rust"], 5);
        let resume = make_resume("a", &["Rust"], Some(4));
        assert!((score_resume(&resume, &posting) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_experience_credit_caps_at_double_minimum() {
        let posting = make_posting(&["Rust"], 2);
        let resume = make_resume("a", &["Rust"], Some(40));
        assert!((score_resume(&resume, &posting) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_skill_match_is_case_insensitive_and_deduplicated() {
        let posting = make_posting(&["python", "PYTHON", "Docker"], 0);
        let resume = make_resume("a", &["Python", "docker"], None);
        assert!((score_resume(&resume, &posting) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        let postings = [
            make_posting(&[], 0),
            make_posting(&["Rust"], 0),
            make_posting(&["Rust", "Go", "SQL"], 3),
            make_posting(&["Rust"], 100),
        ];
        let resumes = [
            make_resume("a", &[], None),
            make_resume("b", &["Rust", "Go", "SQL", "Java"], Some(50)),
            make_resume("c", &["rust"], Some(0)),
            make_resume("d", &["Go"], Some(3)),
        ];
        for posting in &postings {
            for resume in &resumes {
                let score = score_resume(resume, posting);
                assert!((0.0..=1.0).contains(&score), "Score was {score}");
            }
        }
    }

    #[test]
    fn test_shortlist_sorted_and_truncated() {
        let posting = make_posting(&["Rust", "Go"], 1);
        let resumes = vec![
            make_resume("one-skill", &["Rust"], Some(2)),
            make_resume("two-skills", &["Rust", "Go"], Some(2)),
            make_resume("no-skills", &[], Some(2)),
        ];
        let result = shortlist(&resumes, &posting, 2);
        assert_eq!(names(&result), vec!["two-skills", "one-skill"]);

        let scores: Vec<f64> = result.iter().map(|r| score_resume(r, &posting)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_shortlist_filters_out_underqualified() {
        let posting = make_posting(&["Rust"], 3);
        let resumes = vec![
            make_resume("junior", &["Rust"], Some(1)),
            make_resume("senior", &[], Some(5)),
        ];
        let result = shortlist(&resumes, &posting, 5);
        assert_eq!(names(&result), vec!["senior"]);
    }

    #[test]
    fn test_shortlist_backfills_with_unknown_experience() {
        let posting = make_posting(&["Rust"], 3);
        let resumes = vec![
            make_resume("unknown-low", &[], None),
            make_resume("qualified", &[], Some(4)),
            make_resume("unknown-high", &["Rust"], None),
            make_resume("junior", &["Rust"], Some(1)),
        ];
        let result = shortlist(&resumes, &posting, 3);
        // qualified first, then unknown-experience padding in score order
        assert_eq!(names(&result), vec!["qualified", "unknown-high", "unknown-low"]);
    }

    #[test]
    fn test_no_backfill_when_enough_qualify() {
        let posting = make_posting(&[], 1);
        let resumes = vec![
            make_resume("unknown", &[], None),
            make_resume("a", &[], Some(2)),
            make_resume("b", &[], Some(3)),
        ];
        let result = shortlist(&resumes, &posting, 2);
        assert!(result.iter().all(|r| r.experience.is_some()));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_shortlist_is_deterministic() {
        let posting = make_posting(&["Rust", "SQL"], 2);
        let resumes = vec![
            make_resume("a", &["SQL"], Some(2)),
            make_resume("b", &["SQL"], Some(2)),
            make_resume("c", &["Rust", "SQL"], None),
            make_resume("d", &["Rust"], Some(9)),
        ];
        let first = shortlist(&resumes, &posting, 3);
        let second = shortlist(&resumes, &posting, 3);
        assert_eq!(first, second);
        // equal scores keep upload order
        assert_eq!(names(&first), vec!["d", "a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        let posting = make_posting(&["Rust"], 0);
        assert!(shortlist(&[], &posting, 3).is_empty());
    }
}
