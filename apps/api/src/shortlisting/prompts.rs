// Prompt templates for the Phase 2 review.

/// Candidate review prompt.
/// Replace: {job_title}, {description}, {tech_stack}, {minimum_experience},
///          {name}, {email}, {skills}, {experience}, {resume_text}, {json_only}
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"You are an expert HR recruiter. Review the following resume against the job requirements and provide a detailed assessment.

Job Title: {job_title}
Job Description: {description}
Required Tech Stack: {tech_stack}
Minimum Experience: {minimum_experience} years

Candidate Resume:
Name: {name}
Email: {email}
Skills: {skills}
Experience: {experience} years
Resume Content:
{resume_text}

Based on this information, provide your assessment in the following JSON format:
{
    "is_suitable": true or false,
    "confidence": 0.0 to 1.0 (confidence score),
    "reasoning": "Brief explanation of your decision",
    "cover_letter": "A personalized cover letter (2-3 sentences) that the candidate could use for this position, highlighting their relevant experience and skills"
}

{json_only}"#;

/// Cover letter used when the model's answer cannot be read. Replace `{skills}`.
pub const FALLBACK_COVER_LETTER_TEMPLATE: &str = "I am interested in applying for this position. \
With my experience in {skills}, I believe I would be a good fit for your team.";

/// Fills `{key}` placeholders in one left-to-right pass. Inserted values are
/// never rescanned, and braces that don't name a known key are copied as-is.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match filled {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
