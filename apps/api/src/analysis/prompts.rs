// Prompt constants for resume analysis.

/// Instruction sent after the job description and resume image.
/// Fixed for every request; nothing is interpolated.
pub const RESUME_REVIEW_PROMPT: &str = "\
You are an experienced Technical Human Resource Manager. \
Your task is to review the provided resume against the job description. \
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.";
