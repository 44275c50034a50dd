// Extraction instructions sent to the scrape API alongside each URL.

/// Instruction for a LinkedIn profile page.
pub const PROFILE_EXTRACTION_PROMPT: &str = "
    Analyze this LinkedIn profile and extract the following information:
    - Summary
    - Skills
    - Experience
    - Education
    Format as JSON.
    ";

/// Instruction for a job listing page.
pub const JOB_EXTRACTION_PROMPT: &str = "
    Analyze this job listing and extract the following:
    - Job Title
    - Company
    - Required Skills
    - Preferred Skills
    Format as JSON.
    ";
