/// Pitch prompt. Both records are inserted in a single `format!` pass so
/// record text is never rescanned for placeholders.
pub fn pitch_prompt(profile_json: &str, job_json: &str) -> String {
    format!(
        "
    You are a career coach. Based on this LinkedIn profile:
    {profile_json}

    And this job description:
    {job_json}

    Write a one-paragraph personalized pitch the candidate could use in a cover letter.
    "
    )
}
