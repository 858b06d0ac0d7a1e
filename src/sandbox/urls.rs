/// Submissions endpoint; payloads and results travel base64-encoded.
pub fn url_submissions(base: &str) -> String {
    format!(
        "{}/submissions?base64_encoded=true",
        base.trim_end_matches('/')
    )
}

pub fn url_submission_token(base: &str, token: &str) -> String {
    format!(
        "{}/submissions/{}?base64_encoded=true",
        base.trim_end_matches('/'),
        token
    )
}
