use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct CreateSubmissionRequest {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionResponse {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusDto {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Poll response. `time` is wall seconds (sent as a decimal string), `memory` is KB.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmissionResponse {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub status: Option<StatusDto>,
    #[serde(default, deserialize_with = "de_seconds")]
    pub time: Option<f64>,
    pub memory: Option<u64>,
}

fn de_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
