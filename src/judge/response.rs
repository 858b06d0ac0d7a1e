use crate::judge::model::{CaseVerdict, SubmissionResult};
use serde::Serialize;

/// Reply for `run`: the single case shown inline.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunResponse {
    pub input: String,
    pub correct: bool,
    pub stderr: String,
    pub time: Option<f64>,
    pub memory: Option<u64>,
    pub output: String,
}

impl From<&CaseVerdict> for RunResponse {
    fn from(v: &CaseVerdict) -> Self {
        Self {
            input: v.input.clone(),
            correct: v.passed,
            stderr: v.stderr.clone(),
            time: v.time_ms,
            memory: v.memory_kb,
            output: v.actual_output.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedCase {
    /// One-based case number.
    pub test_case: usize,
    pub expected: String,
    pub received: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply for `submit`: aggregate counts plus the failing cases.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub total_cases: usize,
    pub passed: usize,
    pub failed: usize,
    pub success: bool,
    pub failed_cases: Vec<FailedCase>,
    pub average_time: Option<f64>,
    pub average_memory: Option<f64>,
}

impl From<&SubmissionResult> for SubmitResponse {
    fn from(r: &SubmissionResult) -> Self {
        Self {
            total_cases: r.total_count,
            passed: r.passed_count,
            failed: r.failed_count(),
            success: r.success,
            failed_cases: r
                .failed_cases()
                .map(|c| FailedCase {
                    test_case: c.index + 1,
                    expected: c.expected_output.clone(),
                    received: c.actual_output.trim().to_string(),
                    error: c.detail.clone(),
                })
                .collect(),
            average_time: r.average_time_ms,
            average_memory: r.average_memory_kb,
        }
    }
}
