use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// First test case only, never persisted.
    Run,
    /// Every test case, persisted with a progress update.
    Submit,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub user_id: i32,
    pub problem_id: i32,
    pub source_code: String,
    pub language: String,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        user_id: i32,
        problem_id: i32,
        source_code: impl Into<String>,
        language: impl Into<String>,
        mode: Mode,
    ) -> Self {
        Self {
            user_id,
            problem_id,
            source_code: source_code.into(),
            language: language.into(),
            mode,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub id: i32,
    pub problem_id: i32,
    pub input: String,
    pub expected_output: String,
}

impl From<crate::storage::entity::test_case::Model> for TestCase {
    fn from(m: crate::storage::entity::test_case::Model) -> Self {
        Self {
            id: m.id,
            problem_id: m.problem_id,
            input: m.input,
            expected_output: m.expected_output,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseVerdict {
    /// Position of the case in the problem's ordering, zero-based.
    pub index: usize,
    pub test_case_id: i32,
    pub input: String,
    pub expected_output: String,
    pub passed: bool,
    pub actual_output: String,
    pub stderr: String,
    /// Why the case failed when it was not a plain output mismatch.
    pub detail: Option<String>,
    pub time_ms: Option<f64>,
    pub memory_kb: Option<u64>,
}

impl CaseVerdict {
    /// A failed case with no measurements: the job never produced a usable snapshot.
    pub fn errored(index: usize, case: &TestCase, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            index,
            test_case_id: case.id,
            input: case.input.clone(),
            expected_output: case.expected_output.clone(),
            passed: false,
            actual_output: String::new(),
            stderr: detail.clone(),
            detail: Some(detail),
            time_ms: None,
            memory_kb: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub cases: Vec<CaseVerdict>,
    pub passed_count: usize,
    pub total_count: usize,
    pub success: bool,
    pub average_time_ms: Option<f64>,
    pub average_memory_kb: Option<f64>,
}

impl SubmissionResult {
    /// Aggregate verdicts. Averages only cover cases that reported a measurement.
    pub fn from_verdicts(mut cases: Vec<CaseVerdict>) -> Self {
        cases.sort_by_key(|c| c.index);

        let total_count = cases.len();
        let passed_count = cases.iter().filter(|c| c.passed).count();

        let times: Vec<f64> = cases.iter().filter_map(|c| c.time_ms).collect();
        let memories: Vec<f64> = cases
            .iter()
            .filter_map(|c| c.memory_kb.map(|m| m as f64))
            .collect();

        Self {
            success: total_count > 0 && passed_count == total_count,
            passed_count,
            total_count,
            average_time_ms: mean(&times),
            average_memory_kb: mean(&memories),
            cases,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.total_count - self.passed_count
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseVerdict> {
        self.cases.iter().filter(|c| !c.passed)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PollError {
    #[error("job did not finish after {attempts} polls{}", last_error_suffix(.last_error))]
    Timeout {
        attempts: u32,
        last_error: Option<String>,
    },
    #[error("{0}")]
    Protocol(String),
    #[error("polling cancelled")]
    Cancelled,
}

#[derive(thiserror::Error, Debug)]
pub enum JudgeError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("no test cases found for problem {0}")]
    NoTestCases(i32),
    #[error("failed to load test cases: {0}")]
    Lookup(#[source] DbErr),
    #[error("judging cancelled")]
    Cancelled,
    /// The verdict is known but could not be stored.
    #[error("submission was judged but not recorded: {0}")]
    Record(#[source] DbErr),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}
