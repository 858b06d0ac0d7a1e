use crate::judge::comparator::compare;
use crate::judge::model::{CaseVerdict, JudgeError, PollError, TestCase};
use crate::judge::poller::JobPoller;
use crate::sandbox::{ExecutionRequest, JobStatus, Language, Sandbox};
use log::{info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one test case: submit, wait, compare.
pub struct CaseRunner {
    sandbox: Arc<dyn Sandbox>,
    poller: JobPoller,
}

impl CaseRunner {
    pub fn new(sandbox: Arc<dyn Sandbox>, poller: JobPoller) -> Self {
        Self { sandbox, poller }
    }

    /// Sandbox, timeout and protocol failures become a failed verdict so the
    /// remaining cases still run. Only cancellation is returned as an error.
    pub async fn run(
        &self,
        index: usize,
        case: &TestCase,
        source_code: &str,
        language: Language,
        cancel: &CancellationToken,
    ) -> Result<CaseVerdict, JudgeError> {
        if cancel.is_cancelled() {
            return Err(JudgeError::Cancelled);
        }

        let req = ExecutionRequest {
            source_code,
            language,
            stdin: &case.input,
        };

        // 1. Submit
        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(JudgeError::Cancelled),
            res = self.sandbox.submit(&req) => res,
        };
        let handle = match submitted {
            Ok(h) => h,
            Err(e) => {
                warn!("✗ case #{} could not be submitted: {}", index + 1, e);
                return Ok(CaseVerdict::errored(index, case, e.to_string()));
            }
        };

        // 2. Poll
        let snapshot = match self
            .poller
            .await_completion(self.sandbox.as_ref(), &handle, cancel)
            .await
        {
            Ok(s) => s,
            Err(PollError::Cancelled) => return Err(JudgeError::Cancelled),
            Err(e) => {
                warn!("✗ case #{} [{}]: {}", index + 1, handle, e);
                return Ok(CaseVerdict::errored(index, case, e.to_string()));
            }
        };

        // 3. Compare
        let (passed, detail) = match snapshot.status {
            JobStatus::Succeeded => (compare(&case.expected_output, &snapshot.stdout), None),
            _ => (false, Some(snapshot.failure_detail())),
        };
        info!(
            "case #{} [{}]: {}",
            index + 1,
            handle,
            if passed { "passed" } else { "failed" }
        );

        Ok(CaseVerdict {
            index,
            test_case_id: case.id,
            input: case.input.clone(),
            expected_output: case.expected_output.clone(),
            passed,
            actual_output: snapshot.stdout,
            stderr: if snapshot.stderr.is_empty() {
                snapshot.compile_output
            } else {
                snapshot.stderr
            },
            detail,
            time_ms: snapshot.time_ms,
            memory_kb: snapshot.memory_kb,
        })
    }
}
