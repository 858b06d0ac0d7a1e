use crate::config::JudgeConfig;
use crate::judge::model::{JudgeError, Mode, Submission, SubmissionResult, TestCase};
use crate::judge::poller::JobPoller;
use crate::judge::response::{RunResponse, SubmitResponse};
use crate::judge::runner::CaseRunner;
use crate::sandbox::{Language, Sandbox};
use crate::storage::repository::{ProgressRepository, TestCaseRepository};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{error, info};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Judges one submission against its problem's test cases.
pub struct JudgeService {
    db: Arc<DatabaseConnection>,
    runner: CaseRunner,
    max_parallel_cases: usize,
}

impl JudgeService {
    pub fn new(db: Arc<DatabaseConnection>, sandbox: Arc<dyn Sandbox>, config: &JudgeConfig) -> Self {
        let poller = JobPoller::new(config.poll_interval, config.max_poll_attempts);
        Self {
            db,
            runner: CaseRunner::new(sandbox, poller),
            max_parallel_cases: config.max_parallel_cases.max(1),
        }
    }

    /// `run` judges the first case only; `submit` judges all of them, at most
    /// `max_parallel_cases` at a time. Verdicts come back in case order.
    pub async fn judge(
        &self,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<SubmissionResult, JudgeError> {
        let language: Language = submission
            .language
            .parse()
            .map_err(|_| JudgeError::UnsupportedLanguage(submission.language.clone()))?;
        info!(
            "judging problem {} for user {} ({:?}, {} -> {})",
            submission.problem_id,
            submission.user_id,
            submission.mode,
            language,
            language.sandbox_id()
        );

        let cases: Vec<TestCase> = match submission.mode {
            Mode::Run => TestCaseRepository::first_for_problem(&self.db, submission.problem_id)
                .await
                .map_err(JudgeError::Lookup)?
                .into_iter()
                .map(TestCase::from)
                .collect(),
            Mode::Submit => TestCaseRepository::all_for_problem(&self.db, submission.problem_id)
                .await
                .map_err(JudgeError::Lookup)?
                .into_iter()
                .map(TestCase::from)
                .collect(),
        };
        if cases.is_empty() {
            return Err(JudgeError::NoTestCases(submission.problem_id));
        }
        info!("found {} test case(s)", cases.len());

        let verdicts = stream::iter(cases.iter().enumerate())
            .map(|(idx, case)| {
                self.runner
                    .run(idx, case, &submission.source_code, language, cancel)
            })
            .buffered(self.max_parallel_cases)
            .try_collect::<Vec<_>>()
            .await?;

        let result = SubmissionResult::from_verdicts(verdicts);
        info!(
            "result: {}/{} passed (problem {})",
            result.passed_count, result.total_count, submission.problem_id
        );
        Ok(result)
    }

    pub async fn run(
        &self,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<RunResponse, JudgeError> {
        let run = Submission {
            mode: Mode::Run,
            ..submission.clone()
        };
        let result = self.judge(&run, cancel).await?;
        result
            .cases
            .first()
            .map(RunResponse::from)
            .ok_or(JudgeError::NoTestCases(run.problem_id))
    }

    /// Judge every case, then persist. Nothing is written if judging was cancelled.
    pub async fn submit(
        &self,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<SubmitResponse, JudgeError> {
        let submission = Submission {
            mode: Mode::Submit,
            ..submission.clone()
        };
        let result = self.judge(&submission, cancel).await?;
        if cancel.is_cancelled() {
            return Err(JudgeError::Cancelled);
        }

        match ProgressRepository::record(&self.db, &submission, &result).await {
            Ok(outcome) => info!(
                "✓ submission recorded [#{}] user={} problem={} {}/{}{}",
                outcome.submission_id,
                submission.user_id,
                submission.problem_id,
                result.passed_count,
                result.total_count,
                if outcome.first_solve { " (first solve)" } else { "" }
            ),
            Err(e) => {
                error!(
                    "✗ failed to record submission (user {}, problem {}): {}",
                    submission.user_id, submission.problem_id, e
                );
                return Err(JudgeError::Record(e));
            }
        }

        Ok(SubmitResponse::from(&result))
    }
}
