use crate::judge::model::{Submission, SubmissionResult};
use crate::storage::entity::submission::{
    ActiveModel as SubmissionActiveModel, STATUS_FAILED, STATUS_PASSED,
};
use crate::storage::entity::user_progress::{self, Entity as UserProgress};
use crate::storage::repository::SubmissionRepository;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, Statement, TransactionTrait,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub submission_id: i32,
    /// This submission was the user's first pass on the problem.
    pub first_solve: bool,
}

pub struct ProgressRepository;

impl ProgressRepository {
    pub async fn find(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<user_progress::Model>, sea_orm::DbErr> {
        UserProgress::find_by_id(user_id).one(db).await
    }

    /// Store a judged submission and fold it into the user's counters.
    ///
    /// Everything runs in one transaction. The counter upsert goes first so the
    /// write lock is held before submission history is read; two concurrent
    /// first passes on the same problem therefore cannot both see "unsolved".
    pub async fn record(
        db: &DatabaseConnection,
        submission: &Submission,
        result: &SubmissionResult,
    ) -> Result<RecordOutcome, sea_orm::DbErr> {
        let txn = db.begin().await?;
        let now = Utc::now().timestamp();
        let correct: i32 = if result.success { 1 } else { 0 };

        // 1. total / correct / accuracy in a single statement
        txn.execute(Statement::from_sql_and_values(
            txn.get_database_backend(),
            r#"INSERT INTO user_progress
                   (user_id, total_submissions, correct_submissions, accuracy, problems_solved, updated_at)
               VALUES (?, 1, ?, ? * 100.0, 0, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   total_submissions = user_progress.total_submissions + 1,
                   correct_submissions = user_progress.correct_submissions + excluded.correct_submissions,
                   accuracy = (user_progress.correct_submissions + excluded.correct_submissions) * 100.0
                              / (user_progress.total_submissions + 1),
                   updated_at = excluded.updated_at"#,
            [
                submission.user_id.into(),
                correct.into(),
                correct.into(),
                now.into(),
            ],
        ))
        .await?;

        // 2. history is read before the new row exists
        let already_solved =
            SubmissionRepository::has_passed(&txn, submission.user_id, submission.problem_id)
                .await?;

        // 3. the submission itself
        let row = SubmissionActiveModel {
            user_id: Set(submission.user_id),
            problem_id: Set(submission.problem_id),
            code: Set(submission.source_code.clone()),
            language: Set(submission.language.clone()),
            status: Set(if result.success {
                STATUS_PASSED.to_string()
            } else {
                STATUS_FAILED.to_string()
            }),
            passed_count: Set(result.passed_count as i32),
            total_count: Set(result.total_count as i32),
            average_time_ms: Set(result.average_time_ms),
            average_memory_kb: Set(result.average_memory_kb),
            submitted_at: Set(submission.created_at.timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 4. distinct problems solved
        let first_solve = result.success && !already_solved;
        if first_solve {
            UserProgress::update_many()
                .col_expr(
                    user_progress::Column::ProblemsSolved,
                    Expr::col(user_progress::Column::ProblemsSolved).add(1),
                )
                .filter(user_progress::Column::UserId.eq(submission.user_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        debug!("progress updated for user {} (status {})", submission.user_id, row.status);

        Ok(RecordOutcome {
            submission_id: row.id,
            first_solve,
        })
    }
}
