use crate::storage::entity::submission::{self, Entity as Submission, STATUS_PASSED};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

pub struct SubmissionRepository;

impl SubmissionRepository {
    /// A user's submissions, newest first.
    pub async fn list_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<submission::Model>, sea_orm::DbErr> {
        Submission::find()
            .filter(submission::Column::UserId.eq(user_id))
            .order_by_desc(submission::Column::SubmittedAt)
            .order_by_desc(submission::Column::Id)
            .all(db)
            .await
    }

    pub async fn has_passed<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        problem_id: i32,
    ) -> Result<bool, sea_orm::DbErr> {
        let found = Submission::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::ProblemId.eq(problem_id))
            .filter(submission::Column::Status.eq(STATUS_PASSED))
            .one(db)
            .await?;
        Ok(found.is_some())
    }
}
