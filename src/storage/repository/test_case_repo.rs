use crate::storage::entity::test_case::{self, ActiveModel as TestCaseActiveModel, Entity as TestCase};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

/// Seed file row: `[{"problem_id": 1, "input": "...", "output": "..."}]`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseSeed {
    pub problem_id: i32,
    pub input: String,
    pub output: String,
}

pub struct TestCaseRepository;

impl TestCaseRepository {
    /// All cases of a problem in insertion order.
    pub async fn all_for_problem(
        db: &DatabaseConnection,
        problem_id: i32,
    ) -> Result<Vec<test_case::Model>, sea_orm::DbErr> {
        TestCase::find()
            .filter(test_case::Column::ProblemId.eq(problem_id))
            .order_by_asc(test_case::Column::Id)
            .all(db)
            .await
    }

    pub async fn first_for_problem(
        db: &DatabaseConnection,
        problem_id: i32,
    ) -> Result<Option<test_case::Model>, sea_orm::DbErr> {
        TestCase::find()
            .filter(test_case::Column::ProblemId.eq(problem_id))
            .order_by_asc(test_case::Column::Id)
            .one(db)
            .await
    }

    /// Returns false when an identical case already exists.
    pub async fn insert_or_ignore(
        db: &DatabaseConnection,
        seed: TestCaseSeed,
    ) -> Result<bool, sea_orm::DbErr> {
        let active_model = TestCaseActiveModel {
            problem_id: Set(seed.problem_id),
            input: Set(seed.input),
            expected_output: Set(seed.output),
            ..Default::default()
        };

        let rows = TestCase::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    test_case::Column::ProblemId,
                    test_case::Column::Input,
                    test_case::Column::ExpectedOutput,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(rows > 0)
    }
}
