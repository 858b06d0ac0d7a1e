use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PASSED: &str = "Passed";
pub const STATUS_FAILED: &str = "Failed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub code: String,
    pub language: String,
    pub status: String, // Passed / Failed
    pub passed_count: i32,
    pub total_count: i32,
    #[sea_orm(nullable)]
    pub average_time_ms: Option<f64>,
    #[sea_orm(nullable)]
    pub average_memory_kb: Option<f64>,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
