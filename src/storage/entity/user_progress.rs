use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Running totals per user. `accuracy` is rewritten together with the counters.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "user_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub total_submissions: i32,
    pub correct_submissions: i32,
    pub accuracy: f64,
    pub problems_solved: i32,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
