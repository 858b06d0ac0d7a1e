use crate::storage::repository::{ProgressRepository, SubmissionRepository};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

pub async fn show(db: &DatabaseConnection, user_id: i32) -> anyhow::Result<Value> {
    match ProgressRepository::find(db, user_id).await? {
        Some(p) => Ok(serde_json::to_value(p)?),
        None => Ok(json!({ "error": "User progress not found", "user_id": user_id })),
    }
}

pub async fn history(db: &DatabaseConnection, user_id: i32) -> anyhow::Result<Value> {
    let rows = SubmissionRepository::list_for_user(db, user_id).await?;
    Ok(serde_json::to_value(rows)?)
}
