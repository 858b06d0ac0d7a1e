use crate::storage::repository::{TestCaseRepository, TestCaseSeed};
use anyhow::Context;
use log::info;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::path::Path;

/// Load test cases from a JSON array, skipping ones already stored.
pub async fn run(db: &DatabaseConnection, file: &Path) -> anyhow::Result<Value> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("cannot read seed file {}", file.display()))?;
    let seeds: Vec<TestCaseSeed> =
        serde_json::from_str(&raw).context("seed file must be a JSON array of {problem_id, input, output}")?;

    let total = seeds.len();
    let mut inserted = 0usize;
    for seed in seeds {
        if TestCaseRepository::insert_or_ignore(db, seed).await? {
            inserted += 1;
        }
    }
    info!("✓ seeded {} of {} test cases", inserted, total);

    Ok(json!({ "total": total, "inserted": inserted, "skipped": total - inserted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::establish_connection;

    #[tokio::test]
    async fn seeds_from_file_once() {
        let path = std::env::temp_dir().join(format!("codejudge-seed-{}.json", rand::random::<u64>()));
        std::fs::write(
            &path,
            r#"[{"problem_id":1,"input":"4\n2 7 11 15\n9","output":"0 1"},
                {"problem_id":1,"input":"3\n3 2 4\n6","output":"1 2"}]"#,
        )
        .unwrap();
        let db = establish_connection("sqlite::memory:").await.unwrap();

        let first = run(&db, &path).await.unwrap();
        assert_eq!(first["inserted"], 2);
        let again = run(&db, &path).await.unwrap();
        assert_eq!(again["inserted"], 0);
        assert_eq!(again["skipped"], 2);

        let _ = std::fs::remove_file(&path);
    }
}
