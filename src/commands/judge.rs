use crate::judge::{JudgeService, Mode, Submission};
use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use tokio_util::sync::CancellationToken;

async fn read_source(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read source file {}", path.display()))
}

pub async fn run(
    service: &JudgeService,
    problem_id: i32,
    language: &str,
    source: &Path,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let code = read_source(source).await?;
    // run mode is never persisted, so no identity is attached
    let submission = Submission::new(0, problem_id, code, language, Mode::Run);
    let resp = service.run(&submission, cancel).await?;
    Ok(serde_json::to_value(resp)?)
}

pub async fn submit(
    service: &JudgeService,
    user_id: i32,
    problem_id: i32,
    language: &str,
    source: &Path,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let code = read_source(source).await?;
    let submission = Submission::new(user_id, problem_id, code, language, Mode::Submit);
    let resp = service.submit(&submission, cancel).await?;
    Ok(serde_json::to_value(resp)?)
}
