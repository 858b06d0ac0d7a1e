mod commands;
mod config;
mod judge;
mod sandbox;
mod storage;

use anyhow::Context;
use log::{info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::commands::{AppCommand, USAGE};
use crate::config::JudgeConfig;
use crate::judge::JudgeService;
use crate::sandbox::SandboxClient;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // stdout carries the JSON result, logs go to stderr
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("codejudge", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = AppCommand::from_args(&args);

    match cmd {
        AppCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        AppCommand::Unknown(msg) => {
            eprintln!("{}", msg);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        _ => {}
    }

    let config = JudgeConfig::from_env()?;
    let db = storage::establish_connection(&config.database_url)
        .await
        .with_context(|| format!("cannot open database {}", config.database_url))?;
    let db = Arc::new(db);
    info!("✓ database ready: {}", config.database_url);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠ interrupted, cancelling outstanding jobs");
                cancel.cancel();
            }
        });
    }

    let output = match cmd {
        AppCommand::Run {
            problem_id,
            language,
            source,
        } => {
            let service = judge_service(db.clone(), &config)?;
            commands::judge::run(&service, problem_id, &language, &source, &cancel).await?
        }
        AppCommand::Submit {
            user_id,
            problem_id,
            language,
            source,
        } => {
            let service = judge_service(db.clone(), &config)?;
            commands::judge::submit(&service, user_id, problem_id, &language, &source, &cancel)
                .await?
        }
        AppCommand::Progress { user_id } => commands::progress::show(&db, user_id).await?,
        AppCommand::History { user_id } => commands::progress::history(&db, user_id).await?,
        AppCommand::Seed { file } => commands::seed::run(&db, &file).await?,
        AppCommand::Help | AppCommand::Unknown(_) => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn judge_service(
    db: Arc<sea_orm::DatabaseConnection>,
    config: &JudgeConfig,
) -> anyhow::Result<JudgeService> {
    let client = SandboxClient::new(config)?;
    info!("▶ sandbox at {}", config.sandbox_url);
    Ok(JudgeService::new(db, Arc::new(client), config))
}
