//! # pixelrule-app
//!
//! pixelrule 바이너리 진입점.
//! 설정 로드, tracing 초기화, 서브커맨드 실행.

mod cli;
mod commands;
mod lifecycle;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use pixelrule_core::config::AppConfig;
use pixelrule_core::config_manager::ConfigManager;
use pixelrule_core::error::CoreError;

use crate::cli::{Cli, Command};
use crate::commands::RunOptions;

/// 워크스페이스 크레이트별 로그 필터
fn log_filter(level: &str) -> String {
    [
        "pixelrule",
        "pixelrule_app",
        "pixelrule_core",
        "pixelrule_engine",
        "pixelrule_vision",
        "pixelrule_automation",
    ]
    .iter()
    .map(|krate| format!("{krate}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}

/// `--config` 경로 또는 플랫폼 기본 경로의 설정 관리자
fn load_config(cli: &Cli) -> Result<ConfigManager, CoreError> {
    match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli);
    // 설정 로드에 실패해도 기본 설정으로 계속한다
    let config = loaded
        .as_ref()
        .map(|manager| manager.get().clone())
        .unwrap_or_else(|_| AppConfig::default_config());

    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(&level))),
        )
        .init();

    match &loaded {
        Ok(manager) => debug!(path = %manager.config_path().display(), "설정 로드"),
        Err(e) => warn!("설정 로드 실패, 기본 설정 사용: {e}"),
    }

    match cli.command {
        Command::Run {
            profile,
            interval,
            dry_run,
        } => {
            commands::run(
                &config,
                RunOptions {
                    profile: &profile,
                    interval,
                    dry_run,
                },
            )
            .await?;
        }
        Command::Check { profile } => commands::check(&profile)?,
    }

    info!("pixelrule 종료");
    Ok(())
}
