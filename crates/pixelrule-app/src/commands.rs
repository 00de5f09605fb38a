//! 서브커맨드 구현: 의존성 조립(DI)과 실행.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use pixelrule_automation::factory::create_backend;
use pixelrule_core::config::AppConfig;
use pixelrule_core::models::action::MouseButton;
use pixelrule_core::models::analysis::{AnalysisKind, AnalysisRequirements};
use pixelrule_core::models::lenient::secs_to_duration;
use pixelrule_core::ports::template_source::FsTemplateSource;
use pixelrule_core::profile_loader::{load_profile, LoadedProfile};
use pixelrule_engine::controller::{MonitorController, MonitorLoop};
use pixelrule_engine::dependency;
use pixelrule_vision::analyzer::ImageAnalyzer;
use pixelrule_vision::capture::XcapCaptureProvider;
use pixelrule_vision::ocr;

use crate::lifecycle;

/// `run` 서브커맨드 옵션
pub struct RunOptions<'a> {
    pub profile: &'a Path,
    pub interval: Option<f64>,
    pub dry_run: bool,
}

/// 프로필 로드 후 모니터링 루프를 돌리고 시그널을 기다린다.
pub async fn run(config: &AppConfig, options: RunOptions<'_>) -> Result<()> {
    let loaded = Arc::new(load_checked(options.profile)?);
    let requirements = dependency::resolve(&loaded.profile.rules);
    warn_if_ocr_unavailable(&requirements);

    let dry_run = options.dry_run || config.automation.dry_run;
    let backend = create_backend(dry_run);

    let default_button = MouseButton::parse(&config.automation.default_click_button).unwrap_or_else(|| {
        warn!(
            button = %config.automation.default_click_button,
            "알 수 없는 기본 클릭 버튼, left 사용"
        );
        MouseButton::Left
    });

    let mut monitor = MonitorLoop::new(
        loaded.clone(),
        Arc::new(XcapCaptureProvider::new()),
        Arc::new(ImageAnalyzer::new(&config.vision)),
        backend.clone(),
        Box::new(FsTemplateSource),
    )
    .with_default_button(default_button);

    if let Some(secs) = options.interval {
        monitor = monitor.with_interval(interval_arg(secs)?);
    }
    let monitor = monitor.with_min_interval(config.engine.min_interval());

    info!(
        profile = %options.profile.display(),
        description = %loaded.profile.profile_description,
        backend = backend.name(),
        interval_ms = monitor.interval().as_millis() as u64,
        "pixelrule 시작"
    );

    let mut controller = MonitorController::new(config.engine.stop_grace());
    controller
        .start(monitor)
        .map_err(|e| anyhow!("모니터링 시작 실패: {e}"))?;

    let reason = lifecycle::wait_for_shutdown().await;
    info!(%reason, "종료 신호 수신");

    match controller.stop().await {
        Some(iterations) => info!(iterations, "정상 종료"),
        None => warn!("모니터링 태스크가 정상적으로 끝나지 않음"),
    }
    Ok(())
}

/// 프로필 검증 결과와 분석 요구사항을 표준 출력으로 보고한다.
pub fn check(profile_path: &Path) -> Result<()> {
    let loaded = load_checked(profile_path)?;
    let profile = &loaded.profile;
    let requirements = dependency::resolve(&profile.rules);

    println!("프로필: {}", profile_path.display());
    if !profile.profile_description.is_empty() {
        println!("설명: {}", profile.profile_description);
    }
    println!("주기: {:.3}s", profile.interval().as_secs_f64());
    println!("영역 {}개:", profile.regions.len());
    for region in &profile.regions {
        println!(
            "  - {} ({}, {}) {}x{}",
            region.name, region.x, region.y, region.width, region.height
        );
    }

    let mut missing = 0;
    println!("템플릿 {}개:", profile.templates.len());
    for template in &profile.templates {
        let path = loaded.template_path(&template.filename);
        let status = if path.is_file() {
            "ok"
        } else {
            missing += 1;
            "파일 없음"
        };
        println!("  - {} → {} [{status}]", template.name, path.display());
    }

    println!("규칙 {}개", profile.rules.len());
    println!("사전 분석: {}", dependency::describe(&requirements));
    warn_if_ocr_unavailable(&requirements);

    if missing > 0 {
        warn!(missing, "템플릿 파일 일부를 찾을 수 없음");
    }
    Ok(())
}

/// `--interval` 값 → 주기
fn interval_arg(secs: f64) -> Result<Duration> {
    match secs_to_duration(secs) {
        Some(interval) if !interval.is_zero() => Ok(interval),
        _ => bail!("--interval은 0보다 크고 표현 가능한 초 단위 값이어야 함: {secs}"),
    }
}

fn load_checked(path: &Path) -> Result<LoadedProfile> {
    load_profile(path).with_context(|| format!("프로필 로드 실패: {}", path.display()))
}

fn warn_if_ocr_unavailable(requirements: &AnalysisRequirements) {
    let needs_ocr = requirements
        .values()
        .any(|kinds| kinds.contains(&AnalysisKind::Ocr));
    if needs_ocr && !ocr::is_available() {
        warn!("프로필에 OCR 조건이 있지만 `ocr` feature 없이 빌드됨, 해당 조건은 항상 거짓");
    }
}
