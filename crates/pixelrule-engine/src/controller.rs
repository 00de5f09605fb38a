//! 모니터링 루프와 컨트롤러.
//!
//! `MonitorLoop`는 한 번의 반복(캡처 → 사전 분석 → 규칙 평가)과 주기 실행을 담당하고,
//! `MonitorController`는 루프 태스크의 시작/정지 상태 머신
//! (`Idle → Running → Stopping → Idle`)을 관리한다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use pixelrule_core::error::CoreError;
use pixelrule_core::models::action::MouseButton;
use pixelrule_core::models::analysis::{AnalysisRequirements, RegionBundles, RegionData};
use pixelrule_core::ports::action_backend::ActionBackend;
use pixelrule_core::ports::analysis::AnalysisProvider;
use pixelrule_core::ports::capture::CaptureProvider;
use pixelrule_core::ports::template_source::TemplateSource;
use pixelrule_core::profile_loader::LoadedProfile;

use crate::analysis;
use crate::condition::ConditionEvaluator;
use crate::dependency;
use crate::evaluator::RuleEvaluator;
use crate::template_cache::TemplateCache;

/// 한 번의 반복 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    /// 1부터 시작하는 반복 번호
    pub iteration: u64,
    pub regions_captured: usize,
    pub capture_failures: usize,
    pub analysis_failures: usize,
    pub rules_matched: usize,
    pub actions_dispatched: usize,
    pub actions_failed: usize,
    pub elapsed: Duration,
}

/// 모니터링 루프: 백그라운드 태스크 하나가 단독 소유한다.
pub struct MonitorLoop {
    profile: Arc<LoadedProfile>,
    capture: Arc<dyn CaptureProvider>,
    analyzer: Arc<dyn AnalysisProvider>,
    requirements: AnalysisRequirements,
    rules: RuleEvaluator,
    interval: Duration,
    iterations: u64,
}

impl MonitorLoop {
    pub fn new(
        profile: Arc<LoadedProfile>,
        capture: Arc<dyn CaptureProvider>,
        analyzer: Arc<dyn AnalysisProvider>,
        backend: Arc<dyn ActionBackend>,
        templates: Box<dyn TemplateSource>,
    ) -> Self {
        let requirements = dependency::resolve(&profile.profile.rules);
        let conditions =
            ConditionEvaluator::new(analyzer.clone(), TemplateCache::new(templates), &profile);
        let rules = RuleEvaluator::new(profile.clone(), conditions, backend);
        let interval = profile.profile.interval();

        Self {
            profile,
            capture,
            analyzer,
            requirements,
            rules,
            interval,
            iterations: 0,
        }
    }

    /// 프로필 주기 대신 사용할 주기
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 주기 하한 적용
    pub fn with_min_interval(mut self, min: Duration) -> Self {
        if self.interval < min {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = min.as_millis() as u64,
                "모니터링 주기가 하한보다 짧아 하한으로 조정"
            );
            self.interval = min;
        }
        self
    }

    pub fn with_default_button(mut self, button: MouseButton) -> Self {
        self.rules = self.rules.with_default_button(button);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn requirements(&self) -> &AnalysisRequirements {
        &self.requirements
    }

    /// 한 번의 반복: 영역 캡처 + 사전 분석 → 규칙 평가
    pub async fn run_iteration(&mut self) -> IterationReport {
        let started = Instant::now();
        self.iterations += 1;

        let mut report = IterationReport {
            iteration: self.iterations,
            ..IterationReport::default()
        };
        let dominant_k = self.profile.profile.settings.analysis_dominant_colors_k;
        let mut bundles = RegionBundles::with_capacity(self.profile.profile.regions.len());

        for region in &self.profile.profile.regions {
            let mut data = match self
                .capture
                .capture(region.x, region.y, region.width, region.height)
                .await
            {
                Ok(image) => {
                    report.regions_captured += 1;
                    RegionData::captured(image)
                }
                Err(e) => {
                    report.capture_failures += 1;
                    warn!(region = %region.name, "영역 캡처 실패: {e}");
                    RegionData::failed()
                }
            };

            if let Some(kinds) = self.requirements.get(&region.name) {
                report.analysis_failures +=
                    analysis::run_eager(&region.name, kinds, self.analyzer.as_ref(), dominant_k, &mut data);
            }
            bundles.insert(region.name.clone(), data);
        }

        let summary = self.rules.evaluate_all(&mut bundles).await;
        report.rules_matched = summary.rules_matched;
        report.actions_dispatched = summary.actions_dispatched;
        report.actions_failed = summary.actions_failed;
        report.elapsed = started.elapsed();

        debug!(
            iteration = report.iteration,
            captured = report.regions_captured,
            capture_failures = report.capture_failures,
            matched = report.rules_matched,
            dispatched = report.actions_dispatched,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "반복 완료"
        );
        report
    }

    /// 정지 신호가 올 때까지 주기 실행. 실행한 반복 수를 돌려준다.
    ///
    /// 반복이 주기보다 오래 걸리면 경고 후 곧바로 다음 반복을 실행한다.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> u64 {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            regions = self.profile.profile.regions.len(),
            rules = self.profile.profile.rules.len(),
            capture = self.capture.name(),
            analyzer = self.analyzer.name(),
            "모니터링 루프 시작"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let report = self.run_iteration().await;

            match self.interval.checked_sub(report.elapsed) {
                Some(remaining) if !remaining.is_zero() => {
                    tokio::select! {
                        _ = tokio::time::sleep(remaining) => {}
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() {
                                debug!("정지 채널 닫힘");
                                break;
                            }
                        }
                    }
                }
                _ => {
                    warn!(
                        iteration = report.iteration,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        interval_ms = self.interval.as_millis() as u64,
                        "반복이 모니터링 주기를 초과함"
                    );
                    tokio::task::yield_now().await;
                }
            }
        }

        info!(iterations = self.iterations, "모니터링 루프 종료");
        self.iterations
    }
}

/// 컨트롤러 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Stopping,
}

/// 모니터링 루프 태스크 관리자
pub struct MonitorController {
    state: ControllerState,
    stop_grace: Duration,
    join_timeout: Duration,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<u64>>,
}

impl MonitorController {
    /// `stop_grace`: 정지 시 주기에 더해 기다릴 추가 시간
    pub fn new(stop_grace: Duration) -> Self {
        Self {
            state: ControllerState::Idle,
            stop_grace,
            join_timeout: stop_grace,
            shutdown_tx: None,
            task: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// 루프 태스크가 (정지 요청 없이) 끝났는지
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// 루프 시작. 이미 실행 중이면 에러
    pub fn start(&mut self, monitor: MonitorLoop) -> Result<(), CoreError> {
        if self.state != ControllerState::Idle {
            return Err(CoreError::Internal(format!(
                "모니터링이 이미 실행 중 (상태: {:?})",
                self.state
            )));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.join_timeout = monitor.interval().saturating_add(self.stop_grace);
        self.task = Some(tokio::spawn(monitor.run(shutdown_rx)));
        self.shutdown_tx = Some(shutdown_tx);
        self.state = ControllerState::Running;
        info!(join_timeout_ms = self.join_timeout.as_millis() as u64, "모니터링 시작");
        Ok(())
    }

    /// 정지 신호 후 조인 타임아웃까지 대기. 정상 종료 시 반복 수를 돌려준다.
    pub async fn stop(&mut self) -> Option<u64> {
        if self.state == ControllerState::Idle {
            debug!("이미 정지 상태");
            return None;
        }
        self.state = ControllerState::Stopping;
        info!("모니터링 정지 요청");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }

        let result = match self.task.take() {
            Some(mut handle) => match tokio::time::timeout(self.join_timeout, &mut handle).await {
                Ok(Ok(iterations)) => Some(iterations),
                Ok(Err(e)) => {
                    error!("모니터링 태스크 비정상 종료: {e}");
                    None
                }
                Err(_) => {
                    warn!(
                        timeout_ms = self.join_timeout.as_millis() as u64,
                        "모니터링 태스크 조인 타임아웃, 태스크 중단"
                    );
                    handle.abort();
                    None
                }
            },
            None => None,
        };

        self.state = ControllerState::Idle;
        info!(iterations = ?result, "모니터링 정지 완료");
        result
    }
}
