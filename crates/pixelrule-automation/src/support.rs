//! 백엔드 공용 동작: 실행 전 대기, `log_message` 출력.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use pixelrule_core::models::action::{ActionRequest, LogLevel};
use pixelrule_core::models::lenient::secs_to_duration;

/// `pause_before_secs`만큼 대기. 표현할 수 없는 값이면 대기하지 않는다.
pub(crate) async fn pause_before(request: &ActionRequest) {
    let secs = request.pause_before_secs;
    match secs_to_duration(secs) {
        Some(pause) if !pause.is_zero() => {
            debug!(rule = %request.rule_name, secs, "액션 전 대기");
            tokio::time::sleep(pause).await;
        }
        Some(_) => {}
        None => warn!(rule = %request.rule_name, secs, "잘못된 대기 시간, 대기 생략"),
    }
}

/// 반복 입력 사이 간격. 0이거나 표현할 수 없으면 `None`
#[cfg_attr(not(feature = "enigo"), allow(dead_code))]
pub(crate) fn step_interval(rule: &str, secs: f64) -> Option<Duration> {
    match secs_to_duration(secs) {
        Some(pause) if !pause.is_zero() => Some(pause),
        Some(_) => None,
        None => {
            warn!(rule, secs, "잘못된 입력 간격, 간격 없이 실행");
            None
        }
    }
}

/// `log_message` 액션을 지정 레벨로 출력
pub(crate) fn emit_log_message(rule: &str, level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!(rule, "{message}"),
        LogLevel::Info => info!(rule, "{message}"),
        LogLevel::Warning => warn!(rule, "{message}"),
        LogLevel::Error => error!(rule, "{message}"),
        LogLevel::Critical => error!(rule, critical = true, "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelrule_core::models::action::ResolvedAction;

    fn request(pause_before_secs: f64) -> ActionRequest {
        ActionRequest {
            rule_name: "pause".to_string(),
            pause_before_secs,
            action: ResolvedAction::PressKey { key: "a".to_string() },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_pause_is_skipped() {
        let started = tokio::time::Instant::now();
        pause_before(&request(1e20)).await;
        pause_before(&request(f64::NAN)).await;
        pause_before(&request(-1.0)).await;
        assert_eq!(started.elapsed(), Duration::ZERO);

        pause_before(&request(0.5)).await;
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn step_interval_rejects_zero_and_out_of_range() {
        assert_eq!(step_interval("r", 0.0), None);
        assert_eq!(step_interval("r", 1e20), None);
        assert_eq!(step_interval("r", 0.01), Some(Duration::from_millis(10)));
    }
}
