//! 드라이런 백엔드: 입력을 실행하지 않고 로깅만 한다.

use async_trait::async_trait;
use tracing::info;

use pixelrule_core::error::CoreError;
use pixelrule_core::models::action::{ActionRequest, ResolvedAction};
use pixelrule_core::ports::action_backend::ActionBackend;

use crate::support::{emit_log_message, pause_before};

/// 드라이런 백엔드
///
/// `pause_before_secs` 대기와 `log_message` 출력은 실제로 수행한다.
pub struct DryRunBackend;

#[async_trait]
impl ActionBackend for DryRunBackend {
    async fn execute(&self, request: &ActionRequest) -> Result<(), CoreError> {
        pause_before(request).await;

        let rule = request.rule_name.as_str();
        match &request.action {
            ResolvedAction::Click {
                x,
                y,
                button,
                clicks,
                interval_secs,
            } => {
                info!(rule, x, y, %button, clicks, interval_secs, "[DryRun] 마우스 클릭");
            }
            ResolvedAction::TypeText { text, interval_secs } => {
                info!(rule, text_len = text.chars().count(), interval_secs, "[DryRun] 텍스트 입력");
            }
            ResolvedAction::PressKey { key } => {
                info!(rule, key = %key, "[DryRun] 키 입력");
            }
            ResolvedAction::Hotkey { keys } => {
                info!(rule, ?keys, "[DryRun] 단축키 실행");
            }
            ResolvedAction::LogMessage { level, message } => {
                emit_log_message(rule, *level, message);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
