//! 액션 백엔드 포트.
//!
//! 구현: `pixelrule-automation` crate (`DryRunBackend`, `EnigoBackend`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::action::ActionRequest;

/// 액션 백엔드: 좌표/파라미터가 확정된 액션 실행
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// 액션 실행 (`pause_before_secs` 대기 포함)
    async fn execute(&self, request: &ActionRequest) -> Result<(), CoreError>;

    /// 백엔드 이름 (예: "dry-run", "enigo")
    fn name(&self) -> &str;
}
