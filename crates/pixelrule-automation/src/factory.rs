//! 액션 백엔드 생성 팩토리.

use std::sync::Arc;

use pixelrule_core::ports::action_backend::ActionBackend;

use crate::dry_run::DryRunBackend;

/// 설정에 맞는 백엔드 생성
///
/// `dry_run`이 꺼져 있고 `enigo` feature가 활성화되어 있으면 실제 입력 백엔드,
/// 그 외에는 드라이런 백엔드를 반환한다.
pub fn create_backend(dry_run: bool) -> Arc<dyn ActionBackend> {
    if dry_run {
        tracing::info!("드라이런 백엔드 사용 (입력 실행 안 함)");
        return Arc::new(DryRunBackend);
    }

    #[cfg(feature = "enigo")]
    {
        match crate::enigo_backend::EnigoBackend::new() {
            Ok(backend) => {
                tracing::info!("실제 입력 백엔드 (enigo) 초기화 완료");
                return Arc::new(backend);
            }
            Err(e) => {
                tracing::warn!("enigo 초기화 실패, 드라이런 폴백: {e}");
            }
        }
    }

    #[cfg(not(feature = "enigo"))]
    tracing::warn!("`enigo` feature 없이 빌드됨, 드라이런 폴백");

    Arc::new(DryRunBackend)
}
