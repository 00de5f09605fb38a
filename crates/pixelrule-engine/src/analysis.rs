//! 영역 분석 실행.
//!
//! 사전(eager) 패스와 조건 평가의 지연 폴백이 같은 `compute`를 사용한다.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use pixelrule_core::error::CoreError;
use pixelrule_core::models::analysis::{AnalysisKind, RegionData};
use pixelrule_core::ports::analysis::AnalysisProvider;

/// 분석 하나를 실행해 `data`에 채운다.
///
/// 이미지가 없으면(캡처 실패) `CoreError::Analysis`.
pub fn compute(
    kind: AnalysisKind,
    provider: &dyn AnalysisProvider,
    dominant_k: usize,
    data: &mut RegionData,
) -> Result<(), CoreError> {
    let image = data
        .image
        .clone()
        .ok_or_else(|| CoreError::Analysis(format!("{kind} 분석에 필요한 이미지 없음")))?;

    match kind {
        AnalysisKind::AverageColor => {
            data.average_color = Some(provider.average_color(&image)?);
        }
        AnalysisKind::DominantColor => {
            data.dominant_colors = Some(provider.dominant_colors(&image, dominant_k)?);
        }
        AnalysisKind::Ocr => {
            data.ocr = Some(provider.extract_text(&image)?);
        }
    }
    Ok(())
}

/// 사전 분석 패스: 실패한 분석은 건너뛰고 개수를 돌려준다.
pub fn run_eager(
    region: &str,
    kinds: &BTreeSet<AnalysisKind>,
    provider: &dyn AnalysisProvider,
    dominant_k: usize,
    data: &mut RegionData,
) -> usize {
    if data.capture_failed {
        return 0;
    }

    let mut failures = 0;
    for kind in kinds {
        match compute(*kind, provider, dominant_k, data) {
            Ok(()) => debug!(region, analysis = %kind, "사전 분석 완료"),
            Err(e) => {
                failures += 1;
                warn!(region, analysis = %kind, "사전 분석 실패: {e}");
            }
        }
    }
    failures
}
