//! 이미지 분석 포트.
//!
//! 구현: `pixelrule-vision` crate (`ImageAnalyzer`)

use image::RgbImage;

use crate::error::CoreError;
use crate::models::analysis::{Bgr, DominantColor, OcrOutput, TemplateMatch};

/// 분석 제공자: 평균색, 주요색, 템플릿 매칭, OCR
///
/// 모니터링 루프 안에서 동기 호출된다.
pub trait AnalysisProvider: Send + Sync {
    /// 영역 평균 색상
    fn average_color(&self, image: &RgbImage) -> Result<Bgr, CoreError>;

    /// 주요 색상 `k`개 (비율 내림차순)
    fn dominant_colors(&self, image: &RgbImage, k: usize)
        -> Result<Vec<DominantColor>, CoreError>;

    /// `min_confidence` 이상인 템플릿 매칭 위치 (신뢰도 내림차순)
    ///
    /// 템플릿이 이미지보다 크면 빈 목록을 반환한다.
    fn match_template(
        &self,
        image: &RgbImage,
        template: &RgbImage,
        min_confidence: f64,
    ) -> Result<Vec<TemplateMatch>, CoreError>;

    /// 텍스트 추출
    fn extract_text(&self, image: &RgbImage) -> Result<OcrOutput, CoreError>;

    /// 제공자 이름 (로그용)
    fn name(&self) -> &str;
}
