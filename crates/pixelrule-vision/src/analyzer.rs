//! `AnalysisProvider` 구현: 색상/템플릿/OCR 분석을 하나로 묶는다.

use image::RgbImage;

use pixelrule_core::config::VisionConfig;
use pixelrule_core::error::CoreError;
use pixelrule_core::models::analysis::{Bgr, DominantColor, OcrOutput, TemplateMatch};
use pixelrule_core::ports::analysis::AnalysisProvider;

use crate::color;
use crate::ocr::TesseractOcr;
use crate::template;

/// 이미지 분석기
pub struct ImageAnalyzer {
    ocr: TesseractOcr,
    max_template_matches: usize,
}

impl ImageAnalyzer {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            ocr: TesseractOcr::new(config.tessdata_path.clone(), config.ocr_language.clone()),
            max_template_matches: config.max_template_matches.max(1),
        }
    }
}

impl Default for ImageAnalyzer {
    fn default() -> Self {
        Self::new(&VisionConfig::default())
    }
}

impl AnalysisProvider for ImageAnalyzer {
    fn average_color(&self, image: &RgbImage) -> Result<Bgr, CoreError> {
        color::average_color(image)
    }

    fn dominant_colors(&self, image: &RgbImage, k: usize) -> Result<Vec<DominantColor>, CoreError> {
        color::dominant_colors(image, k)
    }

    fn match_template(
        &self,
        image: &RgbImage,
        template: &RgbImage,
        min_confidence: f64,
    ) -> Result<Vec<TemplateMatch>, CoreError> {
        Ok(template::match_template(
            image,
            template,
            min_confidence,
            self.max_template_matches,
        ))
    }

    fn extract_text(&self, image: &RgbImage) -> Result<OcrOutput, CoreError> {
        Ok(self.ocr.extract(image)?)
    }

    fn name(&self) -> &str {
        "image"
    }
}
