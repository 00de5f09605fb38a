//! OCR 텍스트 추출.
//!
//! `leptess` 기반 Tesseract 래퍼. `ocr` feature 비활성화 시
//! 추출은 항상 `OcrError::Unavailable`을 반환한다.
//!
//! 단어 단위 TSV 결과에서 신뢰도가 양수인 단어만 모아 공백으로 잇고,
//! 그 단어들의 평균 신뢰도(0–100)를 함께 돌려준다.

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;

use pixelrule_core::error::CoreError;
use pixelrule_core::models::analysis::OcrOutput;

/// Tesseract TSV의 단어 레벨
const WORD_LEVEL: &str = "5";

/// OCR 에러 타입
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR 초기화 실패: {0}")]
    Init(String),

    #[error("OCR 이미지 설정 실패: {0}")]
    ImageSetup(String),

    #[error("OCR 텍스트 추출 실패: {0}")]
    Extraction(String),

    #[error("빈 이미지: 너비 또는 높이가 0")]
    EmptyImage,

    #[error("OCR 미지원 빌드 (`ocr` feature 필요)")]
    Unavailable,
}

impl From<OcrError> for CoreError {
    fn from(err: OcrError) -> Self {
        CoreError::OcrError(err.to_string())
    }
}

/// 이 빌드에서 OCR을 쓸 수 있는지
pub const fn is_available() -> bool {
    cfg!(feature = "ocr")
}

/// Tesseract OCR 추출기
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    /// tessdata 경로 (None이면 시스템 기본값)
    tessdata_path: Option<PathBuf>,
    language: String,
}

impl TesseractOcr {
    pub fn new(tessdata_path: Option<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            tessdata_path,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn tessdata_path(&self) -> Option<&PathBuf> {
        self.tessdata_path.as_ref()
    }

    /// 이미지에서 텍스트 추출 (동기)
    pub fn extract(&self, image: &RgbImage) -> Result<OcrOutput, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::EmptyImage);
        }

        #[cfg(feature = "ocr")]
        {
            let tsv = self.run_tesseract(image)?;
            let output = parse_tsv(&tsv);
            tracing::debug!(
                chars = output.text.len(),
                confidence = output.average_confidence,
                "OCR 완료"
            );
            Ok(output)
        }

        #[cfg(not(feature = "ocr"))]
        {
            Err(OcrError::Unavailable)
        }
    }

    #[cfg(feature = "ocr")]
    fn run_tesseract(&self, image: &RgbImage) -> Result<String, OcrError> {
        use std::io::Cursor;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::ImageSetup(format!("PNG 인코딩 실패: {e}")))?;

        let tessdata = self
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());

        let mut lt = leptess::LepTess::new(tessdata.as_deref(), &self.language)
            .map_err(|e| OcrError::Init(format!("{e}")))?;

        lt.set_image_from_mem(&png)
            .map_err(|e| OcrError::ImageSetup(format!("{e}")))?;

        lt.get_tsv_text(0)
            .map_err(|e| OcrError::Extraction(format!("{e}")))
    }
}

/// Tesseract TSV → 텍스트 + 평균 단어 신뢰도.
///
/// 열: level, page, block, par, line, word, left, top, width, height, conf, text
pub fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut words: Vec<&str> = Vec::new();
    let mut confidences: Vec<f64> = Vec::new();

    for line in tsv.lines() {
        let cols: Vec<&str> = line.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let Ok(conf) = cols[10].trim().parse::<f64>() else {
            continue;
        };
        let text = cols[11].trim();
        if !text.is_empty() && conf > 0.0 {
            words.push(text);
            confidences.push(conf);
        }
    }

    let average_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    OcrOutput {
        text: words.join(" "),
        average_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1\t1\t0\t0\t0\t0\t0\t0\t200\t50\t-1\t
4\t1\t1\t1\t1\t0\t5\t5\t150\t20\t-1\t
5\t1\t1\t1\t1\t1\t5\t5\t60\t20\t96.5\tReady
5\t1\t1\t1\t1\t2\t70\t5\t40\t20\t83.5\tto
5\t1\t1\t1\t1\t3\t115\t5\t10\t20\t-1\t
5\t1\t1\t1\t1\t4\t130\t5\t20\t20\t0\t~~
5\t1\t1\t1\t1\t5\t155\t5\t45\t20\t90\tPlay!
";

    #[test]
    fn tsv_keeps_confident_words_only() {
        let output = parse_tsv(SAMPLE);
        assert_eq!(output.text, "Ready to Play!");
        assert!((output.average_confidence - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tsv_has_zero_confidence() {
        let output = parse_tsv("level\tpage_num\n");
        assert_eq!(output.text, "");
        assert_eq!(output.average_confidence, 0.0);
    }

    #[test]
    fn empty_image_returns_error() {
        let ocr = TesseractOcr::new(None, "eng");
        let result = ocr.extract(&RgbImage::new(0, 0));
        assert!(matches!(result, Err(OcrError::EmptyImage)));
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn unavailable_without_feature() {
        assert!(!is_available());
        let ocr = TesseractOcr::new(None, "eng");
        let err = ocr.extract(&RgbImage::new(2, 2)).unwrap_err();
        assert!(matches!(err, OcrError::Unavailable));
        assert!(matches!(CoreError::from(err), CoreError::OcrError(_)));
    }

    #[test]
    fn error_display_messages() {
        assert!(OcrError::Init("x".to_string()).to_string().contains("초기화"));
        assert!(OcrError::EmptyImage.to_string().contains("빈 이미지"));
        assert!(OcrError::Unavailable.to_string().contains("ocr"));
    }
}
