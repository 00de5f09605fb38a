//! 단위 테스트용 포트 스텁.

use std::sync::Mutex;

use async_trait::async_trait;
use image::RgbImage;

use pixelrule_core::error::CoreError;
use pixelrule_core::models::action::ActionRequest;
use pixelrule_core::models::analysis::{AnalysisKind, Bgr, DominantColor, OcrOutput, TemplateMatch};
use pixelrule_core::ports::action_backend::ActionBackend;
use pixelrule_core::ports::analysis::AnalysisProvider;

/// 고정 결과를 돌려주고 호출 횟수를 기록하는 분석기
#[derive(Default)]
pub struct StubAnalyzer {
    pub average: Bgr,
    pub dominant: Vec<DominantColor>,
    pub ocr_text: String,
    pub ocr_confidence: f64,
    pub matches: Vec<TemplateMatch>,
    pub fail_ocr: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

impl StubAnalyzer {
    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    pub fn calls(&self, kind: AnalysisKind) -> usize {
        let name = kind.as_str();
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl AnalysisProvider for StubAnalyzer {
    fn average_color(&self, _image: &RgbImage) -> Result<Bgr, CoreError> {
        self.record(AnalysisKind::AverageColor.as_str());
        Ok(self.average)
    }

    fn dominant_colors(&self, _image: &RgbImage, k: usize) -> Result<Vec<DominantColor>, CoreError> {
        self.record(AnalysisKind::DominantColor.as_str());
        Ok(self.dominant.iter().take(k).cloned().collect())
    }

    fn match_template(
        &self,
        _image: &RgbImage,
        _template: &RgbImage,
        min_confidence: f64,
    ) -> Result<Vec<TemplateMatch>, CoreError> {
        self.record("template");
        Ok(self
            .matches
            .iter()
            .filter(|m| m.confidence >= min_confidence)
            .copied()
            .collect())
    }

    fn extract_text(&self, _image: &RgbImage) -> Result<OcrOutput, CoreError> {
        self.record(AnalysisKind::Ocr.as_str());
        if self.fail_ocr {
            return Err(CoreError::OcrError("스텁 OCR 실패".to_string()));
        }
        Ok(OcrOutput {
            text: self.ocr_text.clone(),
            average_confidence: self.ocr_confidence,
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// 실행 요청을 기록만 하는 백엔드
#[derive(Default)]
pub struct RecordingBackend {
    pub requests: Mutex<Vec<ActionRequest>>,
    pub fail: bool,
}

impl RecordingBackend {
    pub fn taken(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionBackend for RecordingBackend {
    async fn execute(&self, request: &ActionRequest) -> Result<(), CoreError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CoreError::ActionDispatch("스텁 실패".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// 지정한 x 좌표의 영역만 실패시키는 캡처 스텁
#[derive(Default)]
pub struct StubCapture {
    pub failing_x: Vec<i32>,
    /// 캡처마다 소요되는 (가상) 시간
    pub delay: std::time::Duration,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl pixelrule_core::ports::capture::CaptureProvider for StubCapture {
    async fn capture(&self, x: i32, _y: i32, width: u32, height: u32) -> Result<RgbImage, CoreError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing_x.contains(&x) {
            return Err(CoreError::Capture(format!("스텁 캡처 실패 x={x}")));
        }
        Ok(RgbImage::new(width, height))
    }

    fn name(&self) -> &str {
        "stub"
    }
}
