//! 화면 영역 캡처 포트.
//!
//! 구현: `pixelrule-vision` crate (xcap)

use async_trait::async_trait;
use image::RgbImage;

use crate::error::CoreError;

/// 캡처 제공자: 절대 화면 좌표의 사각 영역을 RGB 이미지로 반환
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// 영역 캡처.
    ///
    /// 실패는 `CoreError::Capture`로 반환한다. 호출자는 해당 영역을
    /// 이번 반복에서 캡처 실패로 표시하고 계속 진행한다.
    async fn capture(&self, x: i32, y: i32, width: u32, height: u32)
        -> Result<RgbImage, CoreError>;

    /// 제공자 이름 (로그용)
    fn name(&self) -> &str;
}
