//! 화면 영역 캡처.
//!
//! xcap 기반. 영역 좌상단을 포함하는 모니터에서 캡처하고,
//! 모니터 경계를 넘는 부분은 잘라낸다.

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use tracing::debug;
use xcap::Monitor;

use pixelrule_core::error::CoreError;
use pixelrule_core::ports::capture::CaptureProvider;

/// 모니터 위치/크기 (가상 화면 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// 모니터 로컬 좌표의 캡처 사각형 `(x, y, width, height)`.
///
/// 좌상단이 모니터 밖이거나 면적이 0이면 `None`.
pub fn clip_to_monitor(
    bounds: MonitorBounds,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let local_x = u32::try_from(i64::from(x) - i64::from(bounds.x)).ok()?;
    let local_y = u32::try_from(i64::from(y) - i64::from(bounds.y)).ok()?;
    if local_x >= bounds.width || local_y >= bounds.height {
        return None;
    }
    let w = width.min(bounds.width - local_x);
    let h = height.min(bounds.height - local_y);
    (w > 0 && h > 0).then_some((local_x, local_y, w, h))
}

/// xcap 캡처 제공자
pub struct XcapCaptureProvider;

impl XcapCaptureProvider {
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking(x: i32, y: i32, width: u32, height: u32) -> Result<RgbImage, CoreError> {
        let monitor = Monitor::from_point(x, y)
            .map_err(|e| CoreError::Capture(format!("({x}, {y})를 포함하는 모니터 없음: {e}")))?;

        let bounds = MonitorBounds {
            x: monitor
                .x()
                .map_err(|e| CoreError::Capture(format!("모니터 정보 조회 실패: {e}")))?,
            y: monitor
                .y()
                .map_err(|e| CoreError::Capture(format!("모니터 정보 조회 실패: {e}")))?,
            width: monitor
                .width()
                .map_err(|e| CoreError::Capture(format!("모니터 정보 조회 실패: {e}")))?,
            height: monitor
                .height()
                .map_err(|e| CoreError::Capture(format!("모니터 정보 조회 실패: {e}")))?,
        };

        let (lx, ly, w, h) = clip_to_monitor(bounds, x, y, width, height).ok_or_else(|| {
            CoreError::Capture(format!("영역이 모니터 밖: ({x}, {y}) {width}x{height}"))
        })?;
        if (w, h) != (width, height) {
            debug!(
                requested = %format!("{width}x{height}"),
                clipped = %format!("{w}x{h}"),
                "영역이 모니터 경계를 넘어 잘림"
            );
        }

        let rgba = monitor
            .capture_region(lx, ly, w, h)
            .map_err(|e| CoreError::Capture(format!("영역 캡처 실패: {e}")))?;

        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}

impl Default for XcapCaptureProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureProvider for XcapCaptureProvider {
    async fn capture(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::Capture(format!("빈 영역: {width}x{height}")));
        }

        tokio::task::spawn_blocking(move || Self::capture_blocking(x, y, width, height))
            .await
            .map_err(|e| CoreError::Capture(format!("캡처 작업 조인 실패: {e}")))?
    }

    fn name(&self) -> &str {
        "xcap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: MonitorBounds = MonitorBounds {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn region_inside_monitor_is_unchanged() {
        assert_eq!(clip_to_monitor(MAIN, 100, 200, 50, 40), Some((100, 200, 50, 40)));
    }

    #[test]
    fn region_crossing_edge_is_clipped() {
        assert_eq!(clip_to_monitor(MAIN, 1900, 1070, 50, 40), Some((1900, 1070, 20, 10)));
    }

    #[test]
    fn secondary_monitor_uses_local_coordinates() {
        let left = MonitorBounds {
            x: -1280,
            y: 0,
            width: 1280,
            height: 1024,
        };
        assert_eq!(clip_to_monitor(left, -1000, 10, 10, 10), Some((280, 10, 10, 10)));
        assert_eq!(clip_to_monitor(left, 5, 10, 10, 10), None);
    }

    #[test]
    fn empty_or_outside_region_is_rejected() {
        assert_eq!(clip_to_monitor(MAIN, -5, 0, 10, 10), None);
        assert_eq!(clip_to_monitor(MAIN, 0, 0, 0, 10), None);
        assert_eq!(clip_to_monitor(MAIN, 1920, 0, 10, 10), None);
    }

    #[tokio::test]
    async fn zero_extent_fails_before_touching_the_screen() {
        let err = XcapCaptureProvider::new().capture(0, 0, 0, 5).await.unwrap_err();
        assert!(matches!(err, CoreError::Capture(_)));
    }

    #[test]
    fn provider_name() {
        assert_eq!(XcapCaptureProvider::default().name(), "xcap");
    }
}
