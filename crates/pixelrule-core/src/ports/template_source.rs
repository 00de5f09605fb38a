//! 템플릿 이미지 소스 포트.
//!
//! 템플릿 캐시가 캐시 미스 때만 호출한다.

use std::path::Path;

use image::RgbImage;

use crate::error::CoreError;

/// 템플릿 이미지 로더
pub trait TemplateSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<RgbImage, CoreError>;
}

/// 파일 시스템 템플릿 로더 (`image` crate 디코더)
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn load(&self, path: &Path) -> Result<RgbImage, CoreError> {
        let image = image::open(path).map_err(|e| CoreError::TemplateLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(image.to_rgb8())
    }
}
