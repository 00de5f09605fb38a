//! 템플릿 이미지 캐시.
//!
//! 키는 (프로필 식별자, 파일명). 첫 요청 때 한 번만 로드를 시도하고
//! 성공과 실패를 모두 기억한다. 모니터링 루프가 단독 소유하므로 잠금이 없다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use pixelrule_core::ports::template_source::TemplateSource;
use pixelrule_core::profile_loader::TEMPLATES_DIR_NAME;

type CacheKey = (PathBuf, String);

pub struct TemplateCache {
    source: Box<dyn TemplateSource>,
    /// `None`은 로드 실패 기록
    entries: HashMap<CacheKey, Option<Arc<RgbImage>>>,
}

impl TemplateCache {
    pub fn new(source: Box<dyn TemplateSource>) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// 템플릿 조회: `<profile_identity>/templates/<filename>`
    pub fn get(&mut self, profile_identity: &Path, filename: &str) -> Option<Arc<RgbImage>> {
        let key = (profile_identity.to_path_buf(), filename.to_string());
        if let Some(entry) = self.entries.get(&key) {
            if entry.is_none() {
                debug!(template = filename, "이전에 로드 실패한 템플릿");
            }
            return entry.clone();
        }

        let path = profile_identity.join(TEMPLATES_DIR_NAME).join(filename);
        let entry = match self.source.load(&path) {
            Ok(image) => {
                info!(
                    template = filename,
                    width = image.width(),
                    height = image.height(),
                    "템플릿 로드 완료"
                );
                Some(Arc::new(image))
            }
            Err(e) => {
                warn!(template = filename, path = %path.display(), "템플릿 로드 실패: {e}");
                None
            }
        };
        self.entries.insert(key, entry.clone());
        entry
    }
}
