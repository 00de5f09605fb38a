//! 프로필 로더.
//!
//! JSON 프로필 파일을 읽어 검증하고, 템플릿 디렉토리와 캐시 키로 쓰일
//! 프로필 식별자(프로필 파일이 있는 디렉토리)를 함께 돌려준다.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::lenient;
use crate::models::profile::{Profile, DEFAULT_DOMINANT_COLORS_K, DEFAULT_MONITORING_INTERVAL_SECS};

/// 템플릿 하위 디렉토리 이름
pub const TEMPLATES_DIR_NAME: &str = "templates";

/// 검증을 마친 프로필
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile: Profile,
    /// 프로필 식별자 (프로필 디렉토리). 템플릿 캐시 키의 일부
    pub identity: PathBuf,
    /// `<프로필 디렉토리>/templates`
    pub templates_dir: PathBuf,
}

impl LoadedProfile {
    /// 템플릿 파일 경로
    pub fn template_path(&self, filename: &str) -> PathBuf {
        self.templates_dir.join(filename)
    }
}

/// 프로필 파일 로드 + 검증
pub fn load_profile(path: &Path) -> Result<LoadedProfile, CoreError> {
    let content = fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("프로필 읽기 실패: {}: {}", path.display(), e))
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let base_dir = fs::canonicalize(&base_dir).unwrap_or(base_dir);

    let loaded = parse_profile(&content, &base_dir)?;
    info!(
        profile = %path.display(),
        regions = loaded.profile.regions.len(),
        templates = loaded.profile.templates.len(),
        rules = loaded.profile.rules.len(),
        "프로필 로드 완료"
    );
    Ok(loaded)
}

/// JSON 문자열 → 검증된 프로필 (`base_dir`는 템플릿 기준 디렉토리)
pub fn parse_profile(content: &str, base_dir: &Path) -> Result<LoadedProfile, CoreError> {
    let mut profile: Profile = serde_json::from_str(content)?;
    validate(&mut profile)?;

    Ok(LoadedProfile {
        profile,
        identity: base_dir.to_path_buf(),
        templates_dir: base_dir.join(TEMPLATES_DIR_NAME),
    })
}

/// 이름 중복/영역 크기 검증, 잘못된 설정값은 기본값으로 교체
fn validate(profile: &mut Profile) -> Result<(), CoreError> {
    let mut region_names = HashSet::new();
    for region in &profile.regions {
        if region.name.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "regions".to_string(),
                message: "이름 없는 영역".to_string(),
            });
        }
        if !region_names.insert(region.name.as_str()) {
            return Err(CoreError::Validation {
                field: "regions".to_string(),
                message: format!("중복된 영역 이름: {}", region.name),
            });
        }
        if region.width == 0 || region.height == 0 {
            return Err(CoreError::Validation {
                field: format!("regions.{}", region.name),
                message: format!("영역 크기는 양수여야 함: {}x{}", region.width, region.height),
            });
        }
    }

    let mut template_names = HashSet::new();
    for template in &profile.templates {
        if !template_names.insert(template.name.as_str()) {
            return Err(CoreError::Validation {
                field: "templates".to_string(),
                message: format!("중복된 템플릿 이름: {}", template.name),
            });
        }
    }

    let settings = &mut profile.settings;
    let interval = lenient::secs_to_duration(settings.monitoring_interval_seconds);
    if interval.map_or(true, |d| d.is_zero()) {
        warn!(
            value = settings.monitoring_interval_seconds,
            "monitoring_interval_seconds가 잘못됨, 기본값 사용"
        );
        settings.monitoring_interval_seconds = DEFAULT_MONITORING_INTERVAL_SECS;
    }
    if settings.analysis_dominant_colors_k == 0 {
        warn!("analysis_dominant_colors_k가 0, 기본값 사용");
        settings.analysis_dominant_colors_k = DEFAULT_DOMINANT_COLORS_K;
    }

    let mut rule_names = HashSet::new();
    for rule in &profile.rules {
        if !rule_names.insert(rule.name.as_str()) {
            warn!(rule = %rule.name, "중복된 규칙 이름");
        }
        if let Some(region) = rule.region.as_deref() {
            if !region_names.contains(region) {
                warn!(rule = %rule.name, region, "규칙 기본 영역이 프로필에 없음");
            }
        }
    }

    debug!(
        interval_secs = settings.monitoring_interval_seconds,
        k = settings.analysis_dominant_colors_k,
        "프로필 검증 완료"
    );
    Ok(())
}
