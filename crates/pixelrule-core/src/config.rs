//! 애플리케이션 설정 구조체.
//!
//! 프로필과 무관한 실행 환경 설정(엔진 타이밍, 비전, 액션 백엔드, 로깅)을 정의한다.
//! `ConfigManager`가 플랫폼 설정 디렉토리의 JSON 파일로 저장/로드한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::action::MouseButton;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 규칙 엔진/모니터링 루프 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 비전(캡처/분석) 설정
    #[serde(default)]
    pub vision: VisionConfig,
    /// 액션 실행 설정
    #[serde(default)]
    pub automation: AutomationConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================
// 엔진 설정
// ============================================================

/// 모니터링 루프 타이밍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 정지 요청 후 추가 대기 시간 (밀리초). 조인 타임아웃 = 주기 + 이 값
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
    /// 허용 최소 모니터링 주기 (밀리초). 프로필 주기가 더 짧으면 이 값으로 올린다
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stop_grace_ms: default_stop_grace_ms(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl EngineConfig {
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

fn default_stop_grace_ms() -> u64 {
    5_000
}

fn default_min_interval_ms() -> u64 {
    50
}

// ============================================================
// 비전 설정
// ============================================================

/// 캡처/분석 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Tesseract 언어 코드 (`ocr` feature)
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    /// tessdata 디렉토리 (None이면 시스템 기본값)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,
    /// 템플릿 매칭 결과 최대 개수
    #[serde(default = "default_max_template_matches")]
    pub max_template_matches: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            ocr_language: default_ocr_language(),
            tessdata_path: None,
            max_template_matches: default_max_template_matches(),
        }
    }
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_max_template_matches() -> usize {
    16
}

// ============================================================
// 자동화 설정
// ============================================================

/// 액션 백엔드 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// true면 실제 입력 없이 로그만 남김
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// `click` 액션의 기본 버튼
    #[serde(default = "default_click_button")]
    pub default_click_button: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            default_click_button: default_click_button(),
        }
    }
}

fn default_dry_run() -> bool {
    true
}

fn default_click_button() -> String {
    "left".to_string()
}

// ============================================================
// 로깅 설정
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 기본 로그 레벨 (`RUST_LOG`가 있으면 무시됨)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            engine: EngineConfig::default(),
            vision: VisionConfig::default(),
            automation: AutomationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// `logging.level`에 허용되는 값
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// 값 범위 검증. 첫 번째 위반 항목을 `CoreError::Validation`으로 반환
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |field: &str, message: String| {
            Err(CoreError::Validation {
                field: field.to_string(),
                message,
            })
        };

        if self.engine.min_interval_ms == 0 {
            return invalid("engine.min_interval_ms", "0보다 커야 함".to_string());
        }
        if self.vision.max_template_matches == 0 {
            return invalid("vision.max_template_matches", "0보다 커야 함".to_string());
        }
        if self.vision.ocr_language.trim().is_empty() {
            return invalid("vision.ocr_language", "비어 있음".to_string());
        }
        if MouseButton::parse(&self.automation.default_click_button).is_none() {
            return invalid(
                "automation.default_click_button",
                format!("left/right/middle 중 하나여야 함: {}", self.automation.default_click_button),
            );
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return invalid("logging.level", format!("알 수 없는 레벨: {}", self.logging.level));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"automation": {"dry_run": false}}"#).unwrap();
        assert!(!config.automation.dry_run);
        assert_eq!(config.automation.default_click_button, "left");
        assert_eq!(config.engine.stop_grace(), Duration::from_secs(5));
        assert_eq!(config.vision.max_template_matches, 16);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validation_names_the_offending_field() {
        let mut config = AppConfig::default();
        config.automation.default_click_button = "thumb".to_string();
        match config.validate() {
            Err(CoreError::Validation { field, .. }) => {
                assert_eq!(field, "automation.default_click_button")
            }
            other => panic!("unexpected: {other:?}"),
        }

        let mut config = AppConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.vision.max_template_matches = 0;
        assert!(config.validate().is_err());
    }
}
