//! 설정 파일 관리.
//!
//! `AppConfig`를 JSON 파일 하나로 보관한다. 파일이 없으면 기본값으로 만들고,
//! 읽은 설정은 `AppConfig::validate`를 거친다.
//! 기본값 파일은 임시 파일에 쓴 뒤 이름을 바꿔 중간 상태가 남지 않게 한다.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::CoreError;

const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 `config.json`
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::default_path()?)
    }

    /// 지정 경로 사용. 상위 디렉토리와 파일이 없으면 만든다.
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let config = if path.is_file() {
            read_config(&path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!(path = %path.display(), "기본 설정 파일 생성");
            config
        };
        Ok(Self { config, path })
    }

    /// 플랫폼별 기본 설정 파일 경로
    ///
    /// Linux `~/.config/pixelrule/config.json`,
    /// macOS `~/Library/Application Support/dev.pixelrule.pixelrule/config.json`,
    /// Windows `%APPDATA%\pixelrule\pixelrule\config\config.json`
    pub fn default_path() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("dev", "pixelrule", "pixelrule")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없음".to_string()))
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("설정 파일 읽기 실패: {}: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("설정 파일 파싱 실패: {}: {e}", path.display())))?;
    config.validate()?;
    debug!(path = %path.display(), "설정 파일 로드");
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            CoreError::Config(format!("설정 디렉토리 생성 실패: {}: {e}", dir.display()))
        })?;
    }

    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .map_err(|e| CoreError::Config(format!("설정 파일 쓰기 실패: {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| CoreError::Config(format!("설정 파일 교체 실패: {}: {e}", path.display())))
}
