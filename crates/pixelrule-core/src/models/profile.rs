//! 프로필 모델.
//!
//! 프로필 JSON은 `profile_description`, `settings`, `regions`, `templates`, `rules`
//! 다섯 개의 최상위 키를 가진다. 세션 동안 읽기 전용이다.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// 기본 모니터링 주기 (초)
pub const DEFAULT_MONITORING_INTERVAL_SECS: f64 = 1.0;

/// 기본 주요 색상 클러스터 수
pub const DEFAULT_DOMINANT_COLORS_K: usize = 3;

/// 프로필 전체
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub profile_description: String,
    #[serde(default)]
    pub settings: ProfileSettings,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub templates: Vec<TemplateRef>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Profile {
    /// 이름으로 영역 조회
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// 모니터링 주기. `Duration`으로 표현할 수 없거나 0이면 기본 주기
    pub fn interval(&self) -> Duration {
        lenient::secs_to_duration(self.settings.monitoring_interval_seconds)
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs_f64(DEFAULT_MONITORING_INTERVAL_SECS))
    }
}

/// 프로필 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(
        default = "default_interval",
        deserialize_with = "lenient::f64"
    )]
    pub monitoring_interval_seconds: f64,
    #[serde(default = "default_k", deserialize_with = "lenient::usize")]
    pub analysis_dominant_colors_k: usize,
    /// 엔진이 사용하지 않는 나머지 설정 (편집기 전용 값 등)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            monitoring_interval_seconds: DEFAULT_MONITORING_INTERVAL_SECS,
            analysis_dominant_colors_k: DEFAULT_DOMINANT_COLORS_K,
            extra: Map::new(),
        }
    }
}

fn default_interval() -> f64 {
    DEFAULT_MONITORING_INTERVAL_SECS
}

fn default_k() -> usize {
    DEFAULT_DOMINANT_COLORS_K
}

/// 화면 영역 (절대 좌표)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(deserialize_with = "lenient::i32")]
    pub x: i32,
    #[serde(deserialize_with = "lenient::i32")]
    pub y: i32,
    #[serde(deserialize_with = "lenient::u32")]
    pub width: u32,
    #[serde(deserialize_with = "lenient::u32")]
    pub height: u32,
}

impl Region {
    /// 영역 중심의 화면 좌표
    pub fn center(&self) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(self.width / 2),
            i64::from(self.y) + i64::from(self.height / 2),
        )
    }
}

/// 템플릿 이미지 참조 (`<프로필 디렉토리>/templates/<filename>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    pub filename: String,
}

/// 규칙
///
/// 조건과 액션은 원본 JSON으로 보관한다. 반복마다 변수 치환 후 파싱한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// 규칙 기본 영역
    #[serde(default, alias = "default_region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub condition: Value,
    #[serde(default)]
    pub action: Value,
}
