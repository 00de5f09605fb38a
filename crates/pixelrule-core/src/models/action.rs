//! 규칙 액션 모델.
//!
//! 프로필의 액션 JSON(`ActionSpec`)과, 변수 치환과 좌표 계산이 끝나
//! 액션 백엔드로 전달되는 요청(`ActionRequest`)을 정의한다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use crate::error::CoreError;

/// 액션 종류: 숫자 파라미터는 원본 값 그대로 보관하고
/// 엔진이 기본값/경고 처리와 함께 해석한다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Click {
        #[serde(default)]
        button: Option<Value>,
        #[serde(default)]
        clicks: Option<Value>,
        #[serde(default)]
        interval: Option<Value>,
    },
    TypeText {
        #[serde(default)]
        text: Option<Value>,
        #[serde(default)]
        interval: Option<Value>,
    },
    PressKey {
        /// 문자열이면 단일 키, 배열이면 동시 입력(hotkey)
        #[serde(default)]
        key: Option<Value>,
    },
    LogMessage {
        #[serde(default)]
        message: Option<Value>,
        #[serde(default)]
        level: Option<Value>,
    },
    #[serde(other)]
    Unknown,
}

/// 액션 대상 좌표 지정
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionTarget {
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub target_relation: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub target_region: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_i64")]
    pub x: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_i64")]
    pub y: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_i64")]
    pub offset_x: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_i64")]
    pub offset_y: Option<i64>,
}

/// 파싱된 액션 스펙 (변수 치환 이후)
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    /// 원본 `type` 문자열
    pub type_name: String,
    pub target: ActionTarget,
    /// 실행 전 대기 (원본 값)
    pub pause_before_secs: Option<Value>,
}

impl ActionSpec {
    pub fn parse(value: &Value) -> Result<Self, CoreError> {
        let object = value.as_object().ok_or_else(|| {
            CoreError::InvalidArguments(format!("액션은 JSON 객체여야 함: {value}"))
        })?;
        let type_name = object
            .get("type")
            .map(lenient::value_to_display)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::InvalidArguments(format!("액션에 type 필드가 없음: {value}")))?;

        let kind: ActionKind = serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::InvalidArguments(format!("'{type_name}' 액션 파라미터 오류: {e}"))
        })?;
        let target: ActionTarget = serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::InvalidArguments(format!("'{type_name}' 액션 좌표 파라미터 오류: {e}"))
        })?;

        Ok(Self {
            kind,
            type_name,
            target,
            pause_before_secs: object
                .get("pause_before_secs")
                .filter(|v| !v.is_null())
                .cloned(),
        })
    }
}

/// 마우스 버튼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" | "primary" => Some(MouseButton::Left),
            "right" | "secondary" => Some(MouseButton::Right),
            "middle" => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        })
    }
}

/// `log_message` 액션 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            "CRITICAL" | "FATAL" => Some(LogLevel::Critical),
            _ => None,
        }
    }
}

/// 좌표와 파라미터가 모두 확정된 액션
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAction {
    Click {
        x: i32,
        y: i32,
        button: MouseButton,
        clicks: u32,
        interval_secs: f64,
    },
    TypeText {
        text: String,
        interval_secs: f64,
    },
    PressKey {
        key: String,
    },
    Hotkey {
        keys: Vec<String>,
    },
    LogMessage {
        level: LogLevel,
        message: String,
    },
}

impl ResolvedAction {
    pub fn type_name(&self) -> &'static str {
        match self {
            ResolvedAction::Click { .. } => "click",
            ResolvedAction::TypeText { .. } => "type_text",
            ResolvedAction::PressKey { .. } | ResolvedAction::Hotkey { .. } => "press_key",
            ResolvedAction::LogMessage { .. } => "log_message",
        }
    }
}

/// 액션 백엔드에 전달되는 요청
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// 액션을 발생시킨 규칙 이름
    pub rule_name: String,
    /// 실행 전 대기 시간 (초, 0 이상)
    pub pause_before_secs: f64,
    pub action: ResolvedAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_click_with_target() {
        let spec = ActionSpec::parse(&json!({
            "type": "click",
            "target_relation": "center_of_region",
            "target_region": "button_area",
            "clicks": "2",
            "pause_before_secs": 0.5
        }))
        .unwrap();

        assert_eq!(spec.type_name, "click");
        assert_eq!(spec.target.target_relation.as_deref(), Some("center_of_region"));
        assert_eq!(spec.target.target_region.as_deref(), Some("button_area"));
        assert_eq!(spec.pause_before_secs, Some(json!(0.5)));
        assert!(matches!(
            spec.kind,
            ActionKind::Click { clicks: Some(ref c), .. } if c == &json!("2")
        ));
    }

    #[test]
    fn coordinate_strings_are_coerced() {
        let spec = ActionSpec::parse(&json!({"type": "click", "x": "120", "y": 80.0})).unwrap();
        assert_eq!(spec.target.x, Some(120));
        assert_eq!(spec.target.y, Some(80));
    }

    #[test]
    fn unknown_action_type() {
        let spec = ActionSpec::parse(&json!({"type": "launch_rocket"})).unwrap();
        assert_eq!(spec.kind, ActionKind::Unknown);
        assert!(ActionSpec::parse(&json!({"message": "no type"})).is_err());
    }

    #[test]
    fn level_and_button_parsing() {
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(MouseButton::parse("RIGHT"), Some(MouseButton::Right));
        assert_eq!(MouseButton::parse("side"), None);
    }
}
