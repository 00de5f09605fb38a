//! 규칙 조건 모델.
//!
//! 조건은 두 가지 형태를 가진다.
//! - 단일 조건: `{"type": ..., 파라미터..., "region"?, "capture_as"?}`
//! - 복합 조건: `{"logical_operator": "AND"|"OR", "sub_conditions": [...]}`
//!
//! 복합 조건의 하위 조건은 원본 JSON 그대로 보관한다.
//! 하위 조건마다 평가 직전에 변수 치환을 다시 적용해야 하기 때문이다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::analysis::Bgr;
use super::lenient;
use crate::error::CoreError;

/// 복합 조건 논리 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// 대소문자 무시 파싱 (`"and"`, `"OR"` 등)
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(LogicalOperator::And),
            "OR" => Some(LogicalOperator::Or),
            _ => None,
        }
    }
}

/// 조건 트리 노드
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Single(SingleCondition),
    Compound(CompoundCondition),
}

impl ConditionNode {
    /// JSON 조건 → 노드
    ///
    /// `logical_operator` 또는 `sub_conditions` 키가 있으면 복합 조건으로 본다.
    pub fn parse(value: &Value) -> Result<Self, CoreError> {
        let object = value.as_object().ok_or_else(|| {
            CoreError::InvalidArguments(format!("조건은 JSON 객체여야 함: {value}"))
        })?;

        if object.contains_key("logical_operator") || object.contains_key("sub_conditions") {
            let raw_operator = object
                .get("logical_operator")
                .map(lenient::value_to_display)
                .unwrap_or_default();
            let sub_conditions = match object.get("sub_conditions") {
                Some(Value::Array(items)) => items.clone(),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(CoreError::InvalidArguments(format!(
                        "sub_conditions는 배열이어야 함: {other}"
                    )))
                }
            };
            return Ok(ConditionNode::Compound(CompoundCondition {
                operator: LogicalOperator::parse(&raw_operator),
                raw_operator,
                sub_conditions,
            }));
        }

        SingleCondition::parse(value).map(ConditionNode::Single)
    }
}

/// 복합 조건 (AND/OR)
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCondition {
    /// 해석된 연산자 (`None`이면 잘못된 연산자)
    pub operator: Option<LogicalOperator>,
    /// 로그용 원본 연산자 문자열
    pub raw_operator: String,
    /// 치환 전 하위 조건 원본
    pub sub_conditions: Vec<Value>,
}

/// 단일 조건
#[derive(Debug, Clone, PartialEq)]
pub struct SingleCondition {
    pub kind: ConditionKind,
    /// 원본 `type` 문자열 (알 수 없는 타입 로그용)
    pub type_name: String,
    /// 조건 전용 영역 (없으면 규칙 기본 영역)
    pub region: Option<String>,
    /// 결과를 저장할 변수 이름
    pub capture_as: Option<String>,
}

impl SingleCondition {
    pub fn parse(value: &Value) -> Result<Self, CoreError> {
        let type_name = peek_type(value).ok_or_else(|| {
            CoreError::InvalidArguments(format!("조건에 type 필드가 없음: {value}"))
        })?;
        let kind: ConditionKind = serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::InvalidArguments(format!("'{type_name}' 조건 파라미터 오류: {e}"))
        })?;

        Ok(Self {
            kind,
            type_name,
            region: peek_region(value),
            capture_as: non_empty_string(value.get("capture_as")),
        })
    }
}

/// 조건 종류: 알 수 없는 타입은 `Unknown`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    PixelColor {
        #[serde(default, deserialize_with = "lenient::i32")]
        relative_x: i32,
        #[serde(default, deserialize_with = "lenient::i32")]
        relative_y: i32,
        expected_bgr: Bgr,
        #[serde(default, deserialize_with = "lenient::i32")]
        tolerance: i32,
    },
    AverageColorIs {
        expected_bgr: Bgr,
        #[serde(default = "default_color_tolerance", deserialize_with = "lenient::i32")]
        tolerance: i32,
    },
    TemplateMatchFound {
        /// 템플릿 파일명 (`templates/` 기준)
        #[serde(default)]
        template_filename: Option<String>,
        /// 프로필 `templates` 목록의 이름 (파일명이 없을 때 사용)
        #[serde(default)]
        template_name: Option<String>,
        #[serde(default = "default_min_confidence", deserialize_with = "lenient::f64")]
        min_confidence: f64,
    },
    OcrContainsText {
        #[serde(deserialize_with = "lenient::string_list")]
        text_to_find: Vec<String>,
        #[serde(default, deserialize_with = "lenient::bool")]
        case_sensitive: bool,
        #[serde(default, deserialize_with = "lenient::option_f64")]
        min_ocr_confidence: Option<f64>,
    },
    DominantColorMatches {
        expected_bgr: Bgr,
        #[serde(default = "default_color_tolerance", deserialize_with = "lenient::i32")]
        tolerance: i32,
        #[serde(default = "default_top_n", deserialize_with = "lenient::usize")]
        check_top_n_dominant: usize,
        #[serde(default, deserialize_with = "lenient::f64")]
        min_percentage: f64,
    },
    AlwaysTrue,
    #[serde(other)]
    Unknown,
}

fn default_color_tolerance() -> i32 {
    10
}

fn default_min_confidence() -> f64 {
    0.8
}

fn default_top_n() -> usize {
    1
}

/// 조건 JSON의 `type` 값 (파싱 없이)
pub fn peek_type(value: &Value) -> Option<String> {
    non_empty_string(value.get("type"))
}

/// 조건 JSON의 `region` 값 (파싱 없이)
pub fn peek_region(value: &Value) -> Option<String> {
    non_empty_string(value.get("region"))
}

/// 조건 JSON의 하위 조건 목록 (복합 조건이 아니면 `None`)
pub fn peek_sub_conditions(value: &Value) -> Option<&Vec<Value>> {
    value.get("sub_conditions").and_then(Value::as_array)
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .map(lenient::value_to_display)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_condition_with_defaults() {
        let node = ConditionNode::parse(&json!({
            "type": "average_color_is",
            "expected_bgr": [1, 2, 3],
            "region": "status"
        }))
        .unwrap();

        let ConditionNode::Single(single) = node else {
            panic!("단일 조건이어야 함");
        };
        assert_eq!(single.region.as_deref(), Some("status"));
        assert_eq!(
            single.kind,
            ConditionKind::AverageColorIs {
                expected_bgr: Bgr::new(1, 2, 3),
                tolerance: 10
            }
        );
    }

    #[test]
    fn numeric_strings_in_params_are_coerced() {
        let single = SingleCondition::parse(&json!({
            "type": "pixel_color",
            "relative_x": "4",
            "relative_y": 2.0,
            "expected_bgr": ["10", 20, 30],
            "tolerance": "5"
        }))
        .unwrap();

        assert_eq!(
            single.kind,
            ConditionKind::PixelColor {
                relative_x: 4,
                relative_y: 2,
                expected_bgr: Bgr::new(10, 20, 30),
                tolerance: 5
            }
        );
    }

    #[test]
    fn pixel_offsets_default_to_origin() {
        let single = SingleCondition::parse(&json!({"type": "pixel_color", "expected_bgr": [1, 2, 3]})).unwrap();
        assert_eq!(
            single.kind,
            ConditionKind::PixelColor {
                relative_x: 0,
                relative_y: 0,
                expected_bgr: Bgr::new(1, 2, 3),
                tolerance: 0
            }
        );
    }

    #[test]
    fn unknown_type_maps_to_unknown_variant() {
        let single = SingleCondition::parse(&json!({"type": "teleport", "x": 1})).unwrap();
        assert_eq!(single.kind, ConditionKind::Unknown);
        assert_eq!(single.type_name, "teleport");
    }

    #[test]
    fn missing_required_param_is_an_error() {
        assert!(SingleCondition::parse(&json!({"type": "pixel_color", "relative_x": 1})).is_err());
        assert!(SingleCondition::parse(&json!({"relative_x": 1})).is_err());
    }

    #[test]
    fn compound_keeps_raw_sub_conditions() {
        let node = ConditionNode::parse(&json!({
            "logical_operator": "or",
            "sub_conditions": [{"type": "always_true"}, {"type": "ocr_contains_text", "text_to_find": "{word}"}]
        }))
        .unwrap();

        let ConditionNode::Compound(compound) = node else {
            panic!("복합 조건이어야 함");
        };
        assert_eq!(compound.operator, Some(LogicalOperator::Or));
        assert_eq!(compound.sub_conditions.len(), 2);
        assert_eq!(compound.sub_conditions[1]["text_to_find"], "{word}");
    }

    #[test]
    fn invalid_operator_is_kept_as_none() {
        let node = ConditionNode::parse(&json!({
            "logical_operator": "XOR",
            "sub_conditions": []
        }))
        .unwrap();
        let ConditionNode::Compound(compound) = node else {
            panic!("복합 조건이어야 함");
        };
        assert!(compound.operator.is_none());
        assert_eq!(compound.raw_operator, "XOR");
    }

    #[test]
    fn ocr_text_accepts_comma_string() {
        let single = SingleCondition::parse(&json!({
            "type": "ocr_contains_text",
            "text_to_find": "Start, Begin",
            "capture_as": "label"
        }))
        .unwrap();
        assert_eq!(single.capture_as.as_deref(), Some("label"));
        match single.kind {
            ConditionKind::OcrContainsText {
                text_to_find,
                case_sensitive,
                min_ocr_confidence,
            } => {
                assert_eq!(text_to_find, vec!["Start", "Begin"]);
                assert!(!case_sensitive);
                assert!(min_ocr_confidence.is_none());
            }
            other => panic!("예상치 못한 조건: {other:?}"),
        }
    }
}
