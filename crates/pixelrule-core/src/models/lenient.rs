//! 관대한(lenient) 값 변환.
//!
//! 변수 치환을 거친 조건/액션 파라미터는 숫자가 문자열로 들어오는 경우가 많다
//! (`"{pos.x}"` → `"120"`). 여기의 헬퍼는 숫자와 숫자 문자열을 모두 받아들인다.
//! `option_*` 계열은 해석할 수 없는 값을 `None`으로 돌려주고,
//! 필수 값 계열은 역직렬화 에러를 낸다.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON 값 → f64 (숫자 또는 숫자 문자열)
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// JSON 값 → i64 (`"10.0"` 같은 실수 문자열은 소수점 이하 버림)
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// 초 → `Duration`. 음수, NaN, 무한대, `Duration`으로 표현할 수 없는 큰 값은 `None`
pub fn secs_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// JSON 값 → bool (`true`/`"true"`/`1`)
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// JSON 값 → 표시용 문자열 (문자열은 그대로, 나머지는 JSON 텍스트)
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| D::Error::custom(format!("정수로 해석할 수 없는 값: {value}")))
}

pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_f64(&value)
        .ok_or_else(|| D::Error::custom(format!("실수로 해석할 수 없는 값: {value}")))
}

pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_bool(&value)
        .ok_or_else(|| D::Error::custom(format!("불리언으로 해석할 수 없는 값: {value}")))
}

pub fn u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| D::Error::custom(format!("0 이상의 정수가 아님: {value}")))
}

pub fn usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| D::Error::custom(format!("0 이상의 정수가 아님: {value}")))
}

/// 빈 문자열, `null`, 해석 불가 값 → `None`
pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

pub fn option_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value))
}

/// 공백뿐인 문자열과 `null` → `None`
pub fn option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let s = value_to_display(&value);
    let s = s.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

/// `"a, b"` 또는 `["a", "b"]` → 공백 제거된 비어 있지 않은 문자열 목록
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(split_string_list(&value))
}

pub fn split_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| value_to_display(item).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
