//! 플레이스홀더 치환.
//!
//! 문법: `{identifier(.segment)*}`, identifier/segment는 `[A-Za-z0-9_]+`.
//! segment는 객체에서는 키, 배열에서는 숫자 인덱스로 해석한다.
//! 해석에 실패한 플레이스홀더는 원문 그대로 남긴다.
//! 문자열 값은 그대로, 그 외 값은 JSON 텍스트로 삽입한다.

use serde_json::Value;
use tracing::debug;

use pixelrule_core::models::lenient::value_to_display;
use pixelrule_core::models::variables::VariableContext;

/// JSON 값 전체에 치환 적용 (문자열, 배열, 객체 값 재귀). 객체 키는 건드리지 않는다.
pub fn substitute(value: &Value, variables: &VariableContext) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_str(s, variables)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute(item, variables))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), substitute(item, variables)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// 문자열 하나에 치환 적용
pub fn substitute_str(text: &str, variables: &VariableContext) -> String {
    if !text.contains('{') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        match scan_placeholder(candidate) {
            Some((len, path)) => {
                let placeholder = &candidate[..len];
                match lookup(&path, variables) {
                    Some(value) => out.push_str(&value_to_display(value)),
                    None => {
                        debug!(placeholder, "변수를 찾을 수 없어 플레이스홀더 유지");
                        out.push_str(placeholder);
                    }
                }
                rest = &candidate[len..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `{`로 시작하는 입력에서 플레이스홀더 하나를 읽는다.
///
/// 성공하면 (`}`까지 포함한 바이트 길이, 경로 segment 목록)
fn scan_placeholder(input: &str) -> Option<(usize, Vec<&str>)> {
    let bytes = input.as_bytes();
    debug_assert_eq!(bytes.first(), Some(&b'{'));

    let mut path = Vec::new();
    let mut pos = 1;
    loop {
        let start = pos;
        while pos < bytes.len() && is_word_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        path.push(&input[start..pos]);

        match bytes.get(pos) {
            Some(b'.') => pos += 1,
            Some(b'}') => return Some((pos + 1, path)),
            _ => return None,
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn lookup<'a>(path: &[&str], variables: &'a VariableContext) -> Option<&'a Value> {
    let (name, segments) = path.split_first()?;
    let mut current = variables.get(name)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) if segment.bytes().all(|b| b.is_ascii_digit()) => {
                items.get(segment.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}
