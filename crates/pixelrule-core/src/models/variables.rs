//! 규칙 단위 변수 컨텍스트.
//!
//! `capture_as`로 저장된 값은 같은 규칙의 이후 하위 조건과 액션에서
//! `{name}` 또는 `{name.path}` 형태로 참조된다. 규칙마다 새로 만든다.

use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    values: HashMap<String, Value>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 변수 저장 (같은 이름은 덮어씀)
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// 변수 이름 목록 (로그용, 정렬됨)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<(String, Value)> for VariableContext {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
