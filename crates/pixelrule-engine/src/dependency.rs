//! 사전 분석 의존성 분석기.
//!
//! 프로필 로드 시 한 번 규칙 전체를 훑어 영역별로 필요한 사전(eager) 분석을 계산한다.
//! 여기서 빠진 분석도 조건 평가 시 지연(lazy) 계산으로 보충되므로
//! 결과는 최적화 힌트일 뿐 제약이 아니다.

use serde_json::Value;
use tracing::{debug, warn};

use pixelrule_core::models::analysis::{AnalysisKind, AnalysisRequirements};
use pixelrule_core::models::condition::{peek_region, peek_sub_conditions, peek_type};
use pixelrule_core::models::profile::Rule;

/// 규칙 목록 → 영역별 사전 분석 요구사항
///
/// 결정적이며 같은 입력에 대해 항상 같은 결과를 낸다.
pub fn resolve(rules: &[Rule]) -> AnalysisRequirements {
    let mut requirements = AnalysisRequirements::new();

    for rule in rules {
        if rule.condition.is_null() {
            warn!(rule = %rule.name, "조건이 없는 규칙");
            continue;
        }
        collect(&rule.condition, rule, rule.region.as_deref(), &mut requirements);
    }

    debug!(
        regions = requirements.len(),
        "사전 분석 요구사항 계산 완료: {}",
        describe(&requirements)
    );
    requirements
}

fn collect(
    condition: &Value,
    rule: &Rule,
    default_region: Option<&str>,
    requirements: &mut AnalysisRequirements,
) {
    if let Some(sub_conditions) = peek_sub_conditions(condition) {
        for sub in sub_conditions {
            collect(sub, rule, default_region, requirements);
        }
        return;
    }

    let Some(condition_type) = peek_type(condition) else {
        warn!(rule = %rule.name, "type 없는 조건은 의존성 분석에서 제외");
        return;
    };
    let Some(kind) = AnalysisKind::for_condition_type(&condition_type) else {
        return;
    };

    let region = peek_region(condition).or_else(|| default_region.map(str::to_string));
    match region {
        Some(region) => {
            requirements.entry(region).or_default().insert(kind);
        }
        None => {
            warn!(
                rule = %rule.name,
                condition = %condition_type,
                "영역을 결정할 수 없어 사전 분석 요구사항에 반영하지 않음"
            );
        }
    }
}

/// 로그/CLI 출력용 요약 (`region: [kind, ...]`, 영역 이름순)
pub fn describe(requirements: &AnalysisRequirements) -> String {
    let mut regions: Vec<&String> = requirements.keys().collect();
    regions.sort();
    regions
        .into_iter()
        .map(|region| {
            let kinds: Vec<&str> = requirements[region].iter().map(AnalysisKind::as_str).collect();
            format!("{region}: [{}]", kinds.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn rule(name: &str, region: Option<&str>, condition: Value) -> Rule {
        Rule {
            name: name.to_string(),
            region: region.map(str::to_string),
            condition,
            action: json!({"type": "log_message", "message": "x"}),
        }
    }

    fn sample_rules() -> Vec<Rule> {
        vec![
            rule(
                "ocr_rule",
                Some("status"),
                json!({"type": "ocr_contains_text", "text_to_find": "ok"}),
            ),
            rule(
                "compound",
                Some("status"),
                json!({
                    "logical_operator": "AND",
                    "sub_conditions": [
                        {"type": "average_color_is", "expected_bgr": [0, 0, 0]},
                        {"type": "dominant_color_matches", "region": "hud", "expected_bgr": [1, 1, 1]},
                        {
                            "logical_operator": "OR",
                            "sub_conditions": [
                                {"type": "ocr_contains_text", "region": "chat", "text_to_find": "hi"},
                                {"type": "template_match_found", "template_filename": "a.png"}
                            ]
                        }
                    ]
                }),
            ),
            rule("pixel", Some("other"), json!({"type": "pixel_color"})),
        ]
    }

    #[test]
    fn maps_leaf_types_to_regions_recursively() {
        let requirements = resolve(&sample_rules());

        assert_eq!(
            requirements["status"],
            BTreeSet::from([AnalysisKind::Ocr, AnalysisKind::AverageColor])
        );
        assert_eq!(requirements["hud"], BTreeSet::from([AnalysisKind::DominantColor]));
        assert_eq!(requirements["chat"], BTreeSet::from([AnalysisKind::Ocr]));
        assert!(!requirements.contains_key("other"));
    }

    #[test]
    fn resolution_is_deterministic_and_idempotent() {
        let rules = sample_rules();
        let first = resolve(&rules);
        let second = resolve(&rules);
        assert_eq!(first, second);
        assert_eq!(describe(&first), describe(&second));
    }

    #[test]
    fn leaf_without_any_region_contributes_nothing() {
        let rules = vec![rule(
            "orphan",
            None,
            json!({"type": "average_color_is", "expected_bgr": [0, 0, 0]}),
        )];
        assert!(resolve(&rules).is_empty());
    }

    #[test]
    fn describe_is_sorted() {
        let requirements = resolve(&sample_rules());
        assert_eq!(
            describe(&requirements),
            "chat: [ocr]; hud: [dominant_color]; status: [ocr, average_color]"
        );
    }
}
