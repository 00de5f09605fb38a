//! 규칙 평가기.
//!
//! 규칙마다: 조건 평가 → (충족 시) 변수 치환된 액션 파싱 → 좌표 계산 → 백엔드 실행.
//! 규칙 하나의 실패는 다음 규칙에 영향을 주지 않는다.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use pixelrule_core::models::action::{
    ActionKind, ActionRequest, ActionSpec, LogLevel, MouseButton, ResolvedAction,
};
use pixelrule_core::models::analysis::RegionBundles;
use pixelrule_core::models::lenient::{
    secs_to_duration, split_string_list, value_as_f64, value_as_i64, value_to_display,
};
use pixelrule_core::models::profile::Rule;
use pixelrule_core::ports::action_backend::ActionBackend;
use pixelrule_core::profile_loader::LoadedProfile;

use crate::condition::{ConditionEvaluator, RuleScope};
use crate::coords::{resolve_target, target_region_name, TargetRelation};
use crate::substitution::substitute;

/// 연속 클릭 기본 간격 (초)
const DEFAULT_CLICK_INTERVAL_SECS: f64 = 0.1;
/// 타이핑 기본 글자 간격 (초)
const DEFAULT_TYPE_INTERVAL_SECS: f64 = 0.01;

/// 규칙 하나의 평가 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub matched: bool,
    pub dispatched: bool,
    pub failed: bool,
}

/// 규칙 전체 평가 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RulesSummary {
    pub rules_evaluated: usize,
    pub rules_matched: usize,
    pub actions_dispatched: usize,
    pub actions_failed: usize,
}

pub struct RuleEvaluator {
    profile: Arc<LoadedProfile>,
    conditions: ConditionEvaluator,
    backend: Arc<dyn ActionBackend>,
    default_button: MouseButton,
}

impl RuleEvaluator {
    pub fn new(
        profile: Arc<LoadedProfile>,
        conditions: ConditionEvaluator,
        backend: Arc<dyn ActionBackend>,
    ) -> Self {
        Self {
            profile,
            conditions,
            backend,
            default_button: MouseButton::Left,
        }
    }

    /// `button`이 없는 `click` 액션에 쓸 버튼
    pub fn with_default_button(mut self, button: MouseButton) -> Self {
        self.default_button = button;
        self
    }

    /// 프로필 순서대로 모든 규칙 평가
    pub async fn evaluate_all(&mut self, bundles: &mut RegionBundles) -> RulesSummary {
        let profile = self.profile.clone();
        let mut summary = RulesSummary::default();

        for rule in &profile.profile.rules {
            let outcome = self.evaluate_rule(rule, bundles).await;
            summary.rules_evaluated += 1;
            summary.rules_matched += usize::from(outcome.matched);
            summary.actions_dispatched += usize::from(outcome.dispatched);
            summary.actions_failed += usize::from(outcome.failed);
        }
        summary
    }

    pub async fn evaluate_rule(&mut self, rule: &Rule, bundles: &mut RegionBundles) -> RuleOutcome {
        let mut scope = RuleScope::new(rule.name.as_str());
        let default_region = rule.region.as_deref();

        if !self
            .conditions
            .evaluate(&rule.condition, default_region, bundles, &mut scope)
        {
            debug!(rule = %rule.name, "조건 불충족");
            return RuleOutcome::default();
        }

        info!(rule = %rule.name, variables = ?scope.variables.names(), "규칙 조건 충족");
        let mut outcome = RuleOutcome {
            matched: true,
            ..RuleOutcome::default()
        };

        let action_value = substitute(&rule.action, &scope.variables);
        let spec = match ActionSpec::parse(&action_value) {
            Ok(spec) => spec,
            Err(e) => {
                warn!(rule = %rule.name, "잘못된 액션: {e}");
                return outcome;
            }
        };

        let Some(request) = self.build_request(&spec, &scope, default_region) else {
            return outcome;
        };

        match self.backend.execute(&request).await {
            Ok(()) => {
                info!(
                    rule = %rule.name,
                    action = request.action.type_name(),
                    backend = self.backend.name(),
                    "액션 실행 완료"
                );
                outcome.dispatched = true;
            }
            Err(e) => {
                error!(rule = %rule.name, action = request.action.type_name(), "액션 실행 실패: {e}");
                outcome.failed = true;
            }
        }
        outcome
    }

    /// 파라미터 해석 + 좌표 계산. 실행할 수 없으면 `None`
    fn build_request(
        &self,
        spec: &ActionSpec,
        scope: &RuleScope,
        default_region: Option<&str>,
    ) -> Option<ActionRequest> {
        let rule = scope.rule_name.as_str();

        let action = match &spec.kind {
            ActionKind::Click {
                button,
                clicks,
                interval,
            } => {
                let relation = TargetRelation::parse(spec.target.target_relation.as_deref());
                let region = relation.and_then(|relation| {
                    target_region_name(&spec.target, relation, &scope.last_match, default_region)
                        .and_then(|name| self.profile.profile.region(name))
                });
                let Some((x, y)) = resolve_target(&spec.target, &scope.last_match, region) else {
                    error!(rule, "클릭 좌표를 계산할 수 없어 액션 건너뜀");
                    return None;
                };

                let button = match button {
                    None => self.default_button,
                    Some(raw) => MouseButton::parse(&value_to_display(raw)).unwrap_or_else(|| {
                        warn!(rule, button = %raw, "알 수 없는 버튼, 기본값 사용");
                        self.default_button
                    }),
                };
                let clicks = clicks
                    .as_ref()
                    .map(|raw| {
                        value_as_i64(raw)
                            .filter(|c| *c >= 1)
                            .and_then(|c| u32::try_from(c).ok())
                            .unwrap_or_else(|| {
                                warn!(rule, clicks = %raw, "잘못된 clicks, 1 사용");
                                1
                            })
                    })
                    .unwrap_or(1);

                ResolvedAction::Click {
                    x,
                    y,
                    button,
                    clicks,
                    interval_secs: non_negative_secs(
                        interval.as_ref(),
                        DEFAULT_CLICK_INTERVAL_SECS,
                        rule,
                        "interval",
                    ),
                }
            }

            ActionKind::TypeText { text, interval } => {
                let Some(text) = text.as_ref().filter(|t| !t.is_null()) else {
                    error!(rule, "type_text에 text가 없음");
                    return None;
                };
                ResolvedAction::TypeText {
                    text: value_to_display(text),
                    interval_secs: non_negative_secs(
                        interval.as_ref(),
                        DEFAULT_TYPE_INTERVAL_SECS,
                        rule,
                        "interval",
                    ),
                }
            }

            ActionKind::PressKey { key } => match key {
                Some(Value::Array(_)) => {
                    let keys = key.as_ref().map(split_string_list).unwrap_or_default();
                    if keys.is_empty() {
                        error!(rule, "press_key 키 목록이 비어 있음");
                        return None;
                    }
                    ResolvedAction::Hotkey { keys }
                }
                Some(raw) => {
                    let key = value_to_display(raw).trim().to_string();
                    if key.is_empty() {
                        error!(rule, "press_key에 key가 없음");
                        return None;
                    }
                    ResolvedAction::PressKey { key }
                }
                None => {
                    error!(rule, "press_key에 key가 없음");
                    return None;
                }
            },

            ActionKind::LogMessage { message, level } => {
                let level = match level {
                    None => LogLevel::Info,
                    Some(raw) => LogLevel::parse(&value_to_display(raw)).unwrap_or_else(|| {
                        warn!(rule, level = %raw, "알 수 없는 로그 레벨, INFO 사용");
                        LogLevel::Info
                    }),
                };
                ResolvedAction::LogMessage {
                    level,
                    message: message.as_ref().map(value_to_display).unwrap_or_default(),
                }
            }

            ActionKind::Unknown => {
                error!(rule, action = %spec.type_name, "알 수 없는 액션 타입, 건너뜀");
                return None;
            }
        };

        Some(ActionRequest {
            rule_name: scope.rule_name.clone(),
            pause_before_secs: non_negative_secs(spec.pause_before_secs.as_ref(), 0.0, rule, "pause_before_secs"),
            action,
        })
    }
}

/// `Duration`으로 표현 가능한 0 이상의 초 값. 없으면 기본값, 잘못된 값이면 경고 후 기본값
fn non_negative_secs(raw: Option<&Value>, default: f64, rule: &str, field: &str) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match value_as_f64(raw) {
        Some(secs) if secs_to_duration(secs).is_some() => secs,
        _ => {
            warn!(rule, field, value = %raw, default, "잘못된 시간 값, 기본값 사용");
            default
        }
    }
}
