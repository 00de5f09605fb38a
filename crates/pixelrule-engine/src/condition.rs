//! 조건 평가기.
//!
//! 단일 조건과 복합(AND/OR) 조건 트리를 영역 데이터 묶음에 대해 평가한다.
//! 사전 분석 결과가 없으면 분석 제공자에 지연 계산을 요청하고 결과를 묶음에 채운다.
//! 잘못된 조건, 없는 영역, 분석 실패는 모두 해당 조건만 `false`로 만든다.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use pixelrule_core::models::analysis::{AnalysisKind, Bgr, MatchInfo, RegionBundles, RegionData};
use pixelrule_core::models::condition::{
    CompoundCondition, ConditionKind, ConditionNode, LogicalOperator, SingleCondition,
};
use pixelrule_core::models::variables::VariableContext;
use pixelrule_core::ports::analysis::AnalysisProvider;
use pixelrule_core::profile_loader::LoadedProfile;

use crate::analysis;
use crate::substitution::substitute;
use crate::template_cache::TemplateCache;

/// 규칙 하나의 평가 범위: 규칙마다 새로 만든다.
#[derive(Debug, Clone, Default)]
pub struct RuleScope {
    pub rule_name: String,
    pub variables: VariableContext,
    pub last_match: MatchInfo,
}

impl RuleScope {
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            ..Self::default()
        }
    }
}

pub struct ConditionEvaluator {
    analyzer: Arc<dyn AnalysisProvider>,
    templates: TemplateCache,
    profile_identity: PathBuf,
    /// 템플릿 이름 → 파일명
    template_files: HashMap<String, String>,
    dominant_k: usize,
}

impl ConditionEvaluator {
    pub fn new(
        analyzer: Arc<dyn AnalysisProvider>,
        templates: TemplateCache,
        profile: &LoadedProfile,
    ) -> Self {
        Self {
            analyzer,
            templates,
            profile_identity: profile.identity.clone(),
            template_files: profile
                .profile
                .templates
                .iter()
                .map(|t| (t.name.clone(), t.filename.clone()))
                .collect(),
            dominant_k: profile.profile.settings.analysis_dominant_colors_k,
        }
    }

    /// 조건 JSON 평가.
    ///
    /// 단일 조건은 평가 직전에 현재 변수로 치환된다. 복합 조건의 하위 조건도
    /// 각자 차례가 왔을 때 치환되므로 앞선 하위 조건의 `capture_as` 결과를 쓸 수 있다.
    pub fn evaluate(
        &mut self,
        condition: &Value,
        default_region: Option<&str>,
        bundles: &mut RegionBundles,
        scope: &mut RuleScope,
    ) -> bool {
        let is_compound = condition
            .as_object()
            .is_some_and(|o| o.contains_key("logical_operator") || o.contains_key("sub_conditions"));

        let prepared = if is_compound {
            condition.clone()
        } else {
            substitute(condition, &scope.variables)
        };

        match ConditionNode::parse(&prepared) {
            Ok(ConditionNode::Single(single)) => {
                self.evaluate_single(&single, default_region, bundles, scope)
            }
            Ok(ConditionNode::Compound(compound)) => {
                self.evaluate_compound(&compound, default_region, bundles, scope)
            }
            Err(e) => {
                warn!(rule = %scope.rule_name, "잘못된 조건: {e}");
                false
            }
        }
    }

    fn evaluate_compound(
        &mut self,
        compound: &CompoundCondition,
        default_region: Option<&str>,
        bundles: &mut RegionBundles,
        scope: &mut RuleScope,
    ) -> bool {
        let Some(operator) = compound.operator.or_else(|| {
            let substituted = substitute(&Value::String(compound.raw_operator.clone()), &scope.variables);
            substituted.as_str().and_then(LogicalOperator::parse)
        }) else {
            warn!(
                rule = %scope.rule_name,
                operator = %compound.raw_operator,
                "알 수 없는 논리 연산자"
            );
            return false;
        };

        if compound.sub_conditions.is_empty() {
            warn!(rule = %scope.rule_name, "빈 sub_conditions");
            return false;
        }

        for (index, sub) in compound.sub_conditions.iter().enumerate() {
            let result = self.evaluate(sub, default_region, bundles, scope);
            debug!(rule = %scope.rule_name, index, result, ?operator, "하위 조건 평가");

            match (operator, result) {
                (LogicalOperator::And, false) => return false,
                (LogicalOperator::Or, true) => return true,
                _ => {}
            }
        }

        operator == LogicalOperator::And
    }

    fn evaluate_single(
        &mut self,
        condition: &SingleCondition,
        default_region: Option<&str>,
        bundles: &mut RegionBundles,
        scope: &mut RuleScope,
    ) -> bool {
        let type_name = condition.type_name.as_str();
        let region = condition.region.as_deref().or(default_region);

        match condition.kind {
            ConditionKind::Unknown => {
                warn!(rule = %scope.rule_name, condition = type_name, "알 수 없는 조건 타입");
                return false;
            }
            _ => {}
        }

        let Some(region) = region else {
            warn!(rule = %scope.rule_name, condition = type_name, "조건 영역을 결정할 수 없음");
            return false;
        };

        // 영역 데이터는 필요 없지만 영역은 존재해야 한다
        if matches!(condition.kind, ConditionKind::AlwaysTrue) {
            if !bundles.contains_key(region) {
                warn!(rule = %scope.rule_name, region, condition = type_name, "영역 데이터 없음");
                return false;
            }
            return true;
        }

        let Some(data) = bundles.get_mut(region) else {
            warn!(rule = %scope.rule_name, region, condition = type_name, "영역 데이터 없음");
            return false;
        };

        let mut captured: Option<Value> = None;
        let met = match &condition.kind {
            ConditionKind::PixelColor {
                relative_x,
                relative_y,
                expected_bgr,
                tolerance,
            } => pixel_matches(data, *relative_x, *relative_y, expected_bgr, *tolerance, region),

            ConditionKind::AverageColorIs {
                expected_bgr,
                tolerance,
            } => {
                self.ensure(AnalysisKind::AverageColor, region, data, scope)
                    && data
                        .average_color
                        .is_some_and(|actual| actual.within(expected_bgr, *tolerance))
            }

            ConditionKind::TemplateMatchFound {
                template_filename,
                template_name,
                min_confidence,
            } => {
                let filename = template_filename.clone().or_else(|| {
                    template_name
                        .as_ref()
                        .and_then(|name| self.template_files.get(name).cloned())
                });
                match filename {
                    Some(filename) => {
                        let found = self.match_template(data, region, &filename, *min_confidence, scope);
                        if found {
                            let m = &scope.last_match;
                            captured = Some(json!({
                                "x": m.x,
                                "y": m.y,
                                "width": m.width,
                                "height": m.height,
                                "confidence": m.confidence,
                            }));
                        }
                        found
                    }
                    None => {
                        warn!(rule = %scope.rule_name, region, "template_filename/template_name 없음 또는 미등록 템플릿");
                        false
                    }
                }
            }

            ConditionKind::OcrContainsText {
                text_to_find,
                case_sensitive,
                min_ocr_confidence,
            } => {
                if text_to_find.is_empty() {
                    warn!(rule = %scope.rule_name, region, "text_to_find가 비어 있음");
                    false
                } else if !self.ensure(AnalysisKind::Ocr, region, data, scope) {
                    false
                } else {
                    match &data.ocr {
                        Some(ocr) => {
                            let confident = min_ocr_confidence
                                .map_or(true, |min| ocr.average_confidence >= min);
                            if !confident {
                                debug!(
                                    rule = %scope.rule_name,
                                    region,
                                    confidence = ocr.average_confidence,
                                    "OCR 신뢰도 미달"
                                );
                            }
                            let found = confident && contains_any(&ocr.text, text_to_find, *case_sensitive);
                            if found {
                                captured = Some(Value::String(ocr.text.clone()));
                            }
                            found
                        }
                        None => false,
                    }
                }
            }

            ConditionKind::DominantColorMatches {
                expected_bgr,
                tolerance,
                check_top_n_dominant,
                min_percentage,
            } => {
                self.ensure(AnalysisKind::DominantColor, region, data, scope)
                    && data.dominant_colors.as_ref().is_some_and(|colors| {
                        colors.iter().take(*check_top_n_dominant).any(|dc| {
                            dc.color.within(expected_bgr, *tolerance) && dc.percentage >= *min_percentage
                        })
                    })
            }

            ConditionKind::AlwaysTrue | ConditionKind::Unknown => false,
        };

        debug!(rule = %scope.rule_name, region, condition = type_name, met, "조건 평가");

        if met {
            if let (Some(name), Some(value)) = (condition.capture_as.as_deref(), captured) {
                debug!(rule = %scope.rule_name, variable = name, "변수 저장");
                scope.variables.insert(name, value);
            }
        }
        met
    }

    /// 분석 결과 확보 (없으면 지연 계산)
    fn ensure(
        &self,
        kind: AnalysisKind,
        region: &str,
        data: &mut RegionData,
        scope: &RuleScope,
    ) -> bool {
        if data.has(kind) {
            return true;
        }
        if data.image.is_none() {
            warn!(rule = %scope.rule_name, region, analysis = %kind, "이미지가 없어 분석 불가");
            return false;
        }

        debug!(rule = %scope.rule_name, region, analysis = %kind, "사전 분석 없음, 지연 계산");
        match analysis::compute(kind, self.analyzer.as_ref(), self.dominant_k, data) {
            Ok(()) => true,
            Err(e) => {
                warn!(rule = %scope.rule_name, region, analysis = %kind, "지연 분석 실패: {e}");
                false
            }
        }
    }

    fn match_template(
        &mut self,
        data: &RegionData,
        region: &str,
        filename: &str,
        min_confidence: f64,
        scope: &mut RuleScope,
    ) -> bool {
        let Some(image) = data.image.as_ref() else {
            warn!(rule = %scope.rule_name, region, "이미지가 없어 템플릿 매칭 불가");
            scope.last_match = MatchInfo::default();
            return false;
        };
        let Some(template) = self.templates.get(&self.profile_identity, filename) else {
            scope.last_match = MatchInfo::default();
            return false;
        };

        let best = match self.analyzer.match_template(image, &template, min_confidence) {
            Ok(matches) => matches
                .into_iter()
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence)),
            Err(e) => {
                warn!(rule = %scope.rule_name, region, template = filename, "템플릿 매칭 실패: {e}");
                None
            }
        };

        match best {
            Some(m) => {
                debug!(
                    rule = %scope.rule_name,
                    region,
                    template = filename,
                    x = m.x,
                    y = m.y,
                    confidence = m.confidence,
                    "템플릿 발견"
                );
                scope.last_match = MatchInfo::from_match(region, &m);
                true
            }
            None => {
                scope.last_match = MatchInfo::default();
                false
            }
        }
    }
}

fn pixel_matches(
    data: &RegionData,
    relative_x: i32,
    relative_y: i32,
    expected: &Bgr,
    tolerance: i32,
    region: &str,
) -> bool {
    let Some(image) = data.image.as_ref() else {
        warn!(region, "이미지가 없어 pixel_color 평가 불가");
        return false;
    };
    let (Ok(x), Ok(y)) = (u32::try_from(relative_x), u32::try_from(relative_y)) else {
        warn!(region, relative_x, relative_y, "음수 픽셀 좌표");
        return false;
    };
    if x >= image.width() || y >= image.height() {
        warn!(
            region,
            x,
            y,
            width = image.width(),
            height = image.height(),
            "픽셀 좌표가 영역을 벗어남"
        );
        return false;
    }
    Bgr::from_rgb(image.get_pixel(x, y)).within(expected, tolerance)
}

fn contains_any(text: &str, needles: &[String], case_sensitive: bool) -> bool {
    if case_sensitive {
        needles.iter().any(|n| text.contains(n.as_str()))
    } else {
        let haystack = text.to_lowercase();
        needles
            .iter()
            .any(|n| haystack.contains(n.to_lowercase().as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubAnalyzer;
    use image::{Rgb, RgbImage};
    use pixelrule_core::error::CoreError;
    use pixelrule_core::models::analysis::{DominantColor, OcrOutput, TemplateMatch};
    use pixelrule_core::ports::template_source::TemplateSource;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTemplates {
        loads: Arc<AtomicUsize>,
    }

    impl TemplateSource for FixedTemplates {
        fn load(&self, path: &Path) -> Result<RgbImage, CoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if path.ends_with("ok.png") {
                Ok(RgbImage::new(2, 2))
            } else {
                Err(CoreError::TemplateLoad {
                    path: path.to_path_buf(),
                    message: "없음".to_string(),
                })
            }
        }
    }

    fn loaded_profile() -> LoadedProfile {
        let content = json!({
            "templates": [{"name": "ok_button", "filename": "ok.png"}],
            "regions": [
                {"name": "a", "x": 0, "y": 0, "width": 4, "height": 4},
                {"name": "b", "x": 10, "y": 10, "width": 4, "height": 4}
            ]
        })
        .to_string();
        pixelrule_core::profile_loader::parse_profile(&content, Path::new("/profiles/demo")).unwrap()
    }

    fn evaluator(analyzer: StubAnalyzer) -> (ConditionEvaluator, Arc<StubAnalyzer>, Arc<AtomicUsize>) {
        let analyzer = Arc::new(analyzer);
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = TemplateCache::new(Box::new(FixedTemplates { loads: loads.clone() }));
        let evaluator = ConditionEvaluator::new(analyzer.clone(), cache, &loaded_profile());
        (evaluator, analyzer, loads)
    }

    /// BGR (10, 20, 30) 단일 픽셀 영역
    fn one_pixel_bundles() -> RegionBundles {
        let image = RgbImage::from_pixel(1, 1, Rgb([30, 20, 10]));
        RegionBundles::from([("a".to_string(), RegionData::captured(image))])
    }

    fn eval(evaluator: &mut ConditionEvaluator, condition: Value, bundles: &mut RegionBundles) -> (bool, RuleScope) {
        let mut scope = RuleScope::new("test");
        let met = evaluator.evaluate(&condition, Some("a"), bundles, &mut scope);
        (met, scope)
    }

    #[test]
    fn pixel_color_tolerance() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let pixel = |bgr: [u8; 3], tol: i32| {
            json!({"type": "pixel_color", "relative_x": 0, "relative_y": 0, "expected_bgr": bgr, "tolerance": tol})
        };

        assert!(eval(&mut ev, pixel([10, 20, 30], 0), &mut bundles).0);
        assert!(!eval(&mut ev, pixel([11, 20, 30], 0), &mut bundles).0);
        assert!(eval(&mut ev, pixel([11, 20, 30], 1), &mut bundles).0);
    }

    #[test]
    fn pixel_outside_image_is_false() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let condition = json!({"type": "pixel_color", "relative_x": 1, "relative_y": 0, "expected_bgr": [10, 20, 30]});
        assert!(!eval(&mut ev, condition, &mut bundles).0);
        let negative = json!({"type": "pixel_color", "relative_x": -1, "relative_y": 0, "expected_bgr": [10, 20, 30]});
        assert!(!eval(&mut ev, negative, &mut bundles).0);
    }

    #[test]
    fn and_short_circuits_on_first_false() {
        let (mut ev, analyzer, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let condition = json!({
            "logical_operator": "AND",
            "sub_conditions": [
                {"type": "pixel_color", "relative_x": 0, "relative_y": 0, "expected_bgr": [0, 0, 0]},
                {"type": "ocr_contains_text", "text_to_find": "x"}
            ]
        });

        assert!(!eval(&mut ev, condition, &mut bundles).0);
        assert_eq!(analyzer.calls(AnalysisKind::Ocr), 0);
    }

    #[test]
    fn or_short_circuits_on_first_true() {
        let (mut ev, analyzer, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let condition = json!({
            "logical_operator": "OR",
            "sub_conditions": [
                {"type": "always_true"},
                {"type": "average_color_is", "expected_bgr": [0, 0, 0]}
            ]
        });

        assert!(eval(&mut ev, condition, &mut bundles).0);
        assert_eq!(analyzer.total_calls(), 0);
    }

    #[test]
    fn invalid_operator_or_empty_list_is_false() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let xor = json!({"logical_operator": "XOR", "sub_conditions": [{"type": "always_true"}]});
        let empty = json!({"logical_operator": "AND", "sub_conditions": []});
        assert!(!eval(&mut ev, xor, &mut bundles).0);
        assert!(!eval(&mut ev, empty, &mut bundles).0);
    }

    #[test]
    fn unresolvable_sub_region_fails_only_that_branch() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        assert!(!eval(&mut ev, json!({"type": "always_true", "region": "nowhere"}), &mut bundles).0);
        assert!(eval(&mut ev, json!({"type": "always_true"}), &mut bundles).0);

        let condition = json!({
            "logical_operator": "OR",
            "sub_conditions": [
                {"type": "pixel_color", "region": "nowhere", "relative_x": 0, "relative_y": 0, "expected_bgr": [10, 20, 30]},
                {"type": "pixel_color", "region": "a", "relative_x": 0, "relative_y": 0, "expected_bgr": [10, 20, 30]}
            ]
        });
        assert!(eval(&mut ev, condition, &mut bundles).0);
    }

    #[test]
    fn always_true_without_any_region_is_false() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        let mut scope = RuleScope::new("no_region");

        let leaf = json!({"type": "always_true"});
        assert!(!ev.evaluate(&leaf, None, &mut bundles, &mut scope));

        let compound = json!({"logical_operator": "OR", "sub_conditions": [{"type": "always_true"}]});
        assert!(!ev.evaluate(&compound, None, &mut bundles, &mut scope));

        // 조건 자체에 영역이 있으면 규칙 기본 영역은 필요 없다
        let explicit = json!({"type": "always_true", "region": "a"});
        assert!(ev.evaluate(&explicit, None, &mut bundles, &mut scope));
    }

    #[test]
    fn lazy_fallback_computes_once_and_stores_result() {
        let analyzer = StubAnalyzer {
            average: Bgr::new(100, 100, 100),
            ..StubAnalyzer::default()
        };
        let (mut ev, analyzer, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();
        let condition = json!({"type": "average_color_is", "expected_bgr": [105, 95, 100]});

        assert!(eval(&mut ev, condition.clone(), &mut bundles).0);
        assert!(eval(&mut ev, condition, &mut bundles).0);
        assert_eq!(analyzer.calls(AnalysisKind::AverageColor), 1);
        assert!(bundles["a"].average_color.is_some());
    }

    #[test]
    fn missing_image_without_eager_data_is_false() {
        let (mut ev, analyzer, _) = evaluator(StubAnalyzer::default());
        let mut bundles = RegionBundles::from([("a".to_string(), RegionData::failed())]);
        let condition = json!({"type": "average_color_is", "expected_bgr": [0, 0, 0]});
        assert!(!eval(&mut ev, condition, &mut bundles).0);
        assert_eq!(analyzer.total_calls(), 0);
    }

    #[test]
    fn ocr_capture_feeds_later_sub_condition() {
        let analyzer = StubAnalyzer {
            ocr_text: "Level 7 Ready".to_string(),
            ocr_confidence: 90.0,
            ..StubAnalyzer::default()
        };
        let (mut ev, _, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();
        let condition = json!({
            "logical_operator": "AND",
            "sub_conditions": [
                {"type": "ocr_contains_text", "text_to_find": "ready", "capture_as": "label"},
                {"type": "ocr_contains_text", "text_to_find": "{label}", "case_sensitive": true}
            ]
        });

        let (met, scope) = eval(&mut ev, condition, &mut bundles);
        assert!(met);
        assert_eq!(scope.variables.get("label"), Some(&json!("Level 7 Ready")));
    }

    #[test]
    fn ocr_respects_case_and_confidence() {
        let analyzer = StubAnalyzer {
            ocr_text: "Start Game".to_string(),
            ocr_confidence: 40.0,
            ..StubAnalyzer::default()
        };
        let (mut ev, _, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();

        let sensitive = json!({"type": "ocr_contains_text", "text_to_find": "start", "case_sensitive": true});
        assert!(!eval(&mut ev, sensitive, &mut bundles).0);

        let confident = json!({"type": "ocr_contains_text", "text_to_find": "quit, start", "min_ocr_confidence": 50});
        assert!(!eval(&mut ev, confident, &mut bundles).0);

        let list = json!({"type": "ocr_contains_text", "text_to_find": ["quit", "GAME"]});
        assert!(eval(&mut ev, list, &mut bundles).0);
    }

    #[test]
    fn dominant_color_checks_top_n_and_percentage() {
        let analyzer = StubAnalyzer {
            dominant: vec![
                DominantColor { color: Bgr::new(0, 0, 0), percentage: 70.0 },
                DominantColor { color: Bgr::new(200, 0, 0), percentage: 30.0 },
            ],
            ..StubAnalyzer::default()
        };
        let (mut ev, _, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();

        let top1 = json!({"type": "dominant_color_matches", "expected_bgr": [200, 0, 0]});
        assert!(!eval(&mut ev, top1, &mut bundles).0);

        let top2 = json!({"type": "dominant_color_matches", "expected_bgr": [195, 5, 0], "check_top_n_dominant": 2});
        assert!(eval(&mut ev, top2, &mut bundles).0);

        let too_small = json!({
            "type": "dominant_color_matches",
            "expected_bgr": [200, 0, 0],
            "check_top_n_dominant": 2,
            "min_percentage": "50"
        });
        assert!(!eval(&mut ev, too_small, &mut bundles).0);
    }

    #[test]
    fn template_match_updates_match_info_and_capture() {
        let analyzer = StubAnalyzer {
            matches: vec![
                TemplateMatch { x: 1, y: 1, width: 2, height: 2, confidence: 0.85 },
                TemplateMatch { x: 0, y: 2, width: 2, height: 2, confidence: 0.95 },
            ],
            ..StubAnalyzer::default()
        };
        let (mut ev, _, loads) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();
        let condition = json!({"type": "template_match_found", "template_name": "ok_button", "capture_as": "hit"});

        let (met, scope) = eval(&mut ev, condition.clone(), &mut bundles);
        assert!(met);
        assert!(scope.last_match.found);
        assert_eq!(scope.last_match.region.as_deref(), Some("a"));
        assert_eq!((scope.last_match.x, scope.last_match.y), (0, 2));
        assert_eq!(scope.variables.get("hit").unwrap()["confidence"], json!(0.95));

        eval(&mut ev, condition, &mut bundles);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn template_miss_resets_match_info() {
        let analyzer = StubAnalyzer {
            matches: vec![TemplateMatch { x: 1, y: 1, width: 2, height: 2, confidence: 0.5 }],
            ..StubAnalyzer::default()
        };
        let (mut ev, _, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();
        let mut scope = RuleScope::new("t");
        scope.last_match = MatchInfo { found: true, ..MatchInfo::default() };

        let condition = json!({"type": "template_match_found", "template_filename": "ok.png"});
        assert!(!ev.evaluate(&condition, Some("a"), &mut bundles, &mut scope));
        assert_eq!(scope.last_match, MatchInfo::default());

        let missing = json!({"type": "template_match_found", "template_filename": "gone.png", "min_confidence": 0.1});
        assert!(!ev.evaluate(&missing, Some("a"), &mut bundles, &mut scope));
    }

    #[test]
    fn malformed_and_unknown_conditions_are_false() {
        let (mut ev, _, _) = evaluator(StubAnalyzer::default());
        let mut bundles = one_pixel_bundles();
        assert!(!eval(&mut ev, json!({"type": "pixel_color"}), &mut bundles).0);
        assert!(!eval(&mut ev, json!({"type": "mind_reading"}), &mut bundles).0);
        assert!(!eval(&mut ev, json!("always_true"), &mut bundles).0);
        assert!(!eval(&mut ev, json!({"type": "average_color_is", "expected_bgr": [0, 0, 0], "region": "zzz"}), &mut bundles).0);
    }

    #[test]
    fn ocr_analysis_failure_is_false() {
        let analyzer = StubAnalyzer {
            fail_ocr: true,
            ..StubAnalyzer::default()
        };
        let (mut ev, _, _) = evaluator(analyzer);
        let mut bundles = one_pixel_bundles();
        assert!(!eval(&mut ev, json!({"type": "ocr_contains_text", "text_to_find": "a"}), &mut bundles).0);

        // 사전 분석 결과가 있으면 제공자를 부르지 않는다
        bundles.get_mut("a").unwrap().ocr = Some(OcrOutput {
            text: "abc".to_string(),
            average_confidence: 99.0,
        });
        assert!(eval(&mut ev, json!({"type": "ocr_contains_text", "text_to_find": "a"}), &mut bundles).0);
    }
}
