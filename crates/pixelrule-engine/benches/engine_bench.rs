//! pixelrule-engine 성능 벤치마크
//!
//! 실행: cargo bench -p pixelrule-engine
//!
//! 벤치마크 대상:
//! - 플레이스홀더 치환 (substitute_str, substitute)
//! - 분석 의존성 계산 (dependency::resolve)

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pixelrule_core::models::profile::Rule;
use pixelrule_core::models::variables::VariableContext;
use pixelrule_engine::{dependency, substitution};
use serde_json::json;

fn variables() -> VariableContext {
    let mut vars = VariableContext::new();
    vars.insert("name", json!("player_one"));
    vars.insert("hit", json!({"x": 10, "y": 15, "width": 20, "height": 10, "confidence": 0.93}));
    vars.insert("count", json!(42));
    vars
}

/// 규칙 n개 생성: 영역 4개에 분석 종류를 돌려가며 배정
fn make_rules(n: usize) -> Vec<Rule> {
    let types = ["ocr_contains_text", "average_color_is", "dominant_color_matches", "pixel_color"];
    (0..n)
        .map(|i| {
            let leaf = |j: usize| json!({"type": types[(i + j) % types.len()], "region": format!("r{}", (i + j) % 4)});
            Rule {
                name: format!("rule_{i}"),
                region: Some(format!("r{}", i % 4)),
                condition: json!({
                    "logical_operator": "OR",
                    "sub_conditions": [leaf(0), {"logical_operator": "AND", "sub_conditions": [leaf(1), leaf(2)]}]
                }),
                action: json!({"type": "log_message", "message": "x"}),
            }
        })
        .collect()
}

fn bench_substitution(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitution");
    let vars = variables();

    group.bench_function("plain_text", |b| {
        b.iter(|| substitution::substitute_str(black_box("no placeholders in this string"), &vars))
    });
    group.bench_function("mixed_placeholders", |b| {
        b.iter(|| {
            substitution::substitute_str(
                black_box("{name} hit at {hit.x},{hit.y} ({hit.confidence}) x{count} {missing}"),
                &vars,
            )
        })
    });

    let params = json!({
        "type": "type_text",
        "text": "hello {name}",
        "nested": {"list": ["{hit.width}", "{hit.height}", 3, null]}
    });
    group.bench_function("json_tree", |b| {
        b.iter(|| substitution::substitute(black_box(&params), &vars))
    });

    group.finish();
}

fn bench_dependency(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_resolve");
    for n in [10usize, 100, 1_000] {
        let rules = make_rules(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rules, |b, rules| {
            b.iter(|| dependency::resolve(black_box(rules)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_substitution, bench_dependency);
criterion_main!(benches);
