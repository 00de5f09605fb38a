//! # pixelrule-engine
//!
//! 규칙 평가 엔진. 프로필의 규칙에서 영역별 분석 요구를 계산하고,
//! 매 반복마다 캡처 결과에 조건을 평가해 액션 요청을 백엔드로 보낸다.
//!
//! ## 구조
//!
//! - [`dependency`]: 규칙 → 영역별 분석 요구
//! - [`analysis`]: 사전/지연 분석 실행
//! - [`condition`]: 조건 트리 평가, 변수 캡처
//! - [`substitution`]: `{var}` / `{var.key}` 치환
//! - [`coords`]: 액션 좌표 계산
//! - [`evaluator`]: 규칙 평가 및 액션 디스패치
//! - [`template_cache`]: 템플릿 이미지 캐시
//! - [`controller`]: 모니터링 루프와 시작/정지 제어

pub mod analysis;
pub mod condition;
pub mod controller;
pub mod coords;
pub mod dependency;
pub mod evaluator;
pub mod substitution;
pub mod template_cache;

#[cfg(test)]
mod testing;
