//! # pixelrule-core
//!
//! pixelrule 도메인 모델, 포트(trait) 정의, 에러 타입, 설정.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 프로필, 조건, 액션, 분석 결과, 변수 컨텍스트
//! - [`ports`]: 캡처/분석/액션/템플릿 포트 인터페이스
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)
//! - [`profile_loader`]: 프로필 JSON 로드 및 검증

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
pub mod profile_loader;
