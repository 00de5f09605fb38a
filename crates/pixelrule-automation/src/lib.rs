//! # pixelrule-automation
//!
//! 액션 백엔드 크레이트.
//! 확정된 액션 요청을 로깅만 하는 드라이런 백엔드와
//! enigo 기반 실제 마우스/키보드 입력 백엔드(`enigo` feature)를 제공한다.

pub mod dry_run;
#[cfg(feature = "enigo")]
pub mod enigo_backend;
pub mod factory;
mod support;
