//! 포트 인터페이스 (trait).
//!
//! 엔진이 외부 세계와 만나는 경계.
//! 어댑터 crate(`pixelrule-vision`, `pixelrule-automation`)가 구현하고
//! `pixelrule-app`에서 `Arc<dyn T>` / `Box<dyn T>`로 와이어링한다.
//!
//! 캡처와 액션 실행은 I/O를 기다리므로 `async_trait`을 쓰고,
//! 이미지 분석은 순수 계산이라 동기 trait으로 둔다.

pub mod action_backend;
pub mod analysis;
pub mod capture;
pub mod template_source;
