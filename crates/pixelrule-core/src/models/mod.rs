//! 도메인 모델.

pub mod action;
pub mod analysis;
pub mod condition;
pub mod lenient;
pub mod profile;
pub mod variables;
