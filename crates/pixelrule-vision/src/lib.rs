//! # pixelrule-vision
//!
//! 화면 영역 캡처와 이미지 분석 크레이트.
//! xcap 캡처, 평균색/주요색, 템플릿 매칭, Tesseract OCR(`ocr` feature)을 담당한다.

pub mod analyzer;
pub mod capture;
pub mod color;
pub mod ocr;
pub mod template;
