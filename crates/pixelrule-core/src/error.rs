//! pixelrule 핵심 에러 타입.
//!
//! 어댑터 crate(vision, automation)는 실패를 모두 `CoreError`로 변환해 반환한다.
//! 엔진은 이 에러를 조건/영역/규칙 단위에서 흡수하며 루프 밖으로 전파하지 않는다.

use std::path::PathBuf;

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 화면 캡처 실패
    #[error("캡처 실패: {0}")]
    Capture(String),

    /// 이미지 분석 실패 (평균색, 주요색, 템플릿 매칭)
    #[error("분석 실패: {0}")]
    Analysis(String),

    /// OCR 처리 실패
    #[error("OCR 에러: {0}")]
    OcrError(String),

    /// 템플릿 이미지 로드 실패
    #[error("템플릿 로드 실패 ({}): {message}", path.display())]
    TemplateLoad {
        /// 시도한 파일 경로
        path: PathBuf,
        /// 실패 사유
        message: String,
    },

    /// 액션 백엔드 실행 실패
    #[error("액션 실행 실패: {0}")]
    ActionDispatch(String),

    /// 잘못된 인자 (조건/액션 파라미터)
    #[error("잘못된 인자: {0}")]
    InvalidArguments(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}
