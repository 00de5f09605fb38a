//! 영역 분석 결과 모델.
//!
//! 색상(BGR), 주요 색상, 템플릿 매칭, OCR 결과와
//! 반복(iteration)마다 새로 만들어지는 영역 데이터 묶음을 정의한다.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use image::RgbImage;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::lenient;

/// BGR 색상 (프로필 파일은 `[B, G, R]` 순서로 기록한다)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bgr {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Bgr {
    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Self { b, g, r }
    }

    /// RGB 픽셀 → BGR
    pub fn from_rgb(pixel: &image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { b, g, r }
    }

    /// 채널별 절대 차이가 모두 `tolerance` 이하인지
    pub fn within(&self, expected: &Bgr, tolerance: i32) -> bool {
        let diff = |a: u8, e: u8| (i32::from(a) - i32::from(e)).abs();
        diff(self.b, expected.b) <= tolerance
            && diff(self.g, expected.g) <= tolerance
            && diff(self.r, expected.r) <= tolerance
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }
}

impl fmt::Display for Bgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.b, self.g, self.r)
    }
}

impl Serialize for Bgr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bgr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let items = value
            .as_array()
            .filter(|items| items.len() == 3)
            .ok_or_else(|| D::Error::custom(format!("BGR 값은 3개 원소 배열이어야 함: {value}")))?;

        let mut channels = [0u8; 3];
        for (slot, item) in channels.iter_mut().zip(items) {
            *slot = lenient::value_as_i64(item)
                .and_then(|c| u8::try_from(c).ok())
                .ok_or_else(|| D::Error::custom(format!("BGR 채널 범위(0-255) 벗어남: {item}")))?;
        }
        Ok(Bgr::new(channels[0], channels[1], channels[2]))
    }
}

/// 주요 색상 (k-means 클러스터 하나)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// 클러스터 중심 색상
    pub color: Bgr,
    /// 전체 픽셀 대비 비율 (0.0 ~ 100.0)
    pub percentage: f64,
}

/// 템플릿 매칭 결과 (영역 이미지 기준 상대 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// 정규화 상관계수 (0.0 ~ 1.0)
    pub confidence: f64,
}

/// OCR 추출 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// 추출된 전체 텍스트
    pub text: String,
    /// 단어 평균 신뢰도 (0.0 ~ 100.0)
    pub average_confidence: f64,
}

/// 사전(eager) 분석 종류
///
/// 조건 타입 → 분석 종류 매핑의 유일한 출처.
/// 의존성 분석기와 조건 평가기의 지연(lazy) 폴백이 모두 이 매핑을 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Ocr,
    DominantColor,
    AverageColor,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Ocr,
        AnalysisKind::DominantColor,
        AnalysisKind::AverageColor,
    ];

    /// 조건 타입 문자열에 필요한 사전 분석
    ///
    /// `pixel_color`, `template_match_found`, `always_true`는 사전 분석이 필요 없다.
    pub fn for_condition_type(condition_type: &str) -> Option<Self> {
        match condition_type {
            "ocr_contains_text" => Some(AnalysisKind::Ocr),
            "dominant_color_matches" => Some(AnalysisKind::DominantColor),
            "average_color_is" => Some(AnalysisKind::AverageColor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Ocr => "ocr",
            AnalysisKind::DominantColor => "dominant_color",
            AnalysisKind::AverageColor => "average_color",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 영역별 사전 분석 요구사항 (영역 이름 → 분석 종류 집합)
pub type AnalysisRequirements = HashMap<String, BTreeSet<AnalysisKind>>;

/// 한 번의 반복에서 영역 하나에 대해 수집된 데이터
///
/// 매 반복마다 새로 만들어지고 규칙 평가가 끝나면 버려진다.
#[derive(Debug, Clone, Default)]
pub struct RegionData {
    /// 캡처 이미지 (캡처 실패 시 `None`)
    pub image: Option<Arc<RgbImage>>,
    /// 이번 반복에서 캡처가 실패했는지
    pub capture_failed: bool,
    pub average_color: Option<Bgr>,
    pub ocr: Option<OcrOutput>,
    pub dominant_colors: Option<Vec<DominantColor>>,
}

impl RegionData {
    /// 캡처 성공 데이터
    pub fn captured(image: RgbImage) -> Self {
        Self {
            image: Some(Arc::new(image)),
            ..Self::default()
        }
    }

    /// 캡처 실패 데이터: 이미지와 분석 결과 모두 없음
    pub fn failed() -> Self {
        Self {
            capture_failed: true,
            ..Self::default()
        }
    }

    /// 해당 분석 결과가 이미 채워져 있는지
    pub fn has(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::Ocr => self.ocr.is_some(),
            AnalysisKind::DominantColor => self.dominant_colors.is_some(),
            AnalysisKind::AverageColor => self.average_color.is_some(),
        }
    }
}

/// 영역 이름 → 이번 반복의 영역 데이터
pub type RegionBundles = HashMap<String, RegionData>;

/// 규칙 평가 중 가장 최근의 템플릿 매칭 정보
///
/// 규칙마다 초기화되며 `center_of_last_match` 계열 액션 좌표 계산에 쓰인다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchInfo {
    pub found: bool,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f64,
    /// 매칭이 일어난 영역 이름
    pub region: Option<String>,
}

impl MatchInfo {
    pub fn from_match(region: &str, m: &TemplateMatch) -> Self {
        Self {
            found: true,
            x: m.x,
            y: m.y,
            width: m.width,
            height: m.height,
            confidence: m.confidence,
            region: Some(region.to_string()),
        }
    }
}
