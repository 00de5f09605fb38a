//! 액션 좌표 계산.
//!
//! 액션의 선언적 대상(절대 좌표, 영역 기준, 최근 매칭 기준)을 화면 좌표로 바꾼다.

use tracing::warn;

use pixelrule_core::models::action::ActionTarget;
use pixelrule_core::models::analysis::MatchInfo;
use pixelrule_core::models::profile::Region;

/// 좌표 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRelation {
    Absolute,
    CenterOfRegion,
    OffsetFromRegionTopLeft,
    CenterOfLastMatch,
    OffsetFromLastMatchTopLeft,
}

impl TargetRelation {
    /// `None`(미지정)은 절대 좌표로 본다.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let Some(raw) = raw else {
            return Some(TargetRelation::Absolute);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "absolute" => Some(TargetRelation::Absolute),
            "center_of_region" => Some(TargetRelation::CenterOfRegion),
            "offset_from_region_top_left" | "offset_from_region_tl" | "relative_to_region" => {
                Some(TargetRelation::OffsetFromRegionTopLeft)
            }
            "center_of_last_match" => Some(TargetRelation::CenterOfLastMatch),
            "offset_from_last_match_top_left" | "offset_from_last_match_tl" => {
                Some(TargetRelation::OffsetFromLastMatchTopLeft)
            }
            _ => None,
        }
    }

    pub fn uses_match(self) -> bool {
        matches!(
            self,
            TargetRelation::CenterOfLastMatch | TargetRelation::OffsetFromLastMatchTopLeft
        )
    }
}

/// 대상 영역 이름 선택: `target_region` > (매칭 기준이면) 매칭 영역 > 규칙 기본 영역
pub fn target_region_name<'a>(
    target: &'a ActionTarget,
    relation: TargetRelation,
    match_info: &'a MatchInfo,
    default_region: Option<&'a str>,
) -> Option<&'a str> {
    target
        .target_region
        .as_deref()
        .or_else(|| {
            relation
                .uses_match()
                .then(|| match_info.region.as_deref())
                .flatten()
        })
        .or(default_region)
}

/// 화면 좌표 계산. 계산할 수 없으면 `None` (액션은 건너뜀)
pub fn resolve_target(
    target: &ActionTarget,
    match_info: &MatchInfo,
    region: Option<&Region>,
) -> Option<(i32, i32)> {
    let Some(relation) = TargetRelation::parse(target.target_relation.as_deref()) else {
        warn!(relation = ?target.target_relation, "알 수 없는 target_relation");
        return None;
    };

    let (x, y) = match relation {
        TargetRelation::Absolute => match (target.x, target.y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                warn!("절대 좌표 x/y가 없음");
                return None;
            }
        },
        TargetRelation::CenterOfRegion => {
            let region = require_region(region, relation)?;
            region.center()
        }
        TargetRelation::OffsetFromRegionTopLeft => {
            let region = require_region(region, relation)?;
            let (dx, dy) = offsets(target);
            (i64::from(region.x) + dx, i64::from(region.y) + dy)
        }
        TargetRelation::CenterOfLastMatch | TargetRelation::OffsetFromLastMatchTopLeft => {
            if !match_info.found {
                warn!(?relation, "최근 템플릿 매칭 없음");
                return None;
            }
            let region = require_region(region, relation)?;
            let base_x = i64::from(region.x) + i64::from(match_info.x);
            let base_y = i64::from(region.y) + i64::from(match_info.y);
            if relation == TargetRelation::CenterOfLastMatch {
                (
                    base_x + i64::from(match_info.width / 2),
                    base_y + i64::from(match_info.height / 2),
                )
            } else {
                let (dx, dy) = offsets(target);
                (base_x + dx, base_y + dy)
            }
        }
    };

    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => Some((x, y)),
        _ => {
            warn!(x, y, "좌표가 범위를 벗어남");
            None
        }
    }
}

fn require_region(region: Option<&Region>, relation: TargetRelation) -> Option<&Region> {
    if region.is_none() {
        warn!(?relation, "대상 영역을 찾을 수 없음");
    }
    region
}

/// `offset_x`/`offset_y`, 없으면 `x`/`y`, 그것도 없으면 0
fn offsets(target: &ActionTarget) -> (i64, i64) {
    (
        target.offset_x.or(target.x).unwrap_or(0),
        target.offset_y.or(target.y).unwrap_or(0),
    )
}
