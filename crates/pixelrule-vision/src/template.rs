//! 템플릿 매칭: 정규화 상관계수 (채널별 평균 제거, 3채널 합산).
//!
//! 창(window) 합계는 적분 영상으로 O(1)에 구한다.

use image::RgbImage;
use tracing::debug;

use pixelrule_core::models::analysis::TemplateMatch;

/// 평탄 판정 기준 (분산 합)
const FLAT_EPSILON: f64 = 1e-6;

/// 채널별 합과 제곱합(3채널 합산)의 적분 영상
struct Integral {
    stride: usize,
    sums: [Vec<f64>; 3],
    sq: Vec<f64>,
}

impl Integral {
    fn new(image: &RgbImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let size = stride * (h + 1);
        let mut sums = [vec![0f64; size], vec![0f64; size], vec![0f64; size]];
        let mut sq = vec![0f64; size];

        for y in 0..h {
            let mut row = [0f64; 3];
            let mut row_sq = 0f64;
            for x in 0..w {
                let p = image.get_pixel(x as u32, y as u32).0;
                for c in 0..3 {
                    let v = f64::from(p[c]);
                    row[c] += v;
                    row_sq += v * v;
                }
                let idx = (y + 1) * stride + x + 1;
                for c in 0..3 {
                    sums[c][idx] = sums[c][idx - stride] + row[c];
                }
                sq[idx] = sq[idx - stride] + row_sq;
            }
        }
        Self { stride, sums, sq }
    }

    fn rect(&self, table: &[f64], x: usize, y: usize, w: usize, h: usize) -> f64 {
        let s = self.stride;
        table[(y + h) * s + x + w] - table[y * s + x + w] - table[(y + h) * s + x] + table[y * s + x]
    }
}

/// 점수 맵 계산. `(tw, th)`가 이미지보다 크면 `None`
fn score_map(image: &RgbImage, template: &RgbImage) -> Option<(usize, usize, Vec<f64>)> {
    let (iw, ih) = (image.width() as usize, image.height() as usize);
    let (tw, th) = (template.width() as usize, template.height() as usize);
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return None;
    }

    let n = (tw * th) as f64;
    let mut t_mean = [0f64; 3];
    for p in template.pixels() {
        for c in 0..3 {
            t_mean[c] += f64::from(p.0[c]);
        }
    }
    t_mean.iter_mut().for_each(|m| *m /= n);

    let t_centered: Vec<[f64; 3]> = template
        .pixels()
        .map(|p| [0, 1, 2].map(|c| f64::from(p.0[c]) - t_mean[c]))
        .collect();
    let t_var: f64 = t_centered.iter().flatten().map(|v| v * v).sum();
    let t_flat = t_var < FLAT_EPSILON;

    let integral = Integral::new(image);
    let (rw, rh) = (iw - tw + 1, ih - th + 1);
    let mut scores = vec![0f64; rw * rh];

    for y in 0..rh {
        for x in 0..rw {
            let w_sums = [0, 1, 2].map(|c| integral.rect(&integral.sums[c], x, y, tw, th));
            let w_sq = integral.rect(&integral.sq, x, y, tw, th);
            let w_var = (w_sq - w_sums.iter().map(|s| s * s / n).sum::<f64>()).max(0.0);

            let score = if t_flat || w_var < FLAT_EPSILON {
                // 한쪽이라도 평탄하면 상관계수가 정의되지 않음: 둘 다 평탄하고 같은 색일 때만 일치
                let same_color = (0..3).all(|c| (w_sums[c] / n - t_mean[c]).abs() < 1.0);
                if t_flat && w_var < FLAT_EPSILON && same_color {
                    1.0
                } else {
                    0.0
                }
            } else {
                let mut cross = 0f64;
                for ty in 0..th {
                    for tx in 0..tw {
                        let p = image.get_pixel((x + tx) as u32, (y + ty) as u32).0;
                        let t = &t_centered[ty * tw + tx];
                        cross += t[0] * f64::from(p[0]) + t[1] * f64::from(p[1]) + t[2] * f64::from(p[2]);
                    }
                }
                (cross / (t_var * w_var).sqrt()).clamp(-1.0, 1.0)
            };
            scores[y * rw + x] = score;
        }
    }
    Some((rw, rh, scores))
}

/// `min_confidence` 이상인 매칭 위치 (신뢰도 내림차순, 최대 `max_matches`개).
///
/// 이미 채택된 매칭과 겹치는 후보는 버린다.
pub fn match_template(
    image: &RgbImage,
    template: &RgbImage,
    min_confidence: f64,
    max_matches: usize,
) -> Vec<TemplateMatch> {
    let Some((rw, _rh, scores)) = score_map(image, template) else {
        debug!(
            image = %format!("{}x{}", image.width(), image.height()),
            template = %format!("{}x{}", template.width(), template.height()),
            "템플릿이 이미지보다 커서 매칭 생략"
        );
        return Vec::new();
    };

    let mut candidates: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| *score >= min_confidence)
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let (tw, th) = (template.width(), template.height());
    let mut accepted: Vec<TemplateMatch> = Vec::new();
    for (idx, score) in candidates {
        if accepted.len() >= max_matches {
            break;
        }
        let (x, y) = ((idx % rw) as u32, (idx / rw) as u32);
        let overlaps = accepted
            .iter()
            .any(|m| x.abs_diff(m.x) < tw && y.abs_diff(m.y) < th);
        if !overlaps {
            accepted.push(TemplateMatch {
                x,
                y,
                width: tw,
                height: th,
                confidence: score,
            });
        }
    }

    if let Some(best) = accepted.first() {
        debug!(
            count = accepted.len(),
            best_x = best.x,
            best_y = best.y,
            confidence = best.confidence,
            "템플릿 매칭"
        );
    }
    accepted
}
