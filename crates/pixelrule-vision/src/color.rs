//! 색상 분석: 평균색, k-means 주요색.

use image::RgbImage;
use tracing::debug;

use pixelrule_core::error::CoreError;
use pixelrule_core::models::analysis::{Bgr, DominantColor};

/// k-means 최대 반복 횟수
const KMEANS_MAX_ITER: usize = 100;
/// 중심 이동량이 이 값 미만이면 수렴
const KMEANS_EPSILON: f64 = 0.2;
/// 큰 영역은 이 개수 이하로 샘플링
const MAX_SAMPLES: usize = 20_000;

/// 영역 평균 색상 (채널별 평균, 소수점 버림)
pub fn average_color(image: &RgbImage) -> Result<Bgr, CoreError> {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return Err(CoreError::Analysis("평균색: 빈 이미지".to_string()));
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    let [r, g, b] = sums.map(|s| (s / total) as u8);
    Ok(Bgr::new(b, g, r))
}

/// 주요 색상 `k`개 (비율 내림차순, 비율은 0–100).
///
/// 초기 중심은 최원점 방식으로 골라 같은 입력에 항상 같은 결과를 낸다.
/// 서로 다른 색이 `k`개보다 적으면 그만큼만 반환한다.
pub fn dominant_colors(image: &RgbImage, k: usize) -> Result<Vec<DominantColor>, CoreError> {
    let total = image.width() as usize * image.height() as usize;
    if total == 0 {
        return Err(CoreError::Analysis("주요색: 빈 이미지".to_string()));
    }
    let k = k.clamp(1, total);

    let step = total.div_ceil(MAX_SAMPLES).max(1);
    let samples: Vec<[f64; 3]> = image
        .pixels()
        .step_by(step)
        .map(|p| {
            let [r, g, b] = p.0;
            [f64::from(b), f64::from(g), f64::from(r)]
        })
        .collect();

    let mut centers = initial_centers(&samples, k);
    let mut labels = vec![0usize; samples.len()];

    for iteration in 0..KMEANS_MAX_ITER {
        for (label, sample) in labels.iter_mut().zip(&samples) {
            *label = nearest(&centers, sample);
        }

        let mut sums = vec![[0f64; 3]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (label, sample) in labels.iter().zip(&samples) {
            counts[*label] += 1;
            for c in 0..3 {
                sums[*label][c] += sample[c];
            }
        }

        let mut shift = 0f64;
        for (i, center) in centers.iter_mut().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            let n = counts[i] as f64;
            let updated = [sums[i][0] / n, sums[i][1] / n, sums[i][2] / n];
            shift = shift.max(distance_sq(center, &updated).sqrt());
            *center = updated;
        }

        if shift < KMEANS_EPSILON {
            debug!(iteration, k = centers.len(), "k-means 수렴");
            break;
        }
    }

    let mut counts = vec![0usize; centers.len()];
    for label in &labels {
        counts[*label] += 1;
    }

    let n = samples.len() as f64;
    let mut result: Vec<DominantColor> = centers
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(center, count)| DominantColor {
            color: Bgr::new(channel(center[0]), channel(center[1]), channel(center[2])),
            percentage: count as f64 / n * 100.0,
        })
        .collect();
    result.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    Ok(result)
}

/// 첫 샘플에서 시작해 기존 중심들에서 가장 먼 샘플을 차례로 추가
fn initial_centers(samples: &[[f64; 3]], k: usize) -> Vec<[f64; 3]> {
    let mut centers = vec![samples[0]];
    let mut nearest_dist: Vec<f64> = samples.iter().map(|s| distance_sq(s, &samples[0])).collect();

    while centers.len() < k {
        let Some((idx, &dist)) = nearest_dist
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
        else {
            break;
        };
        if dist == 0.0 {
            break;
        }
        let next = samples[idx];
        for (d, s) in nearest_dist.iter_mut().zip(samples) {
            *d = d.min(distance_sq(s, &next));
        }
        centers.push(next);
    }
    centers
}

fn nearest(centers: &[[f64; 3]], sample: &[f64; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let d = distance_sq(center, sample);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
