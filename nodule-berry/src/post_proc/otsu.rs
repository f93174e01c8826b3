//! 大津法 (Otsu) 全局自动门限.

use crate::consts::gray::INTENSITY_MAX;
use ndarray::{Array2, ArrayView2};

/// 直方图箱数, 对应 8-bit 灰度范围.
const BINS: usize = 256;

/// 将强度值映射到直方图箱. 超出 `[0, 255]` 的值被截断, NaN 被视为 0.
#[inline]
fn bin_of(v: f32) -> usize {
    if v.is_nan() {
        return 0;
    }
    num::clamp(v, 0.0, INTENSITY_MAX) as usize
}

/// 以最大化类间方差的方式计算全局门限, 返回直方图箱序号.
///
/// 箱序号严格大于门限的像素被视为前景. 若图像为空或所有像素落在同一箱内
/// (不存在可分的两类), 则返回 0.
pub fn otsu_threshold(image: ArrayView2<f32>) -> u8 {
    let mut histogram = [0usize; BINS];
    for &v in image.iter() {
        histogram[bin_of(v)] += 1;
    }

    let total = image.len() as f64;
    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| (i * c) as f64)
        .sum();

    let (mut sum_b, mut weight_b) = (0.0, 0.0);
    let (mut max_var, mut threshold) = (0.0, 0);
    for (i, &count) in histogram.iter().enumerate() {
        weight_b += count as f64;
        if weight_b == 0.0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0.0 {
            break;
        }

        sum_b += (i * count) as f64;
        let mean_b = sum_b / weight_b;
        let mean_f = (sum - sum_b) / weight_f;
        let var = weight_b * weight_f * (mean_b - mean_f).powi(2);
        if var > max_var {
            max_var = var;
            threshold = i;
        }
    }
    threshold as u8
}

/// 以 `threshold` 二值化, 获得前景掩码.
pub fn binarize(image: ArrayView2<f32>, threshold: u8) -> Array2<bool> {
    image.mapv(|v| bin_of(v) > threshold as usize)
}
