//! 尺度空间构建: 高斯模糊, DoG 与边缘复制填充.

use ndarray::{Array2, ArrayView2, Axis};

/// 第一个尺度固定为 1.
const FIRST_SIGMA: f64 = 1.0;

/// 第二个尺度.
const SECOND_SIGMA: f64 = 3.0;

/// 第二个尺度之后, 每个尺度的步长.
const SIGMA_STEP: f64 = 6.0;

/// 高斯核半径与 sigma 之比.
const KERNEL_RADIUS_PER_SIGMA: f64 = 3.0;

/// 生成 `n` 个尺度: `[1, 3, 9, 15, 21, ...]`.
///
/// 注意这不是常见的倍增序列: 首项固定为 1, 其后从 3 开始以 6 为步长递增.
pub(crate) fn sigma_schedule(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| match i {
            0 => FIRST_SIGMA,
            k => SECOND_SIGMA + SIGMA_STEP * (k - 1) as f64,
        })
        .collect()
}

/// 归一化一维高斯核, 长度为 `2 * ceil(3 * sigma) + 1`.
pub(crate) fn gaussian_kernel(sigma: f64) -> Vec<f32> {
    debug_assert!(sigma > 0.0);
    let radius = (KERNEL_RADIUS_PER_SIGMA * sigma).ceil() as isize;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / sum) as f32).collect()
}

/// 沿 `axis` 做一维卷积, 越界位置按边缘复制取值.
fn convolve_axis(src: ArrayView2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let radius = (kernel.len() / 2) as isize;
    let len = src.len_of(axis) as isize;
    let mut dst = Array2::zeros(src.dim());

    for ((h, w), out) in dst.indexed_iter_mut() {
        let center = (if axis == Axis(0) { h } else { w }) as isize;
        let mut acc = 0.0f32;
        for (k, &coef) in kernel.iter().enumerate() {
            let i = (center + k as isize - radius).clamp(0, len - 1) as usize;
            let v = if axis == Axis(0) { src[(i, w)] } else { src[(h, i)] };
            acc += coef * v;
        }
        *out = acc;
    }
    dst
}

/// 可分离高斯模糊, 边界按边缘复制处理.
pub(crate) fn gaussian_blur(src: ArrayView2<f32>, sigma: f64) -> Array2<f32> {
    if src.is_empty() {
        return src.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let tmp = convolve_axis(src, &kernel, Axis(1));
    convolve_axis(tmp.view(), &kernel, Axis(0))
}

/// 四周以边缘复制方式填充: 上下各 `pad_h` 行, 左右各 `pad_w` 列.
pub(crate) fn pad_edge(src: ArrayView2<f32>, pad_h: usize, pad_w: usize) -> Array2<f32> {
    let (h, w) = src.dim();
    if h == 0 || w == 0 {
        return Array2::zeros((h + 2 * pad_h, w + 2 * pad_w));
    }
    Array2::from_shape_fn((h + 2 * pad_h, w + 2 * pad_w), |(ph, pw)| {
        let sh = ph.saturating_sub(pad_h).min(h - 1);
        let sw = pw.saturating_sub(pad_w).min(w - 1);
        src[(sh, sw)]
    })
}

/// 构建 DoG 金字塔.
///
/// 对 `sigmas` 中每个尺度做一次高斯模糊, 再对相邻两层求差
/// (`blur[i] - blur[i + 1]`, 亮斑为正), 得到 `sigmas.len() - 1` 张差分图.
/// 每张差分图都以边缘复制方式填充了 `(pad_h, pad_w)`, 便于邻域查找永不越界.
pub(crate) fn dog_pyramid(
    src: ArrayView2<f32>,
    sigmas: &[f64],
    (pad_h, pad_w): (usize, usize),
) -> Vec<Array2<f32>> {
    let blurred: Vec<Array2<f32>> = sigmas.iter().map(|&s| gaussian_blur(src, s)).collect();
    blurred
        .windows(2)
        .map(|pair| {
            let diff = &pair[0] - &pair[1];
            pad_edge(diff.view(), pad_h, pad_w)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_sigma_schedule() {
        assert_eq!(sigma_schedule(0), Vec::<f64>::new());
        assert_eq!(sigma_schedule(1), [1.0]);
        assert_eq!(sigma_schedule(5), [1.0, 3.0, 9.0, 15.0, 21.0]);
    }

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        for sigma in [1.0, 3.0, 9.0] {
            let k = gaussian_kernel(sigma);
            assert_eq!(k.len(), 2 * (3.0 * sigma).ceil() as usize + 1);
            let sum: f32 = k.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for i in 0..k.len() / 2 {
                assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-7);
            }
            let mid = k.len() / 2;
            assert!(k.iter().all(|v| *v <= k[mid]));
        }
    }

    #[test]
    fn test_blur_preserves_constant() {
        let src = Array2::from_elem((9, 13), 42.0f32);
        let out = gaussian_blur(src.view(), 3.0);
        assert!(out.iter().all(|v| (v - 42.0).abs() < 1e-3));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut src = Array2::zeros((15, 15));
        src[(7, 7)] = 100.0f32;
        let out = gaussian_blur(src.view(), 1.0);
        assert!(out[(7, 7)] < 100.0);
        assert!(out[(7, 8)] > 0.0);
        assert!((out[(7, 8)] - out[(8, 7)]).abs() < 1e-5);
        let total: f32 = out.iter().sum();
        assert!((total - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_pad_edge() {
        let src = array![[1.0f32, 2.0], [3.0, 4.0]];
        let p = pad_edge(src.view(), 1, 2);
        assert_eq!(p.dim(), (4, 6));
        assert_eq!(
            p,
            array![
                [1.0, 1.0, 1.0, 2.0, 2.0, 2.0],
                [1.0, 1.0, 1.0, 2.0, 2.0, 2.0],
                [3.0, 3.0, 3.0, 4.0, 4.0, 4.0],
                [3.0, 3.0, 3.0, 4.0, 4.0, 4.0],
            ]
        );
    }

    #[test]
    fn test_dog_pyramid_shape_and_sign() {
        let mut src = Array2::zeros((21, 21));
        for h in 8..13 {
            for w in 8..13 {
                src[(h, w)] = 200.0f32;
            }
        }
        let dogs = dog_pyramid(src.view(), &sigma_schedule(3), (1, 2));
        assert_eq!(dogs.len(), 2);
        for d in dogs.iter() {
            assert_eq!(d.dim(), (23, 25));
        }
        // 亮斑中心为正.
        assert!(dogs[0][(10 + 1, 10 + 2)] > 0.0);
        assert!(dogs[1][(10 + 1, 10 + 2)] > 0.0);
    }
}
