//! 原图的梯度幅值, 用作斑点检测的下限门控.

use ndarray::{Array2, ArrayView2};

/// 3x3 Sobel 水平导数核 (按 `[dh][dw]` 排列).
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// 3x3 Sobel 垂直导数核 (按 `[dh][dw]` 排列).
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// 原图的梯度幅值 `sqrt(gx^2 + gy^2)`.
///
/// 两个正交导数核分别为水平/垂直 Sobel 核, 边界按边缘复制处理.
pub(crate) fn gradient_magnitude(src: ArrayView2<f32>) -> Array2<f32> {
    let (h_len, w_len) = src.dim();
    Array2::from_shape_fn((h_len, w_len), |(h, w)| {
        let (mut gx, mut gy) = (0.0f32, 0.0f32);
        for dh in 0..3 {
            let sh = (h + dh).saturating_sub(1).min(h_len - 1);
            for dw in 0..3 {
                let sw = (w + dw).saturating_sub(1).min(w_len - 1);
                let v = src[(sh, sw)];
                gx += SOBEL_X[dh][dw] * v;
                gy += SOBEL_Y[dh][dw] * v;
            }
        }
        gx.hypot(gy)
    })
}
