//! CT 窗口. 将 CT HU 值映射到检测算法所假设的 8-bit 强度范围.

use crate::consts::gray::INTENSITY_MAX;
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// 构建 CT 窗.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f32, width: f32) -> Option<CtWindow> {
        ((-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5)
            .then_some(Self { level, width })
    }

    /// 常用的肺窗: 窗位 -600, 窗宽 1500.
    #[inline]
    pub const fn from_lung_visual() -> CtWindow {
        Self {
            level: -600.0,
            width: 1500.0,
        }
    }

    /// 纵隔窗: 窗位 40, 窗宽 400.
    #[inline]
    pub const fn from_mediastinum_visual() -> CtWindow {
        Self {
            level: 40.0,
            width: 400.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的灰度图像素整数值 (0 <= value <= 255).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    #[inline]
    pub fn eval(&self, ct: f32) -> Option<u8> {
        // 截断而非四舍五入: 255, not 256.
        self.eval_f32(ct).map(|v| v as u8)
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的强度 (0.0 <= value <= 255.0).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_f32(&self, ct: f32) -> Option<f32> {
        if !ct.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        Some(if ct <= lb {
            0.0
        } else if ct >= self.upper_bound() {
            INTENSITY_MAX
        } else {
            (ct - lb) / self.width * INTENSITY_MAX
        })
    }

    /// 对整张 HU 切片加窗. 无意义的 HU 值被映射为 0.
    pub fn apply(&self, hu: ArrayView2<f32>) -> Array2<f32> {
        hu.mapv(|v| self.eval_f32(v).unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use crate::CtWindow;
    use ndarray::array;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_ct_window_invalid_input() {
        assert!(CtWindow::new(0.0, -1.0).is_none());
        assert!(CtWindow::new(0.0, 0.0).is_none());
        assert!(CtWindow::new(-2e5, 10.0).is_none());
    }

    #[test]
    fn test_lung_window() {
        // [-1350, 150]
        let ct = CtWindow::from_lung_visual();
        assert!(float_eq(ct.lower_bound(), -1350.0));
        assert!(float_eq(ct.upper_bound(), 150.0));

        assert_eq!(ct.eval(f32::NAN), None);
        assert_eq!(ct.eval(-1000.0 - 500.0), Some(0));
        assert_eq!(ct.eval(400.0), Some(255));
        assert!(float_eq(ct.eval_f32(-600.0).unwrap(), 127.5));
        assert_eq!(ct.eval(-600.0), Some(127));
    }

    #[test]
    fn test_apply() {
        let ct = CtWindow::new(80.0, 40.0).unwrap();
        let out = ct.apply(array![[50.0, 70.0], [f32::INFINITY, 100.0]].view());
        assert!(float_eq(out[(0, 0)], 0.0));
        assert!(float_eq(out[(0, 1)], 255.0 * 0.25));
        assert!(float_eq(out[(1, 0)], 0.0));
        assert!(float_eq(out[(1, 1)], 255.0));
    }
}
