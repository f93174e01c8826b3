//! 多尺度 (DoG, difference-of-Gaussians) 斑点检测.
//!
//! 检测流程:
//!
//! 1. 以尺度序列 `[1, 3, 9, 15, ...]` 对原图做 `num_sigma` 次高斯模糊;
//! 2. 相邻两层求差得到 `num_sigma - 1` 张 DoG 图, 并以空间搜索半径做边缘复制填充;
//! 3. 对 **原图** (不是模糊后的图) 计算一次 Sobel 梯度幅值;
//! 4. 对每层每个像素: DoG 值低于 `dog_thresh` 或梯度幅值低于 `gradient_thresh`
//!   即被拒绝; 否则当且仅当其 DoG 值等于空间邻域 (`width x height`) 与尺度邻域
//!   (`±depth / 2` 层, 在两端截断) 组成的窗口中的最小值或最大值时,
//!   成为一个关键点.
//!
//! 注意梯度门限是 **下限**: 它用于排除纯平坦区域的伪响应,
//! 与 SIFT 中抑制边缘响应的上限检验方向相反.

mod gradient;
mod scale_space;

use crate::{IntensitySlice, PixelCoord};
use itertools::{Itertools, MinMaxResult};
use ndarray::{s, Array2, ArrayView2};
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 检测到的斑点候选. 创建后不可变.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyPoint {
    location: PixelCoord,
    sigma: f64,
    intensity: f32,
}

impl KeyPoint {
    /// 直接初始化.
    #[inline]
    pub fn new(location: PixelCoord, sigma: f64, intensity: f32) -> Self {
        Self {
            location,
            sigma,
            intensity,
        }
    }

    /// 像素位置.
    #[inline]
    pub fn location(&self) -> PixelCoord {
        self.location
    }

    /// 检测尺度, 即该 DoG 层对应的 (较小的) 高斯 sigma.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// 检测时的 DoG 对比度值.
    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// 斑点的近似半径 `sigma * sqrt(2)`.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.sigma * std::f64::consts::SQRT_2
    }
}

/// 邻域形状: 宽 (列方向), 高 (行方向), 深 (尺度方向). 三者都必须是正奇数.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neighbourhood {
    /// 宽.
    pub width: usize,
    /// 高.
    pub height: usize,
    /// 深.
    pub depth: usize,
}

impl Neighbourhood {
    /// 空间搜索半径 `(行, 列)`.
    #[inline]
    pub fn spatial_radius(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    /// 尺度搜索半径.
    #[inline]
    pub fn scale_radius(&self) -> usize {
        self.depth / 2
    }
}

/// [`DogParams`] 构造错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DogParamsError {
    /// 邻域尺寸中存在偶数 (包括 0). 由于算法取其一半作为搜索半径, 偶数尺寸无意义.
    EvenNeighbourhood(Neighbourhood),

    /// 尺度层数不足以构成任何一张 DoG 图. 参数为给定层数.
    TooFewScales(usize),

    /// 门限不是有限数.
    NonFiniteThreshold,
}

impl Display for DogParamsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EvenNeighbourhood(n) => write!(f, "邻域尺寸必须是正奇数, 但得到 {n:?}"),
            Self::TooFewScales(n) => write!(f, "至少需要 2 个尺度, 但得到 {n}"),
            Self::NonFiniteThreshold => write!(f, "门限必须是有限数"),
        }
    }
}

impl std::error::Error for DogParamsError {}

/// 斑点检测参数. 只读; 若要修改参数, 你应该创建新的实例.
///
/// 反序列化同样经过 [`DogParams::new`] 的检查.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawDogParams"))]
pub struct DogParams {
    dog_thresh: f32,
    gradient_thresh: f32,
    neighbourhood: Neighbourhood,
    num_sigma: usize,
}

impl DogParams {
    /// 构建参数.
    ///
    /// - `dog_thresh`: 成为极值所需的最小 DoG 对比度;
    /// - `gradient_thresh`: 原图梯度幅值的 **最小值**;
    /// - `(width, height, depth)`: 邻域形状, 必须都是正奇数;
    /// - `num_sigma`: 尺度层数, 至少为 2.
    pub fn new(
        dog_thresh: f32,
        gradient_thresh: f32,
        (width, height, depth): (usize, usize, usize),
        num_sigma: usize,
    ) -> Result<Self, DogParamsError> {
        let neighbourhood = Neighbourhood {
            width,
            height,
            depth,
        };
        if [width, height, depth].iter().any(|v| v % 2 == 0) {
            return Err(DogParamsError::EvenNeighbourhood(neighbourhood));
        }
        if num_sigma < 2 {
            return Err(DogParamsError::TooFewScales(num_sigma));
        }
        if !dog_thresh.is_finite() || !gradient_thresh.is_finite() {
            return Err(DogParamsError::NonFiniteThreshold);
        }
        Ok(Self {
            dog_thresh,
            gradient_thresh,
            neighbourhood,
            num_sigma,
        })
    }

    /// 最小 DoG 对比度.
    #[inline]
    pub fn dog_thresh(&self) -> f32 {
        self.dog_thresh
    }

    /// 最小梯度幅值.
    #[inline]
    pub fn gradient_thresh(&self) -> f32 {
        self.gradient_thresh
    }

    /// 邻域形状.
    #[inline]
    pub fn neighbourhood(&self) -> Neighbourhood {
        self.neighbourhood
    }

    /// 尺度层数.
    #[inline]
    pub fn num_sigma(&self) -> usize {
        self.num_sigma
    }

    /// 全部尺度.
    #[inline]
    pub fn sigmas(&self) -> Vec<f64> {
        scale_space::sigma_schedule(self.num_sigma)
    }
}

/// 未经检查的 [`DogParams`], 仅用于反序列化.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawDogParams {
    dog_thresh: f32,
    gradient_thresh: f32,
    neighbourhood: Neighbourhood,
    num_sigma: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDogParams> for DogParams {
    type Error = DogParamsError;

    fn try_from(raw: RawDogParams) -> Result<Self, Self::Error> {
        let Neighbourhood {
            width,
            height,
            depth,
        } = raw.neighbourhood;
        Self::new(
            raw.dog_thresh,
            raw.gradient_thresh,
            (width, height, depth),
            raw.num_sigma,
        )
    }
}

/// 对比度 10, 梯度 1, 3x3x3 邻域, 4 个尺度 (`[1, 3, 9, 15]`).
impl Default for DogParams {
    fn default() -> Self {
        Self {
            dog_thresh: 10.0,
            gradient_thresh: 1.0,
            neighbourhood: Neighbourhood {
                width: 3,
                height: 3,
                depth: 3,
            },
            num_sigma: 4,
        }
    }
}

/// 在 `image` 上检测 DoG 尺度空间极值.
///
/// 纯函数, 同样的输入总是得到同样的输出. 结果先按 DoG 层,
/// 再按光栅扫描顺序排列.
pub fn detect_blobs(image: IntensitySlice, params: &DogParams) -> Vec<KeyPoint> {
    let (h_len, w_len) = image.shape();
    if h_len == 0 || w_len == 0 {
        return vec![];
    }

    let sigmas = params.sigmas();
    let dogs = scale_space::dog_pyramid(
        image.data(),
        &sigmas,
        params.neighbourhood.spatial_radius(),
    );
    let grad = gradient::gradient_magnitude(image.data());
    let ans = scan_extrema(&dogs, grad.view(), &sigmas, params);
    log::debug!("detected {} keypoints on {h_len}x{w_len} image", ans.len());
    ans
}

/// 在已填充的 DoG 金字塔 `dogs` 上逐层逐像素做极值检验.
///
/// `dogs[i]` 的形状为 `grad` 的形状四周各加上空间搜索半径, 对应尺度 `sigmas[i]`.
fn scan_extrema(
    dogs: &[Array2<f32>],
    grad: ArrayView2<f32>,
    sigmas: &[f64],
    params: &DogParams,
) -> Vec<KeyPoint> {
    let Some(last) = dogs.len().checked_sub(1) else {
        return vec![];
    };
    let (rh, rw) = params.neighbourhood.spatial_radius();
    let rd = params.neighbourhood.scale_radius();

    let mut ans = Vec::with_capacity(16);
    for (level, dog) in dogs.iter().enumerate() {
        let before = ans.len();
        let (lo, hi) = (level.saturating_sub(rd), (level + rd).min(last));

        for ((h, w), &g) in grad.indexed_iter() {
            // 填充后的坐标.
            let value = dog[(h + rh, w + rw)];
            if value < params.dog_thresh || g < params.gradient_thresh {
                continue;
            }

            let window = s![h..=h + 2 * rh, w..=w + 2 * rw];
            let extrema = dogs[lo..=hi]
                .iter()
                .flat_map(|d| d.slice(window).into_iter().copied())
                .minmax();
            let is_extremum = match extrema {
                MinMaxResult::MinMax(min, max) => value == min || value == max,
                // 窗口只有一个元素, 即它自己.
                MinMaxResult::OneElement(_) => true,
                MinMaxResult::NoElements => false,
            };
            if is_extremum {
                ans.push(KeyPoint::new(
                    PixelCoord::from_hw((h, w)),
                    sigmas[level],
                    value,
                ));
            }
        }
        log::trace!(
            "DoG level {level} (sigma = {}): {} keypoints",
            sigmas[level],
            ans.len() - before
        );
    }
    ans
}

#[cfg(test)]
mod tests {
    use super::{detect_blobs, scan_extrema, DogParams, DogParamsError, KeyPoint};
    use crate::{OwnedIntensitySlice, PixelCoord};
    use ndarray::{array, Array2};

    /// 带有确定性纹理的暗背景上, 一个以 `(cy, cx)` 为中心、半径为 `r` 的亮圆盘.
    ///
    /// 纹理保证原图处处有非零梯度.
    fn textured_disc(shape: (usize, usize), (cy, cx): (usize, usize), r: f64) -> OwnedIntensitySlice {
        OwnedIntensitySlice::from_array(Array2::from_shape_fn(shape, |(h, w)| {
            let texture = ((h * 31 + w * 17) % 7) as f32;
            let d2 = (h as f64 - cy as f64).powi(2) + (w as f64 - cx as f64).powi(2);
            let base = if d2 <= r * r { 200.0 } else { 20.0 };
            base + texture
        }))
    }

    #[test]
    fn test_params_validation() {
        assert_eq!(
            DogParams::new(1.0, 1.0, (3, 4, 3), 3).unwrap_err(),
            DogParamsError::EvenNeighbourhood(super::Neighbourhood {
                width: 3,
                height: 4,
                depth: 3
            })
        );
        assert!(matches!(
            DogParams::new(1.0, 1.0, (3, 3, 0), 3),
            Err(DogParamsError::EvenNeighbourhood(_))
        ));
        assert_eq!(
            DogParams::new(1.0, 1.0, (3, 3, 3), 1).unwrap_err(),
            DogParamsError::TooFewScales(1)
        );
        assert_eq!(
            DogParams::new(f32::NAN, 1.0, (3, 3, 3), 3).unwrap_err(),
            DogParamsError::NonFiniteThreshold
        );
        let p = DogParams::new(5.0, 2.0, (5, 3, 1), 3).unwrap();
        assert_eq!(p.neighbourhood().spatial_radius(), (1, 2));
        assert_eq!(p.neighbourhood().scale_radius(), 0);
        assert_eq!(p.sigmas(), [1.0, 3.0, 9.0]);
    }

    #[test]
    fn test_all_zero_image_has_no_keypoints() {
        let img = OwnedIntensitySlice::from_array(Array2::zeros((32, 32)));
        let kps = detect_blobs(img.as_immut(), &DogParams::default());
        assert!(kps.is_empty());
    }

    #[test]
    fn test_flat_image_rejected_by_gradient() {
        // 即使对比度门限为 0, 平坦图像也因梯度门限被全部拒绝.
        let img = OwnedIntensitySlice::from_array(Array2::from_elem((16, 16), 80.0));
        let params = DogParams::new(0.0, 0.5, (3, 3, 3), 3).unwrap();
        assert!(detect_blobs(img.as_immut(), &params).is_empty());
    }

    #[test]
    fn test_detects_bright_disc() {
        let img = textured_disc((41, 41), (20, 20), 4.0);
        let params = DogParams::new(10.0, 1.0, (3, 3, 3), 3).unwrap();
        let kps = detect_blobs(img.as_immut(), &params);
        assert!(!kps.is_empty());

        for kp in kps.iter() {
            assert!(kp.intensity() >= params.dog_thresh());
            assert!(params.sigmas().contains(&kp.sigma()));
        }

        // DoG 的全局最大值一定会被接受, 且它在圆盘上.
        let best = kps
            .iter()
            .max_by(|a, b| a.intensity().total_cmp(&b.intensity()))
            .unwrap();
        let loc = best.location();
        let d2 = (loc.x as f64 - 20.0).powi(2) + (loc.y as f64 - 20.0).powi(2);
        assert!(d2 <= 25.0, "strongest keypoint at {loc:?}");
    }

    #[test]
    fn test_deterministic() {
        let img = textured_disc((33, 40), (15, 22), 3.0);
        let params = DogParams::new(8.0, 1.0, (5, 5, 3), 4).unwrap();
        let a = detect_blobs(img.as_immut(), &params);
        let b = detect_blobs(img.as_immut(), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_image() {
        let img = OwnedIntensitySlice::from_array(Array2::zeros((0, 5)));
        assert!(detect_blobs(img.as_immut(), &DogParams::default()).is_empty());
    }

    #[test]
    fn test_scale_window_clipped_at_ends() {
        // 1x3 图像, 空间邻域退化为单像素, 只比较相邻尺度.
        // 第 0 列: 各层 [10, 20, 15, 12]; 第 1 列: [10, 3, 12, 11];
        // 第 2 列对比度很高, 但梯度低于门限.
        let dogs = [
            array![[10.0f32, 10.0, 50.0]],
            array![[20.0, 3.0, 50.0]],
            array![[15.0, 12.0, 50.0]],
            array![[12.0, 11.0, 50.0]],
        ];
        let grad = array![[10.0f32, 10.0, 0.5]];
        let params = DogParams::new(5.0, 1.0, (1, 1, 3), 4).unwrap();
        let sigmas = params.sigmas();
        let kps = scan_extrema(&dogs, grad.view(), &sigmas, &params);

        let kp = |x: usize, sigma: f64, v: f32| KeyPoint::new(PixelCoord::new(x, 0), sigma, v);
        let expected = [
            // 第 0 层的窗口只含第 0, 1 层.
            kp(0, 1.0, 10.0),
            kp(1, 1.0, 10.0),
            // (1, 1) 低于对比度门限.
            kp(0, 3.0, 20.0),
            // (0, 2) 的 15 介于 20 与 12 之间, 不是极值.
            kp(1, 9.0, 12.0),
            // 最后一层的窗口只含第 2, 3 层.
            kp(0, 15.0, 12.0),
            kp(1, 15.0, 11.0),
        ];
        assert_eq!(kps, expected);
    }

    #[test]
    fn test_spatial_window() {
        // 单层, 3x3 图像按边缘复制填充为 5x5.
        let dogs = [array![
            [7.0f32, 7.0, 9.0, 7.0, 7.0],
            [7.0, 7.0, 9.0, 7.0, 7.0],
            [7.0, 7.0, 8.0, 7.0, 7.0],
            [6.0, 6.0, 7.0, 6.0, 6.0],
            [6.0, 6.0, 7.0, 6.0, 6.0],
        ]];
        let grad = Array2::from_elem((3, 3), 10.0f32);
        let params = DogParams::new(5.0, 1.0, (3, 3, 1), 2).unwrap();
        let kps = scan_extrema(&dogs, grad.view(), &params.sigmas(), &params);

        let got: Vec<(usize, usize)> = kps.iter().map(|k| k.location().hw()).collect();
        // 中间一行与 (2, 1) 都高于门限, 但既不是窗口最小值也不是最大值.
        assert_eq!(got, [(0, 0), (0, 1), (0, 2), (2, 0), (2, 2)]);
        assert_eq!(kps[1].intensity(), 9.0);
        assert!(kps.iter().all(|k| k.sigma() == 1.0));
    }

    #[test]
    fn test_empty_pyramid() {
        let params = DogParams::default();
        let grad = Array2::from_elem((2, 2), 10.0f32);
        assert!(scan_extrema(&[], grad.view(), &[], &params).is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let p = DogParams::new(5.0, 2.0, (5, 3, 1), 3).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(serde_json::from_str::<DogParams>(&json).unwrap(), p);

        let even = r#"{"dog_thresh":10.0,"gradient_thresh":1.0,
            "neighbourhood":{"width":4,"height":4,"depth":2},"num_sigma":4}"#;
        let err = serde_json::from_str::<DogParams>(even).unwrap_err();
        assert!(err.to_string().contains("正奇数"), "{err}");

        let few = r#"{"dog_thresh":10.0,"gradient_thresh":1.0,
            "neighbourhood":{"width":3,"height":3,"depth":3},"num_sigma":1}"#;
        assert!(serde_json::from_str::<DogParams>(few).is_err());
    }
}
