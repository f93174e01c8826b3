//! 斑点候选的局部自适应精化.

use super::otsu::{binarize, otsu_threshold};
use super::RefineStats;
use crate::eight::extract_regions;
use crate::{BoundingBox, IntensitySlice, LabelGrid, Region};
use ndarray::Array2;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

/// 局部精化失败的原因.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefineError {
    /// 粗候选区域为空.
    EmptyCandidate,

    /// 粗候选区域存在图像范围以外的像素. 参数为图像形状 `(h, w)`.
    OutOfBounds((usize, usize)),

    /// 重新二值化后, 没有任何连通区域与粗候选区域重合.
    NoMatch,

    /// 重新二值化后, 有多个连通区域与粗候选区域重合. 参数为重合的区域数.
    MultipleMatches(usize),
}

impl Display for RefineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCandidate => write!(f, "粗候选区域为空"),
            Self::OutOfBounds(shape) => write!(f, "粗候选区域超出形状为 {shape:?} 的图像"),
            Self::NoMatch => write!(f, "局部二值化后没有区域与候选重合"),
            Self::MultipleMatches(n) => write!(f, "局部二值化后有 {n} 个区域与候选重合"),
        }
    }
}

impl std::error::Error for RefineError {}

/// 精化结果.
pub type RefineResult<T> = Result<T, RefineError>;

/// 在原图 `image` 上, 对粗候选区域 `coarse` 做局部自适应精化.
///
/// 算法流程依次为:
///
/// 1. 计算 `coarse` 的包围盒, 以其宽度的一半作为斑点半径 `r`;
/// 2. 取 `r' = sqrt(2π r²) / 2`, 即使边长为 `2r'` 的方框面积为斑点圆面积的两倍.
///   包围盒四周各扩展 `round(r' - r)` 个像素, 并裁剪到图像范围内;
/// 3. 在扩展后的窗口内, 单独以大津法二值化, 再做 8-相邻连通区域提取;
/// 4. 恰好一个区域与 `coarse` 重合 (至少一个公共像素) 时, 选中它;
///   否则失败;
/// 5. 将 `coarse` 的像素从二值图中抹去, 重新提取连通区域.
///   任何接触窗口边缘的区域都被视为窗口外结构的渗入, 从选中区域中减去;
/// 6. 将结果平移回原图坐标系.
///
/// 无论成功与否, 结果都会被计入 `stats`.
///
/// # 保证
///
/// 成功时返回的区域非空, 且完全位于第 2 步的窗口之内 (因此也位于原图之内).
pub fn refine_blob(
    image: IntensitySlice,
    coarse: &Region,
    stats: &RefineStats,
) -> RefineResult<Region> {
    let ans = ThresholdImp::new(image, coarse).and_then(|imp| imp.refine());
    stats.record(ans.is_ok());
    ans
}

/// 对半径为 `r` 的斑点, 计算使窗口面积翻倍所需的扩展像素数.
#[inline]
fn padding_for(r: f64) -> usize {
    let expanded = (2.0 * PI * r * r).sqrt() / 2.0;
    (expanded - r).round().max(0.0) as usize
}

/// `refine_blob` 函数的实现细节.
struct ThresholdImp<'a> {
    image: IntensitySlice<'a>,

    /// 扩展后的窗口, 原图坐标系.
    window: BoundingBox,

    /// 粗候选区域, 窗口坐标系.
    local: Region,
}

impl<'a> ThresholdImp<'a> {
    fn new(image: IntensitySlice<'a>, coarse: &Region) -> RefineResult<Self> {
        let bbox = coarse.bounding_box().ok_or(RefineError::EmptyCandidate)?;
        if !coarse.within(image.shape()) {
            return Err(RefineError::OutOfBounds(image.shape()));
        }

        // step 1 & 2
        let r = bbox.width() as f64 / 2.0;
        let window = bbox.expand(padding_for(r), image.shape());
        let local = coarse.translated_back(window.min_x, window.min_y);
        debug_assert_eq!(local.len(), coarse.len());

        Ok(Self {
            image,
            window,
            local,
        })
    }

    fn refine(self) -> RefineResult<Region> {
        // step 3: 局部二值化.
        let crop = self.image.crop(&self.window);
        let threshold = otsu_threshold(crop.data());
        let mut mask = binarize(crop.data(), threshold);
        let regions = extract_regions(&LabelGrid::from_binary(mask.view()));

        // step 4: 唯一匹配.
        let mut matched = regions.into_iter().filter(|r| r.intersects(&self.local));
        let mut accepted = match (matched.next(), matched.count()) {
            (None, _) => return Err(RefineError::NoMatch),
            (Some(r), 0) => r,
            (Some(_), n) => return Err(RefineError::MultipleMatches(n + 1)),
        };

        // step 5: 抹去候选自身, 去除从窗口外渗入的结构.
        self.paint_out(&mut mask);
        let (h, w) = mask.dim();
        let border = BoundingBox {
            min_x: 0,
            min_y: 0,
            max_x: w - 1,
            max_y: h - 1,
        };
        for r in extract_regions(&LabelGrid::from_binary(mask.view())) {
            if r.iter().any(|p| border.is_at_border(p)) {
                accepted = accepted.difference(&r);
            }
        }
        log::trace!(
            "refined candidate of {} px into {} px (otsu = {threshold}, window = {:?})",
            self.local.len(),
            accepted.len(),
            self.window
        );

        // step 6
        Ok(accepted.translated(self.window.min_x, self.window.min_y))
    }

    /// 将粗候选区域的像素设为背景.
    fn paint_out(&self, mask: &mut Array2<bool>) {
        for p in self.local.iter() {
            mask[p.hw()] = false;
        }
    }
}
