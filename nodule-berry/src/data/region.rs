//! 像素坐标, 区域与包围盒.
//!
//! 内部数组一律以 `(h, w)` 行优先方式索引, 而对外公开的坐标 [`PixelCoord`]
//! 采用 `(x, y)` 形式, 其中 `x` 即列 (`w`), `y` 即行 (`h`).
//! 两者之间的转换必须显式进行: `PixelCoord::from_hw` 与 `PixelCoord::hw`.

use crate::Idx2d;
use ndarray::Array2;
use std::cmp::Ordering;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 图像上的整数像素坐标 `(x, y)`. 值语义, 按值比较与哈希.
///
/// 排序规则为行优先 (先比较 `y`, 再比较 `x`), 与光栅扫描顺序一致.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    /// 列.
    pub x: usize,

    /// 行.
    pub y: usize,
}

impl PixelCoord {
    /// 直接初始化.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// `(h, w)` -> `(x, y)`.
    #[inline]
    pub const fn from_hw((h, w): Idx2d) -> Self {
        Self { x: w, y: h }
    }

    /// `(x, y)` -> `(h, w)`, 可直接用于索引 `ndarray` 数组.
    #[inline]
    pub const fn hw(&self) -> Idx2d {
        (self.y, self.x)
    }

    /// 平移 `(dx, dy)`.
    #[inline]
    pub const fn offset(&self, dx: usize, dy: usize) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// 反向平移 `(dx, dy)`. 若结果为负则返回 `None`.
    #[inline]
    pub fn checked_offset_back(&self, dx: usize, dy: usize) -> Option<Self> {
        Some(Self {
            x: self.x.checked_sub(dx)?,
            y: self.y.checked_sub(dy)?,
        })
    }
}

impl Ord for PixelCoord {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for PixelCoord {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Idx2d> for PixelCoord {
    #[inline]
    fn from(value: Idx2d) -> Self {
        Self::from_hw(value)
    }
}

/// 像素坐标的集合. 无重复, 无序.
///
/// 该结构本身允许为空; 但任何由区域提取算法返回的 `Region` 都保证非空.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pixels: HashSet<PixelCoord>,
}

impl Region {
    /// 创建空区域.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建空区域, 并预留 `capacity` 个像素的空间.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pixels: HashSet::with_capacity(capacity),
        }
    }

    /// 从 `(h, w)` 索引迭代器构建.
    pub fn from_hw_iter<I: IntoIterator<Item = Idx2d>>(it: I) -> Self {
        it.into_iter().map(PixelCoord::from_hw).collect()
    }

    /// 像素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// 是否包含像素 `p`.
    #[inline]
    pub fn contains(&self, p: &PixelCoord) -> bool {
        self.pixels.contains(p)
    }

    /// 加入像素. 返回值指示是否是插入了新值.
    #[inline]
    pub fn insert(&mut self, p: PixelCoord) -> bool {
        self.pixels.insert(p)
    }

    /// 移除像素. 返回值指示像素原先是否存在.
    #[inline]
    pub fn remove(&mut self, p: &PixelCoord) -> bool {
        self.pixels.remove(p)
    }

    /// 获取能迭代所有像素的迭代器 (顺序不确定).
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PixelCoord> + '_ {
        self.pixels.iter()
    }

    /// 底层像素集合.
    #[inline]
    pub fn pixels(&self) -> &HashSet<PixelCoord> {
        &self.pixels
    }

    /// 直接获得底层数据的所有权.
    #[inline]
    pub fn into_raw(self) -> HashSet<PixelCoord> {
        self.pixels
    }

    /// 以光栅扫描顺序排列的所有像素.
    pub fn sorted(&self) -> Vec<PixelCoord> {
        let mut v: Vec<PixelCoord> = self.pixels.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// 轴对齐包围盒. 空区域返回 `None`.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut it = self.pixels.iter();
        let first = it.next()?;
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(it.fold(init, |mut b, p| {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
            b
        }))
    }

    /// 质心 `(x, y)`, 即所有像素坐标的平均值. 空区域返回 `None`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let (sx, sy) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        let n = self.len() as f64;
        Some((sx / n, sy / n))
    }

    /// 整体平移 `(dx, dy)`, 获得新区域.
    pub fn translated(&self, dx: usize, dy: usize) -> Region {
        self.pixels.iter().map(|p| p.offset(dx, dy)).collect()
    }

    /// 整体反向平移 `(dx, dy)`, 获得新区域. 平移后坐标为负的像素被丢弃.
    pub fn translated_back(&self, dx: usize, dy: usize) -> Region {
        self.pixels
            .iter()
            .filter_map(|p| p.checked_offset_back(dx, dy))
            .collect()
    }

    /// 并集.
    pub fn union(&self, other: &Region) -> Region {
        Region {
            pixels: self.pixels.union(&other.pixels).copied().collect(),
        }
    }

    /// 差集 `self - other`.
    pub fn difference(&self, other: &Region) -> Region {
        Region {
            pixels: self.pixels.difference(&other.pixels).copied().collect(),
        }
    }

    /// 交集大小.
    #[inline]
    pub fn intersection_len(&self, other: &Region) -> usize {
        // 遍历较小的集合.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.pixels.iter().filter(|p| large.contains(p)).count()
    }

    /// 与 `other` 是否至少有一个公共像素.
    #[inline]
    pub fn intersects(&self, other: &Region) -> bool {
        !self.pixels.is_disjoint(&other.pixels)
    }

    /// 所有像素是否都落在形状为 `(h, w)` 的图像内?
    #[inline]
    pub fn within(&self, (h, w): Idx2d) -> bool {
        self.pixels.iter().all(|p| p.y < h && p.x < w)
    }

    /// 转换为形状为 `(h, w)` 的布尔掩码. 越界像素被忽略.
    pub fn to_mask(&self, shape: Idx2d) -> Array2<bool> {
        let mut mask = Array2::from_elem(shape, false);
        for p in self.pixels.iter() {
            if let Some(v) = mask.get_mut(p.hw()) {
                *v = true;
            }
        }
        mask
    }
}

impl FromIterator<PixelCoord> for Region {
    fn from_iter<T: IntoIterator<Item = PixelCoord>>(iter: T) -> Self {
        Self {
            pixels: iter.into_iter().collect(),
        }
    }
}

impl Extend<PixelCoord> for Region {
    fn extend<T: IntoIterator<Item = PixelCoord>>(&mut self, iter: T) {
        self.pixels.extend(iter)
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a PixelCoord;
    type IntoIter = std::collections::hash_set::Iter<'a, PixelCoord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

/// 轴对齐包围盒. 四个边界都是闭区间.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// 最左列.
    pub min_x: usize,

    /// 最上行.
    pub min_y: usize,

    /// 最右列 (包含).
    pub max_x: usize,

    /// 最下行 (包含).
    pub max_y: usize,
}

impl BoundingBox {
    /// 宽 (列数).
    #[inline]
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// 高 (行数).
    #[inline]
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// 形状 `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        (self.height(), self.width())
    }

    /// 左上角坐标.
    #[inline]
    pub fn origin(&self) -> PixelCoord {
        PixelCoord::new(self.min_x, self.min_y)
    }

    /// 是否包含 `p`.
    #[inline]
    pub fn contains(&self, p: &PixelCoord) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }

    /// 像素 `p` 是否位于包围盒的边缘上.
    #[inline]
    pub fn is_at_border(&self, p: &PixelCoord) -> bool {
        p.x == self.min_x || p.x == self.max_x || p.y == self.min_y || p.y == self.max_y
    }

    /// 向四周各扩展 `d` 个像素, 并裁剪到形状为 `(h, w)` 的图像范围内.
    ///
    /// `self` 必须已经位于图像内, 否则程序行为未定义.
    pub fn expand(&self, d: usize, (h, w): Idx2d) -> BoundingBox {
        debug_assert!(self.max_y < h && self.max_x < w);
        BoundingBox {
            min_x: self.min_x.saturating_sub(d),
            min_y: self.min_y.saturating_sub(d),
            max_x: self.max_x.saturating_add(d).min(w.saturating_sub(1)),
            max_y: self.max_y.saturating_add(d).min(h.saturating_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, PixelCoord, Region};

    fn square(x0: usize, y0: usize, side: usize) -> Region {
        (y0..y0 + side)
            .flat_map(|y| (x0..x0 + side).map(move |x| PixelCoord::new(x, y)))
            .collect()
    }

    #[test]
    fn test_coord_conversion() {
        let p = PixelCoord::from_hw((3, 7));
        assert_eq!(p, PixelCoord::new(7, 3));
        assert_eq!(p.hw(), (3, 7));
        assert_eq!(p.checked_offset_back(8, 0), None);
        assert_eq!(p.checked_offset_back(7, 3), Some(PixelCoord::new(0, 0)));
    }

    #[test]
    fn test_raster_order() {
        let mut v = vec![
            PixelCoord::new(0, 1),
            PixelCoord::new(5, 0),
            PixelCoord::new(1, 1),
        ];
        v.sort();
        assert_eq!(
            v,
            [
                PixelCoord::new(5, 0),
                PixelCoord::new(0, 1),
                PixelCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_region_geometry() {
        let r = square(2, 3, 3);
        assert_eq!(r.len(), 9);
        let b = r.bounding_box().unwrap();
        assert_eq!(
            b,
            BoundingBox {
                min_x: 2,
                min_y: 3,
                max_x: 4,
                max_y: 5
            }
        );
        assert_eq!(b.shape(), (3, 3));
        assert_eq!(r.centroid(), Some((3.0, 4.0)));

        assert!(Region::new().bounding_box().is_none());
        assert!(Region::new().centroid().is_none());
    }

    #[test]
    fn test_region_set_ops() {
        let a = square(0, 0, 2);
        let b = square(1, 1, 2);
        assert_eq!(a.intersection_len(&b), 1);
        assert_eq!(a.union(&b).len(), 7);
        assert_eq!(a.difference(&b).len(), 3);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&square(5, 5, 1)));
    }

    #[test]
    fn test_translate_round_trip() {
        let a = square(1, 1, 2);
        let moved = a.translated(10, 20);
        assert!(moved.contains(&PixelCoord::new(11, 21)));
        assert_eq!(moved.translated_back(10, 20), a);
        // 反向平移越界的像素被丢弃.
        assert_eq!(a.translated_back(2, 0).len(), 2);
    }

    #[test]
    fn test_bbox_expand_clips() {
        let b = BoundingBox {
            min_x: 1,
            min_y: 1,
            max_x: 3,
            max_y: 3,
        };
        let e = b.expand(2, (5, 6));
        assert_eq!(
            e,
            BoundingBox {
                min_x: 0,
                min_y: 0,
                max_x: 5,
                max_y: 4
            }
        );
        assert!(e.is_at_border(&PixelCoord::new(0, 2)));
        assert!(!e.is_at_border(&PixelCoord::new(2, 2)));
    }

    #[test]
    fn test_mask() {
        let r = square(0, 0, 2).union(&square(9, 9, 1));
        let m = r.to_mask((3, 3));
        assert_eq!(m.iter().filter(|v| **v).count(), 4);
        assert!(r.within((10, 10)));
        assert!(!r.within((3, 3)));
    }
}
