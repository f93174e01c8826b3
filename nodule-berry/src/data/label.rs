//! 连通分量编号图 (label grid).

use crate::consts::label::*;
use crate::Idx2d;
use ndarray::{Array2, ArrayView2};
use std::fmt::{Display, Formatter};
use std::ops::Index;

/// 与源图像同尺寸的二维整数编号图.
///
/// 取值含义:
///
/// - `-1` ([`LABEL_BOUNDARY`]): 分水岭类分割输出的边界/未知像素;
/// - `0` ([`LABEL_BACKGROUND`]): 背景;
/// - `1..=n`: 连通分量编号.
///
/// 其余负数均为非法值, 构造时即被拒绝. 区域提取不会修改该结构,
/// 因此同一个 `LabelGrid` 可以被反复使用.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGrid {
    data: Array2<i32>,
}

/// [`LabelGrid`] 构造错误.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelGridError {
    /// 在 `pos` (高, 宽) 处发现了非法值 `value`.
    InvalidValue {
        /// 位置.
        pos: Idx2d,
        /// 非法值.
        value: i32,
    },
}

impl Display for LabelGridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { pos, value } => {
                write!(f, "label grid 在 {pos:?} 处含有非法值 `{value}`")
            }
        }
    }
}

impl std::error::Error for LabelGridError {}

impl LabelGrid {
    /// 校验并构建. 若存在小于 `-1` 的值, 返回首个 (行优先) 非法位置.
    pub fn new(data: Array2<i32>) -> Result<Self, LabelGridError> {
        match data.indexed_iter().find(|(_, &v)| !is_valid(v)) {
            Some((pos, &value)) => Err(LabelGridError::InvalidValue { pos, value }),
            None => Ok(Self { data }),
        }
    }

    /// 对布尔掩码按 8-相邻规则做连通分量编号. 编号从 1 开始,
    /// 以每个分量中首个 (行优先) 像素出现的顺序递增.
    #[inline]
    pub fn from_binary(mask: ArrayView2<bool>) -> Self {
        Self::from_raw_unchecked(crate::eight::label_components(mask))
    }

    /// 内部方法, 跳过校验直接初始化. 调用方保证取值合法.
    #[inline]
    pub(crate) fn from_raw_unchecked(data: Array2<i32>) -> Self {
        debug_assert!(data.iter().all(|v| is_valid(*v)));
        Self { data }
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<i32> {
        self.data.view()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<i32> {
        self.data
    }

    /// 编号图的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得编号图的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获得编号图的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }


    /// 获取给定位置 (高, 宽) 的编号. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&i32> {
        self.data.get(pos)
    }

    /// 以行优先规则, 获取能迭代图像所有索引的迭代器.
    #[inline]
    pub fn pos_iter(&self) -> impl Iterator<Item = Idx2d> {
        super::iter::PosIter::new(self.shape())
    }

    /// 以行优先规则, 获取能迭代所有 `(索引, 编号)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &i32)> {
        self.data.indexed_iter()
    }

    /// 统计属于连通分量 (编号为正) 的像素个数.
    #[inline]
    pub fn component_pixels(&self) -> usize {
        self.data.iter().filter(|v| is_component(**v)).count()
    }
}

impl Index<Idx2d> for LabelGrid {
    type Output = i32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl TryFrom<Array2<i32>> for LabelGrid {
    type Error = LabelGridError;

    #[inline]
    fn try_from(value: Array2<i32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{LabelGrid, LabelGridError};
    use ndarray::{array, Array2};

    #[test]
    fn test_rejects_sentinel() {
        let data = array![[0, 1, 1], [-1, -2, 0]];
        assert_eq!(
            LabelGrid::new(data).unwrap_err(),
            LabelGridError::InvalidValue {
                pos: (1, 1),
                value: -2
            }
        );
    }

    #[test]
    fn test_accepts_watershed_output() {
        let grid = LabelGrid::new(array![[0, 1, -1], [2, 2, -1]]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.component_pixels(), 3);
        assert_eq!(grid[(1, 0)], 2);
    }

    #[test]
    fn test_from_binary() {
        let mut mask = Array2::from_elem((3, 5), false);
        mask[(0, 0)] = true;
        mask[(1, 1)] = true; // 与 (0, 0) 对角相邻
        mask[(0, 4)] = true;
        let grid = LabelGrid::from_binary(mask.view());
        assert_eq!(grid[(0, 0)], 1);
        assert_eq!(grid[(1, 1)], 1);
        assert_eq!(grid[(0, 4)], 2);
        assert_eq!(grid[(2, 2)], 0);
    }
}
