//! 单通道强度图像.

use super::region::BoundingBox;
use crate::{CtWindow, Idx2d};
use ndarray::iter::Iter;
use ndarray::{s, Array2, ArrayView2, Ix2};
use std::ops::Index;

/// 不可变、借用的二维单通道强度图像 (8-bit 范围, 以 `f32` 保存).
#[derive(Copy, Clone, Debug)]
pub struct IntensitySlice<'a> {
    /// 底层数据的轻量级视图.
    data: ArrayView2<'a, f32>,
}

impl<'a> IntensitySlice<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'a, f32> {
        self.data
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 获得图像的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获得图像的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 强度)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }

    /// 裁剪出 `bbox` 覆盖的子图. 不发生拷贝.
    ///
    /// `bbox` 越界时程序 panic.
    #[inline]
    pub fn crop(&self, bbox: &BoundingBox) -> IntensitySlice<'a> {
        let view = self
            .data
            .slice_move(s![bbox.min_y..=bbox.max_y, bbox.min_x..=bbox.max_x]);
        IntensitySlice { data: view }
    }

    /// 克隆自己, 获得一个拥有所有权的图像对象.
    pub fn to_owned(&self) -> OwnedIntensitySlice {
        OwnedIntensitySlice {
            data: self.data.to_owned(),
        }
    }
}

impl Index<Idx2d> for IntensitySlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 拥有所有权的二维单通道强度图像.
///
/// `OwnedIntensitySlice` 仅提供到 `IntensitySlice` 的轻量转换、
/// 来自外部格式的构造和底层数据移动.
#[derive(Clone, Debug)]
pub struct OwnedIntensitySlice {
    data: Array2<f32>,
}

impl OwnedIntensitySlice {
    /// 直接由数组构建.
    #[inline]
    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// 由 8-bit 灰度图构建.
    pub fn from_gray_image(img: &image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let data = Array2::from_shape_fn((height as usize, width as usize), |(h, w)| {
            img.get_pixel(w as u32, h as u32).0[0] as f32
        });
        Self { data }
    }

    /// 由 CT HU 切片经 `window` 加窗构建.
    #[inline]
    pub fn from_hu(hu: ArrayView2<f32>, window: CtWindow) -> Self {
        Self {
            data: window.apply(hu),
        }
    }

    /// 获得不可变图像引用.
    #[inline]
    pub fn as_immut(&self) -> IntensitySlice<'_> {
        IntensitySlice::new(self.data.view())
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f32> {
        self.data
    }
}
