//! 图像的持久化存储, 主要用于调试检测与精化结果.

use crate::consts::{gray::*, label::*, ElemType};
use crate::{IntensitySlice, LabelGrid};
use image::{ImageBuffer, ImageResult, Luma};
use ndarray::Array2;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 [`LabelGrid`], 背景/边界/各分量会被映射到肉眼较易区分的灰度;
/// 对于 [`IntensitySlice`], 强度被截断到 `[0, 255]` 后保存;
/// 对于二值掩码 (例如 [`crate::Region::to_mask`] 的结果), 前景为白色, 背景为黑色.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// [`LabelGrid`] 以 16-bit 灰度 PNG 保存, 边界像素存为 `u16::MAX`.
/// 编号超出 16-bit 时会被截断, 调用方需自行保证.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使编号更有利于单通道可视化. 相邻编号的灰度尽量拉开.
#[inline]
pub(crate) fn pretty(label: i32) -> u8 {
    match label {
        LABEL_BACKGROUND => BLACK,
        LABEL_BOUNDARY => DARK_GRAY,
        id => GRAY + ((id as u32).wrapping_mul(37) % (WHITE - GRAY) as u32) as u8 + 1,
    }
}

impl ImgWriteVis for LabelGrid {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &id) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pretty(id)]));
        }
        buf.save(path)
    }
}

impl ImgWriteRaw for LabelGrid {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::new(width as u32, height as u32);
        for ((h, w), &id) in self.indexed_iter() {
            let raw = if id == LABEL_BOUNDARY {
                u16::MAX
            } else {
                id.clamp(0, u16::MAX as i32) as u16
            };
            buf.put_pixel(w as u32, h as u32, Luma([raw]));
        }
        buf.save(path)
    }
}

impl ImgWriteVis for IntensitySlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            let gray = if v.is_finite() {
                v.clamp(0.0, INTENSITY_MAX) as u8
            } else {
                BLACK
            };
            buf.put_pixel(w as u32, h as u32, Luma([gray]));
        }
        buf.save(path)
    }
}

impl ImgWriteVis for Array2<bool> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.dim();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([ElemType::from(v).gray()]));
        }
        buf.save(path)
    }
}
