//! 通用常量.

/// [`crate::LabelGrid`] 中的特殊标记值.
pub mod label {
    /// 分水岭类分割算法输出的边界 (或未知) 像素.
    pub const LABEL_BOUNDARY: i32 = -1;

    /// 背景像素.
    pub const LABEL_BACKGROUND: i32 = 0;

    /// 第一个合法的连通分量编号.
    pub const FIRST_COMPONENT: i32 = 1;

    /// 像素是否属于某个连通分量 (即编号为正)?
    #[inline]
    pub const fn is_component(v: i32) -> bool {
        v >= FIRST_COMPONENT
    }

    /// 像素值是否是 label grid 可接受的取值?
    ///
    /// 除 `-1` 以外的负数都是非法值. 特别地, flood fill 中常用的 `-2`
    /// 哨兵值不允许出现在输入中.
    #[inline]
    pub const fn is_valid(v: i32) -> bool {
        v >= LABEL_BOUNDARY
    }
}

/// 单通道颜色.
pub mod gray {
    /// 二值图像中, 背景的像素值.
    pub const BINARY_BACKGROUND: u8 = 0;

    /// 二值图像中, 前景的像素值.
    pub const BINARY_FOREGROUND: u8 = 255;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道亮灰色.
    pub const LIGHT_GRAY: u8 = 0b_1100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 8-bit 灰度图像的最大强度.
    pub const INTENSITY_MAX: f32 = 255.0;
}

/// 像素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// 背景.
    Background,

    /// 前景.
    Foreground,
}

impl ElemType {
    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// 是否为背景.
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.is_foreground()
    }

    /// 转换为二值图像中对应的灰度值.
    #[inline]
    pub fn gray(&self) -> u8 {
        match self {
            Self::Foreground => gray::BINARY_FOREGROUND,
            Self::Background => gray::BINARY_BACKGROUND,
        }
    }
}

impl From<bool> for ElemType {
    #[inline]
    fn from(foreground: bool) -> Self {
        if foreground {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

#[cfg(test)]
mod tests {
    use super::label::*;

    #[test]
    fn test_label_predicates() {
        assert!(is_valid(LABEL_BOUNDARY));
        assert!(is_valid(LABEL_BACKGROUND));
        assert!(is_valid(7));
        assert!(!is_valid(-2));

        assert!(!is_component(LABEL_BOUNDARY));
        assert!(!is_component(LABEL_BACKGROUND));
        assert!(is_component(FIRST_COMPONENT));
    }

    #[test]
    fn test_elem_type() {
        use super::{gray, ElemType};
        assert!(ElemType::from(true).is_foreground());
        assert!(ElemType::from(false).is_background());
        assert_eq!(ElemType::from(true).gray(), gray::BINARY_FOREGROUND);
    }
}
