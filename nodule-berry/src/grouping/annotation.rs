use crate::{PixelCoord, Region};
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 标注类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoduleKind {
    /// 直径不小于 3mm 的结节, 以轮廓标注.
    BigNodule,

    /// 小结节, 通常仅标注中心点.
    SmallNodule,

    /// 非结节, 仅标注中心点.
    NonNodule,
}

impl NoduleKind {
    /// 是否为结节 (大或小).
    #[inline]
    pub fn is_nodule(&self) -> bool {
        !matches!(self, Self::NonNodule)
    }
}

impl Display for NoduleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BigNodule => "big nodule",
            Self::SmallNodule => "small nodule",
            Self::NonNodule => "non-nodule",
        };
        f.write_str(s)
    }
}

/// 一条放射科医生标注 (真值).
///
/// 由外部的数据导入流程创建, 在本 crate 内只读.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Annotation {
    /// 标注覆盖的像素.
    pub region: Region,

    /// 标注类型.
    pub kind: NoduleKind,

    /// 阅片标识, 用于区分不同医生的独立阅片.
    pub reading_id: String,

    /// 切片标识.
    pub slice_uid: String,

    /// 序列标识.
    pub series_uid: String,
}

impl Annotation {
    /// 以轮廓区域初始化.
    pub fn new(
        region: Region,
        kind: NoduleKind,
        reading_id: impl Into<String>,
        slice_uid: impl Into<String>,
        series_uid: impl Into<String>,
    ) -> Self {
        Self {
            region,
            kind,
            reading_id: reading_id.into(),
            slice_uid: slice_uid.into(),
            series_uid: series_uid.into(),
        }
    }

    /// 仅有中心点的标注, 以单像素区域表示.
    pub fn point(
        center: PixelCoord,
        kind: NoduleKind,
        reading_id: impl Into<String>,
        slice_uid: impl Into<String>,
        series_uid: impl Into<String>,
    ) -> Self {
        Self::new(
            std::iter::once(center).collect(),
            kind,
            reading_id,
            slice_uid,
            series_uid,
        )
    }

    /// 是否为仅有中心点的标注.
    #[inline]
    pub fn is_point(&self) -> bool {
        self.region.len() == 1
    }
}
