//! 邻域相关的区域提取算法.
//!
//! - [`extract_regions`]: 从连通分量编号图中物化出每个分量的像素集合;
//! - [`label_components`]: 对二值掩码做 8-相邻连通分量编号;
//! - [`contour`]: 区域的 4-邻域边界像素.

mod contour;
mod extract;

pub use contour::contour;
pub use extract::{extract_regions, label_components};

use crate::Idx2d;

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
///
/// 越过上/左边界的索引会回绕成 `usize::MAX` 附近的值,
/// 调用方需用形状检查将其过滤.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::{neighbour4, neighbour8};

    #[test]
    fn test_neighbours_distinct() {
        let n8 = neighbour8((5, 5));
        for (i, a) in n8.iter().enumerate() {
            assert!(a.0.abs_diff(5) <= 1 && a.1.abs_diff(5) <= 1);
            assert_ne!(*a, (5, 5));
            assert!(n8.iter().skip(i + 1).all(|b| b != a));
        }
        assert!(neighbour4((5, 5)).iter().all(|p| n8.contains(p)));
    }

    #[test]
    fn test_neighbours_at_origin_wrap() {
        let out: Vec<_> = neighbour8((0, 0))
            .into_iter()
            .filter(|&(h, w)| h < 3 && w < 3)
            .collect();
        assert_eq!(out, [(0, 1), (1, 0), (1, 1)]);
    }
}
