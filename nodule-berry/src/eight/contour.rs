use super::neighbour4;
use crate::{PixelCoord, Region};

/// 获取区域的边界像素: 区域内 4-邻域中至少有一个像素不属于该区域的像素.
///
/// 结果按光栅扫描顺序排列. 位于图像第 0 行/列的像素因其越界的邻居也被视为边界.
/// 空区域返回空轮廓.
pub fn contour(region: &Region) -> Vec<PixelCoord> {
    let mut ans: Vec<PixelCoord> = region
        .iter()
        .copied()
        .filter(|p| {
            neighbour4(p.hw()).into_iter().any(|(h, w)| {
                // 回绕的索引一定不在区域内.
                !region.contains(&PixelCoord::from_hw((h, w)))
            })
        })
        .collect();
    ans.sort_unstable();
    ans
}

#[cfg(test)]
mod tests {
    use super::contour;
    use crate::{PixelCoord, Region};

    fn filled(x0: usize, y0: usize, w: usize, h: usize) -> Region {
        (y0..y0 + h)
            .flat_map(|y| (x0..x0 + w).map(move |x| PixelCoord::new(x, y)))
            .collect()
    }

    #[test]
    fn test_square_contour() {
        let r = filled(1, 1, 4, 4);
        let c = contour(&r);
        // 4x4 方块的边界有 12 个像素, 内部 2x2 不在边界上.
        assert_eq!(c.len(), 12);
        assert!(!c.contains(&PixelCoord::new(2, 2)));
        assert!(c.contains(&PixelCoord::new(1, 1)));
        assert!(c.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_thin_shapes_are_all_boundary() {
        let line = filled(0, 0, 5, 1);
        assert_eq!(contour(&line).len(), 5);
        assert!(contour(&Region::new()).is_empty());
    }
}
