//! 行优先 (光栅扫描) 索引迭代器.

use crate::Idx2d;

/// 行优先索引迭代器, 遍历形状为 `(h, w)` 的图像的全部索引.
///
/// 与 `(0..h).flat_map(...)` 组合相比, 该结构体积更小且能精确报告剩余长度,
/// 区域提取等按光栅顺序处理的算法都基于它.
#[derive(Clone, Debug)]
pub struct PosIter {
    /// 图像形状 `(h, w)`.
    shape: Idx2d,
    /// 下一个待返回的相对偏移 (行优先线性编号).
    cursor: usize,
}

impl PosIter {
    /// 遍历形状为 `shape` 的整张图像.
    #[inline]
    pub fn new(shape: Idx2d) -> Self {
        Self { shape, cursor: 0 }
    }

    #[inline]
    fn total(&self) -> usize {
        self.shape.0 * self.shape.1
    }
}

impl Iterator for PosIter {
    type Item = Idx2d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.total() {
            return None;
        }
        let pos = (self.cursor / self.shape.1, self.cursor % self.shape.1);
        self.cursor += 1;
        Some(pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.total().saturating_sub(self.cursor);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for PosIter {}

#[cfg(test)]
mod tests {
    use super::PosIter;
    use crate::Idx2d;

    fn pos_iter_builtin((h, w): Idx2d) -> impl Iterator<Item = Idx2d> {
        (0..h).flat_map(move |first| (0..w).map(move |second| (first, second)))
    }

    #[test]
    fn test_matches_nested_loops() {
        for i in 0..=4 {
            for j in 0..=4 {
                let tup = (i, j);
                assert!(Iterator::eq(pos_iter_builtin(tup), PosIter::new(tup)));
                assert_eq!(PosIter::new(tup).len(), i * j);
            }
        }
    }

    #[test]
    fn test_len_shrinks() {
        let mut it = PosIter::new((2, 3));
        it.next();
        it.next();
        assert_eq!(it.len(), 4);
        assert_eq!(it.next(), Some((0, 2)));
        assert_eq!(it.next(), Some((1, 0)));
    }
}
