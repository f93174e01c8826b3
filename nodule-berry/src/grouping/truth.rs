use super::Annotation;
use std::collections::HashMap;

/// 真值来源. 按切片标识给出该切片的全部标注.
///
/// 实际的数据导入与持久化不属于本 crate; 调用方只需实现该 trait.
pub trait GroundTruthProvider {
    /// 获取切片 `slice_uid` 的全部标注. 未知切片返回空列表.
    fn annotations(&self, slice_uid: &str) -> Vec<Annotation>;
}

/// 完全位于内存中的真值来源.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGroundTruth {
    by_slice: HashMap<String, Vec<Annotation>>,
}

impl InMemoryGroundTruth {
    /// 初始化空容器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 按标注自身的切片标识插入.
    pub fn insert(&mut self, annotation: Annotation) {
        self.by_slice
            .entry(annotation.slice_uid.clone())
            .or_default()
            .push(annotation);
    }

    /// 标注总数.
    pub fn len(&self) -> usize {
        self.by_slice.values().map(Vec::len).sum()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_slice.is_empty()
    }

    /// 所有有标注的切片标识, 按字典序排列.
    pub fn slices(&self) -> Vec<&str> {
        let mut ans: Vec<&str> = self.by_slice.keys().map(String::as_str).collect();
        ans.sort_unstable();
        ans
    }
}

impl GroundTruthProvider for InMemoryGroundTruth {
    fn annotations(&self, slice_uid: &str) -> Vec<Annotation> {
        self.by_slice.get(slice_uid).cloned().unwrap_or_default()
    }
}

impl FromIterator<Annotation> for InMemoryGroundTruth {
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        let mut ans = Self::new();
        ans.extend(iter);
        ans
    }
}

impl Extend<Annotation> for InMemoryGroundTruth {
    fn extend<T: IntoIterator<Item = Annotation>>(&mut self, iter: T) {
        iter.into_iter().for_each(|a| self.insert(a));
    }
}

#[cfg(test)]
mod tests {
    use super::{GroundTruthProvider, InMemoryGroundTruth};
    use crate::grouping::{Annotation, NoduleKind};
    use crate::PixelCoord;

    #[test]
    fn test_lookup_by_slice() {
        let gt: InMemoryGroundTruth = [
            ("s1", 1, 1),
            ("s2", 5, 5),
            ("s1", 9, 9),
        ]
        .into_iter()
        .map(|(uid, x, y)| {
            Annotation::point(PixelCoord::new(x, y), NoduleKind::SmallNodule, "r0", uid, "ser")
        })
        .collect();

        assert_eq!(gt.len(), 3);
        assert_eq!(gt.slices(), ["s1", "s2"]);
        let s1 = gt.annotations("s1");
        assert_eq!(s1.len(), 2);
        assert!(s1.iter().all(|a| a.is_point() && a.slice_uid == "s1"));
        assert!(gt.annotations("missing").is_empty());
    }
}
