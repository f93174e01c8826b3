use super::{Annotation, NoduleKind};
use crate::eight::contour;
use crate::matching::jaccard;
use crate::{PixelCoord, Region};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 分组默认匹配门限.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.1;

/// 分组失败的原因.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GroupingError {
    /// 匹配关系不满足传递性, 导致某条标注同时属于多个分组.
    ///
    /// `annotation` 为该标注在输入中的序号, `groups` 为包含它的分组数.
    OverlappingGroups {
        /// 标注序号.
        annotation: usize,
        /// 包含该标注的分组数.
        groups: usize,
    },

    /// 匹配门限不在 `[0, 1)` 内.
    InvalidThreshold(f64),
}

impl Display for GroupingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverlappingGroups { annotation, groups } => {
                write!(f, "标注 #{annotation} 同时属于 {groups} 个分组")
            }
            Self::InvalidThreshold(t) => write!(f, "匹配门限 {t} 不在 [0, 1) 内"),
        }
    }
}

impl std::error::Error for GroupingError {}

/// 分组结果.
pub type GroupingResult<T> = Result<T, GroupingError>;

/// 分组参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupingParams {
    /// 两条标注的 Jaccard 指数严格大于该值时视为同一结节.
    pub match_threshold: f64,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// 被认为描述同一个结节的一组标注. 只借用标注, 不拥有它们.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationGroup<'a> {
    indices: Vec<usize>,
    members: Vec<&'a Annotation>,
}

impl<'a> AnnotationGroup<'a> {
    /// 成员个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// 是否为空. 由 [`group_annotations`] 返回的分组永不为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 成员在输入中的序号, 升序.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 成员, 与 `indices` 一一对应.
    #[inline]
    pub fn members(&self) -> &[&'a Annotation] {
        &self.members
    }
}

/// 多条标注合并后的区域. 成员变化时必须重新计算, 而不是原地修改.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsolidatedRegion {
    /// 所有成员区域的并集, 非空.
    pub region: Region,

    /// `region` 的边界像素, 光栅扫描顺序.
    pub contour: Vec<PixelCoord>,

    /// `region` 的质心 `(x, y)`.
    pub centroid: (f64, f64),

    /// 成员的标注类型. 同一分组内的成员类型相同.
    pub kind: NoduleKind,

    /// 首个成员的切片标识.
    pub slice_uid: String,

    /// 首个成员的序列标识.
    pub series_uid: String,

    /// 成员个数.
    pub members: usize,
}

impl ConsolidatedRegion {
    /// 由已合并的区域直接构建. 区域为空时返回 `None`.
    pub fn from_region(
        region: Region,
        kind: NoduleKind,
        slice_uid: impl Into<String>,
        series_uid: impl Into<String>,
        members: usize,
    ) -> Option<Self> {
        let centroid = region.centroid()?;
        Some(Self {
            contour: contour(&region),
            region,
            centroid,
            kind,
            slice_uid: slice_uid.into(),
            series_uid: series_uid.into(),
            members,
        })
    }
}

/// 将同一切片上的标注划分为互不相交的分组.
///
/// 对每条标注 `i`, 构造集合 `{i} ∪ {j : kind(j) = kind(i), jaccard(i, j) > threshold}`,
/// 去重后作为候选分组. 不同类型的标注永不进入同一分组;
/// 并集为空的标注对视为不匹配.
///
/// 匹配关系不一定具有传递性, 因此候选分组可能相交. 此时不尝试修复,
/// 直接返回 [`GroupingError::OverlappingGroups`], 报告输入中第一条
/// 被多个分组包含的标注.
///
/// 成功时, 每条标注恰好属于一个分组; 分组按成员序号的字典序排列.
pub fn group_annotations(
    annotations: &[Annotation],
    threshold: f64,
) -> GroupingResult<Vec<AnnotationGroup<'_>>> {
    if !(0.0..1.0).contains(&threshold) {
        return Err(GroupingError::InvalidThreshold(threshold));
    }

    let candidates: BTreeSet<BTreeSet<usize>> = (0..annotations.len())
        .map(|i| {
            (0..annotations.len())
                .filter(|&j| {
                    let (a, b) = (&annotations[i], &annotations[j]);
                    i == j
                        || (a.kind == b.kind
                            && jaccard(&a.region, &b.region).is_some_and(|s| s > threshold))
                })
                .collect()
        })
        .collect();

    let mut owners = vec![0usize; annotations.len()];
    for idx in candidates.iter().flatten() {
        owners[*idx] += 1;
    }
    if let Some((annotation, &groups)) = owners.iter().enumerate().find(|&(_, &n)| n > 1) {
        return Err(GroupingError::OverlappingGroups { annotation, groups });
    }

    let ans: Vec<AnnotationGroup> = candidates
        .into_iter()
        .map(|set| {
            let indices: Vec<usize> = set.into_iter().collect();
            let members = indices.iter().map(|&i| &annotations[i]).collect();
            AnnotationGroup { indices, members }
        })
        .collect();
    log::debug!(
        "grouped {} annotations into {} groups",
        annotations.len(),
        ans.len()
    );
    Ok(ans)
}

/// 合并分组内所有成员的区域.
///
/// 并集为空 (例如轮廓内不含任何像素的畸形标注) 时返回 `None`, 这不是错误.
pub fn consolidate(group: &AnnotationGroup) -> Option<ConsolidatedRegion> {
    let first = group.members.first()?;
    let mut region = Region::new();
    for a in group.members.iter() {
        region.extend(a.region.iter().copied());
    }
    ConsolidatedRegion::from_region(
        region,
        first.kind,
        first.slice_uid.as_str(),
        first.series_uid.as_str(),
        group.len(),
    )
}

/// 对所有分组调用 [`consolidate`], 丢弃空的合并结果.
pub fn consolidate_all(groups: &[AnnotationGroup]) -> Vec<ConsolidatedRegion> {
    let ans: Vec<ConsolidatedRegion> = groups.iter().filter_map(consolidate).collect();
    if ans.len() < groups.len() {
        log::debug!("dropped {} empty groups", groups.len() - ans.len());
    }
    ans
}
