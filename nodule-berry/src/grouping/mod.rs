//! 标注分组: 将同一切片上不同阅片的标注划分为描述同一结节的等价类, 并合并其区域.
//!
//! 分组依赖 [`crate::matching::jaccard`] 判断两条标注是否匹配.
//! 由于基于门限的匹配关系不保证传递性, 分组可能失败
//! (见 [`GroupingError::OverlappingGroups`]); 调用方应跳过该切片, 而不是终止整个批处理.

mod annotation;
mod engine;
mod truth;

pub use annotation::{Annotation, NoduleKind};
pub use engine::{
    consolidate, consolidate_all, group_annotations, AnnotationGroup, ConsolidatedRegion,
    GroupingError, GroupingParams, GroupingResult, DEFAULT_MATCH_THRESHOLD,
};
pub use truth::{GroundTruthProvider, InMemoryGroundTruth};
