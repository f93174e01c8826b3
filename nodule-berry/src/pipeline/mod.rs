//! 单切片处理流程, 以及多切片的顺序/并行分发.
//!
//! 每张切片依次经过:
//!
//! 1. 斑点检测 ([`detect_blobs`]);
//! 2. 以每个关键点为中心, 半径为 `sigma * sqrt(2)` (至少 1 像素) 的圆盘作为粗候选;
//! 3. 局部精化 ([`refine_blob`]). 失败的候选被记录并跳过;
//! 4. 该切片标注的分组与合并. 分组失败时记录错误, 该切片不产生真值;
//! 5. 以 Jaccard 指数为精化后的候选打正/负标签, 只与结节类型的真值比较.
//!
//! 任何单个候选或单张切片的失败都不会中断整个批处理.

use crate::blob::{detect_blobs, DogParams, KeyPoint};
use crate::grouping::{
    consolidate_all, group_annotations, ConsolidatedRegion, GroundTruthProvider, GroupingError,
    GroupingParams,
};
use crate::matching::{label_candidates, CandidateLabel};
use crate::post_proc::{refine_blob, RefineStats};
use crate::{IntensitySlice, PixelCoord, Region};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 候选正/负样本判定的默认 Jaccard 门限.
pub const DEFAULT_CLASSIFY_THRESHOLD: f64 = 0.5;

/// 流程参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineParams {
    /// 斑点检测参数.
    pub dog: DogParams,

    /// 标注分组参数.
    pub grouping: GroupingParams,

    /// 候选与真值的 Jaccard 指数严格超过该值时为正样本.
    pub classify_threshold: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            dog: DogParams::default(),
            grouping: GroupingParams::default(),
            classify_threshold: DEFAULT_CLASSIFY_THRESHOLD,
        }
    }
}

/// 单张切片的处理结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceReport {
    /// 切片标识.
    pub slice_uid: String,

    /// 检测到的全部关键点.
    pub keypoints: Vec<KeyPoint>,

    /// 精化成功且去重后的候选区域.
    pub candidates: Vec<Region>,

    /// 合并后的真值区域.
    pub truths: Vec<ConsolidatedRegion>,

    /// 与 `candidates` 一一对应的标签.
    pub labels: Vec<CandidateLabel>,

    /// 精化失败的关键点个数.
    pub refine_failures: usize,

    /// 标注分组失败时的错误.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub grouping_error: Option<GroupingError>,
}

impl SliceReport {
    /// 正样本个数.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|l| l.positive).count()
    }
}

/// 以关键点为中心的圆盘粗候选, 裁剪到形状为 `(h, w)` 的图像内.
///
/// 半径为 [`KeyPoint::radius`], 至少 1 像素.
pub fn coarse_region(kp: &KeyPoint, (h, w): (usize, usize)) -> Region {
    let r = kp.radius().max(1.0);
    let ri = r.floor() as usize;
    let PixelCoord { x: cx, y: cy } = kp.location();

    let ys = cy.saturating_sub(ri)..=(cy + ri).min(h.saturating_sub(1));
    ys.flat_map(|y| {
        let xs = cx.saturating_sub(ri)..=(cx + ri).min(w.saturating_sub(1));
        xs.map(move |x| PixelCoord::new(x, y))
    })
    .filter(|p| {
        let (dx, dy) = (p.x as f64 - cx as f64, p.y as f64 - cy as f64);
        dx * dx + dy * dy <= r * r
    })
    .collect()
}

/// 处理单张切片.
pub fn process_slice<P>(
    slice_uid: &str,
    image: IntensitySlice,
    provider: &P,
    params: &PipelineParams,
    stats: &RefineStats,
) -> SliceReport
where
    P: GroundTruthProvider + ?Sized,
{
    let keypoints = detect_blobs(image, &params.dog);

    let mut seen: HashSet<Vec<PixelCoord>> = HashSet::with_capacity(keypoints.len());
    let mut candidates = Vec::with_capacity(keypoints.len());
    let mut refine_failures = 0;
    for kp in keypoints.iter() {
        let coarse = coarse_region(kp, image.shape());
        match refine_blob(image, &coarse, stats) {
            Ok(region) => {
                // 多个关键点可能精化出同一个区域.
                if seen.insert(region.sorted()) {
                    candidates.push(region);
                }
            }
            Err(e) => {
                refine_failures += 1;
                log::warn!("{slice_uid}: skip keypoint at {:?}: {e}", kp.location());
            }
        }
    }

    let annotations = provider.annotations(slice_uid);
    let (truths, grouping_error) =
        match group_annotations(&annotations, params.grouping.match_threshold) {
            Ok(groups) => (consolidate_all(&groups), None),
            Err(e) => {
                log::warn!("{slice_uid}: skip ground truth: {e}");
                (vec![], Some(e))
            }
        };

    let labels = label_candidates(&candidates, &truths, params.classify_threshold);
    log::debug!(
        "{slice_uid}: {} keypoints, {} candidates ({} failed), {} truths",
        keypoints.len(),
        candidates.len(),
        refine_failures,
        truths.len()
    );

    SliceReport {
        slice_uid: slice_uid.to_string(),
        keypoints,
        candidates,
        truths,
        labels,
        refine_failures,
        grouping_error,
    }
}

/// 顺序处理多张切片. 结果与输入一一对应.
pub fn process_slices<P>(
    slices: &[(&str, IntensitySlice)],
    provider: &P,
    params: &PipelineParams,
    stats: &RefineStats,
) -> Vec<SliceReport>
where
    P: GroundTruthProvider + ?Sized,
{
    slices
        .iter()
        .map(|&(uid, image)| process_slice(uid, image, provider, params, stats))
        .collect()
}

/// 借助 `rayon`, 每张切片一个任务地并行处理. 结果与输入一一对应.
///
/// 所有任务共享同一个 `stats`.
#[cfg(feature = "rayon")]
pub fn par_process_slices<P>(
    slices: &[(&str, IntensitySlice)],
    provider: &P,
    params: &PipelineParams,
    stats: &RefineStats,
) -> Vec<SliceReport>
where
    P: GroundTruthProvider + Sync + ?Sized,
{
    slices
        .par_iter()
        .map(|&(uid, image)| process_slice(uid, image, provider, params, stats))
        .collect()
}
