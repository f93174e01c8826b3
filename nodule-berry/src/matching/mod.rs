//! 区域重合度评分 (Jaccard 指数) 与候选区域标注.

use crate::grouping::ConsolidatedRegion;
use crate::Region;
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 计算 `|A ∩ B| / |A ∪ B|`.
///
/// 结果位于 `[0, 1]`, 且关于两个参数对称. 当两者的并集为空时结果无定义,
/// 返回 `None`.
pub fn jaccard(a: &Region, b: &Region) -> Option<f64> {
    let inter = a.intersection_len(b);
    match a.len() + b.len() - inter {
        0 => None,
        union => Some(inter as f64 / union as f64),
    }
}

/// 一个候选区域相对于所有真值区域的最佳匹配.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateLabel {
    /// 最佳匹配的真值序号. 没有任何可比较的真值时为 `None`.
    pub best_truth: Option<usize>,

    /// 最佳 Jaccard 指数. 没有任何可比较的真值时为 0.
    pub score: f64,

    /// `score` 是否严格超过门限, 即是否为正样本.
    pub positive: bool,
}

/// 为每个候选区域找出 Jaccard 指数最高的结节真值区域, 并按 `threshold` 判定正负样本.
///
/// 非结节 ([`crate::grouping::NoduleKind::NonNodule`]) 真值不参与比较, 因此永远不会使候选成为正样本.
/// 结果与 `candidates` 一一对应, `best_truth` 是 `truths` 中的序号.
/// 分数相同时取序号较小的真值.
pub fn label_candidates(
    candidates: &[Region],
    truths: &[ConsolidatedRegion],
    threshold: f64,
) -> Vec<CandidateLabel> {
    candidates
        .iter()
        .map(|c| {
            let best = truths
                .iter()
                .enumerate()
                .filter(|(_, t)| t.kind.is_nodule())
                .filter_map(|(i, t)| jaccard(c, &t.region).map(|s| (i, s)))
                // `max_by_key` 在相等时取最后一个, 因此先反转.
                .rev()
                .max_by_key(|&(_, s)| OrderedFloat(s));
            match best {
                Some((i, score)) => CandidateLabel {
                    best_truth: Some(i),
                    score,
                    positive: score > threshold,
                },
                None => CandidateLabel {
                    best_truth: None,
                    score: 0.0,
                    positive: false,
                },
            }
        })
        .collect()
}
