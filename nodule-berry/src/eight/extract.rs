use super::neighbour8;
use crate::consts::label::*;
use crate::data::PosIter;
use crate::{Area2d, Idx2d, LabelGrid, Region};
use ndarray::{Array2, ArrayView2};

/// 从连通分量编号图中提取所有区域.
///
/// 以行优先顺序扫描 `grid`, 每遇到一个尚未被收集的正编号像素,
/// 就以它为种子做 8-相邻 flood fill, 收集所有与之连通且编号相同的像素.
/// `0` (背景) 和 `-1` (边界) 不会出现在任何区域中.
///
/// # 保证
///
/// 1. 每个正编号像素恰好属于一个返回的区域;
/// 2. 返回的区域都非空, 且顺序只取决于输入 (按种子的光栅扫描顺序);
/// 3. 同一编号若由多个互不 8-相邻的部分组成, 每部分各自成为一个区域;
/// 4. `grid` 不会被修改. 已访问像素记录在独立的位图中.
pub fn extract_regions(grid: &LabelGrid) -> Vec<Region> {
    let view = grid.array_view();
    let mut visited = Array2::from_elem(grid.shape(), false);
    let mut stack = Vec::with_capacity(16);
    let mut ans = Vec::with_capacity(4);

    for pos in grid.pos_iter() {
        let id = grid[pos];
        if !is_component(id) || visited[pos] {
            continue;
        }
        let area = flood_fill(pos, |p| view[p] == id, &mut visited, &mut stack);
        debug_assert!(!area.is_empty());
        ans.push(Region::from_hw_iter(area));
    }
    debug_assert_eq!(
        ans.iter().map(Region::len).sum::<usize>(),
        grid.component_pixels()
    );
    log::trace!("extracted {} regions from {:?} grid", ans.len(), grid.shape());
    ans
}

/// 对二值掩码按 8-相邻规则做连通分量编号.
///
/// 返回与 `mask` 同形状的编号数组: 背景为 [`LABEL_BACKGROUND`],
/// 分量编号从 [`FIRST_COMPONENT`] 开始, 按分量首个像素的光栅扫描顺序递增.
pub fn label_components(mask: ArrayView2<bool>) -> Array2<i32> {
    let mut labels = Array2::from_elem(mask.dim(), LABEL_BACKGROUND);
    let mut visited = Array2::from_elem(mask.dim(), false);
    let mut stack = Vec::with_capacity(16);
    let mut next = FIRST_COMPONENT;

    for pos in PosIter::new(mask.dim()) {
        if !mask[pos] || visited[pos] {
            continue;
        }
        for p in flood_fill(pos, |p| mask[p], &mut visited, &mut stack) {
            labels[p] = next;
        }
        next += 1;
    }
    labels
}

/// 以 `seed` 为起点的显式栈 8-相邻 flood fill.
///
/// 收集所有从 `seed` 出发经由满足 `pred` 的像素可达的像素 (包括 `seed`).
/// 像素在入栈时即被标记为已访问, 因此不会被重复收集.
/// `visited` 与 `stack` 由调用方提供, 以便在多次调用间复用内存.
///
/// # 注意
///
/// `seed` 必须满足 `pred` 且尚未被访问, 否则程序行为未定义.
fn flood_fill<F>(
    seed: Idx2d,
    pred: F,
    visited: &mut Array2<bool>,
    stack: &mut Vec<Idx2d>,
) -> Area2d
where
    F: Fn(Idx2d) -> bool,
{
    let (h_len, w_len) = visited.dim();
    let mut area = Area2d::with_capacity(8);

    stack.clear();
    visited[seed] = true;
    stack.push(seed);

    while let Some(cur) = stack.pop() {
        area.push(cur);
        for next in neighbour8(cur) {
            if next.0 < h_len && next.1 < w_len && !visited[next] && pred(next) {
                visited[next] = true;
                stack.push(next);
            }
        }
    }
    area
}
