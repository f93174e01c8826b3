#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供 CT 切片上肺结节候选区域的检测, 局部精化,
//! 以及多位放射科医生标注的分组与评分.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 本 crate 不负责 DICOM/XML 的读取与持久化, 也不负责分类器训练.
//!   调用方负责提供单通道强度图像 (8-bit 范围) 和每张切片的标注
//!   (见 [`grouping::GroundTruthProvider`]).
//! 2. 内部数组一律以 `(h, w)` 索引; 对外公开的像素坐标 [`PixelCoord`] 为 `(x, y)`.
//! 3. 单个候选或单张切片的一致性错误以 `Result` 返回, 由调用方记录并跳过;
//!   违反接口约定 (例如形状不匹配) 时, 程序会直接 panic, 而不会导致内存错误.
//!
//! # 开发计划
//!
//! ### 8-邻域连通区域提取 ✅
//!
//! 显式栈 flood fill, 已访问像素记录在独立的位图中, 输入编号图不被修改.
//!
//! 实现位于 `nodule-berry/src/eight`.
//!
//! ### DoG 多尺度斑点检测 ✅
//!
//! 尺度序列 `[1, 3, 9, 15, ...]`, 梯度幅值门限为下限.
//!
//! 实现位于 `nodule-berry/src/blob`.
//!
//! ### 斑点候选局部精化 ✅
//!
//! 面积翻倍的局部窗口 + 大津法 + 渗入结构去除. 成功/失败计数由调用方注入.
//!
//! 实现位于 `nodule-berry/src/post_proc`.
//!
//! ### Jaccard 评分与标注分组 ✅
//!
//! 匹配关系不满足传递性时报告错误, 不做传递闭包.
//!
//! 实现位于 `nodule-berry/src/matching` 与 `nodule-berry/src/grouping`.
//!
//! ### 单切片流程与并行分发 ✅
//!
//! 实现位于 `nodule-berry/src/pipeline`.
//!
//! ### 参数消融实验 ✅
//!
//! 合成模体上的 DoG 参数扫描, 见 `ablations/sweep`.
//!
//! ### 分组冲突的自动消解 ⌛️
//!
//! 目前分组冲突被视为数据一致性错误. 是否改为并查集传递闭包, 需要在真实标注上评估后再决定.

/// 二维索引 `(h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 一个区域的 `(h, w)` 索引列表. 该结构不对外公开.
type Area2d = Vec<Idx2d>;

/// 基础数据结构.
mod data;

pub use data::{
    BoundingBox, CtWindow, ImgWriteRaw, ImgWriteVis, IntensitySlice, LabelGrid, LabelGridError,
    OwnedIntensitySlice, PixelCoord, PosIter, Region,
};

pub mod consts;

pub mod eight;

pub mod blob;

pub mod post_proc;

pub mod matching;

pub mod grouping;

pub mod pipeline;

pub mod prelude;
