//! 后处理流程集合: 斑点候选的局部精化.

mod otsu;
mod refine;
mod stats;

pub use otsu::{binarize, otsu_threshold};
pub use refine::{refine_blob, RefineError, RefineResult};
pub use stats::RefineStats;
