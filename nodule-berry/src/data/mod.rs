//! 基础数据结构: 像素坐标, 区域, 编号图, 强度图像与 CT 窗口.

pub mod intensity;
pub mod iter;
pub mod label;
pub mod region;
pub mod save;
pub mod window;

pub use intensity::{IntensitySlice, OwnedIntensitySlice};
pub use iter::PosIter;
pub use label::{LabelGrid, LabelGridError};
pub use region::{BoundingBox, PixelCoord, Region};
pub use save::{ImgWriteRaw, ImgWriteVis};
pub use window::CtWindow;
