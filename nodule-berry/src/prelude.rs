//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::{
    BoundingBox, CtWindow, ImgWriteRaw, ImgWriteVis, IntensitySlice, LabelGrid, OwnedIntensitySlice,
    PixelCoord, Region,
};

pub use crate::consts::label::{FIRST_COMPONENT, LABEL_BACKGROUND, LABEL_BOUNDARY};
pub use crate::consts::ElemType;

pub use crate::blob::{detect_blobs, DogParams, KeyPoint};
pub use crate::eight::{contour, extract_regions};
pub use crate::grouping::{
    consolidate, group_annotations, Annotation, ConsolidatedRegion, GroundTruthProvider,
    InMemoryGroundTruth, NoduleKind,
};
pub use crate::matching::jaccard;
pub use crate::pipeline::{process_slice, process_slices, PipelineParams, SliceReport};
pub use crate::post_proc::{refine_blob, RefineStats};

#[cfg(feature = "rayon")]
pub use crate::pipeline::par_process_slices;
