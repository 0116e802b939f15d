//! Classification of prebuilt rig parts.
//!
//! Given the bounding boxes of an already-built rig (for example a CAD
//! export), infer which part is the floor, which are the walls and which
//! parts are small enough to be tabs, then read labelled face corners off
//! the panels for marker placement.

mod classify;
mod corners;

pub use classify::{
    classify, size_class, ClassifyError, ClassifyParams, PartBounds, PartClassification,
    PartRole, RoleAssignment, SizeClass, PANEL_COUNT,
};
pub use corners::{face_corners, FaceSide};
