//! Geometry of the trihedral rig.
//!
//! Current focus:
//! - box volumes and the analytic box difference behind `VolumeSubtractor`,
//! - assembly of the floor, back wall and right wall,
//! - marker poses and the fixed marker map,
//! - the active-area mapping that keeps the checker inside the margins.
//!
//! Meshes, materials and file output live in `trihedral-export`.

mod active_area;
mod error;
mod layout;
mod marker;
mod panel;
mod resources;
mod volume;

pub use active_area::{
    mix, to_u8, ActiveAreaMapping, ActiveAreaShader, CheckerRaster, ColorLayer, Rgba, SolidColor,
    CHECKER_DARK, CHECKER_LIGHT, DEFAULT_PX_PER_SQUARE, MARGIN_COLOR, TRANSPARENT,
};
pub use error::RigError;
pub use layout::{ensure_unique_ids, forward_layout, rig_markers};
pub use marker::{
    corner_center, marker_quad, orientation_for_normal, MarkerId, MarkerPlacer, MarkerPose,
    MarkerQuad, MarkerSlot, MarkerSpec, ALIGNED_COS, MARKER_UVS,
};
pub use panel::{assemble_panels, floor_cutout, PanelRole, PanelSet, PanelSpec};
pub use resources::{default_marker_file_name, MarkerImages};
pub use volume::{
    build_box, intersection, AxisAlignedDifference, Solid, VolumeError, VolumeSubtractor,
};
