//! High-level facade crate for the `trihedral-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying crates,
//! - the forward pipeline: resolved dimensions to a textured GLB with markers,
//! - the reconstruction pipeline: unlabeled part bounds to a laminated GLB
//!   with markers placed by inferred panel roles.
//!
//! ## Quickstart
//!
//! ```no_run
//! use trihedral::core::{resolve_file, DimensionParams, DEFAULT_DIMENSIONS_FILE};
//! use trihedral::export::GlbWriter;
//! use trihedral::rig::MarkerImages;
//! use trihedral::{build_rig, export, rig_scene, BuildOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolved = resolve_file(&DimensionParams::default(), DEFAULT_DIMENSIONS_FILE)?;
//! let build = build_rig(&resolved.config, &MarkerImages::new("markers"))?;
//! let scene = rig_scene(&build, &BuildOptions::default())?;
//! export(&scene, &GlbWriter::default(), Path::new("rig.glb"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `trihedral::core`: configuration, resolver, axis-aligned geometry.
//! - `trihedral::rig`: panels, cutout, marker placement, active-area mapping.
//! - `trihedral::classify`: role and size inference for prebuilt parts.
//! - `trihedral::export`: tessellation, texture baking, GLB output.

pub use trihedral_classify as classify;
pub use trihedral_core as core;
pub use trihedral_export as export;
pub use trihedral_rig as rig;

mod error;
mod parts_io;
mod pipeline;
mod reconstruct;
mod report;

pub use error::PipelineError;
pub use parts_io::{load_parts, PartInput, PartsDocument};
pub use pipeline::{build_rig, build_rig_with, export, rig_scene, BuildOptions, RigBuild};
pub use reconstruct::{
    reconstruct_rig, reconstruction_layout, reconstruction_scene, MarkerAnchor, PlacedMarker,
    ReconstructSlot, Reconstruction,
};
pub use report::{
    write_report, BuildReport, MarkerReport, PanelReport, PlacedMarkerReport, ReconstructReport,
    SceneStats,
};
