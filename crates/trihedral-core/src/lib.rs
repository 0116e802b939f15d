//! Core types and utilities for trihedral calibration rigs.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about meshes, materials or file formats; it owns:
//! - axis-aligned geometry primitives (`BoxVolume`, `Aabb`, `AxisDirection`),
//! - the immutable rig configuration (`PatternConfig`, `PanelDimensions`),
//! - the dimension resolver that merges an override document into defaults.

mod config;
mod geometry;
mod logger;
mod resolve;

pub use config::{
    ConfigError, DimensionParams, PanelDimensions, ParamKey, ParamValue, PatternConfig, RigConfig,
    PANEL_SIZE_TOLERANCE_MM,
};
pub use geometry::{Aabb, Axis, AxisDirection, BoxVolume, CornerLabel, FaceCorners, Sign};
pub use resolve::{
    merge_overrides, parse_override_line, resolve_file, resolve_str, ConfigWarning,
    OverrideEntry, Resolution, DEFAULT_DIMENSIONS_FILE,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, LOG_ENV};

/// Millimetres per metre; panels are modelled in mm and exported in metres.
pub const MM_PER_M: f64 = 1000.0;
