//! Rig configuration: checker pattern, panel dimensions and their validation.
//!
//! `DimensionParams` is the flat, loosely-typed parameter table the resolver
//! merges overrides into. `RigConfig` is the validated, immutable result that
//! every downstream stage receives by reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Allowed deviation between supplied and derived panel size (mm).
pub const PANEL_SIZE_TOLERANCE_MM: f64 = 0.1;

/// Keys accepted by the override document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Cols,
    Rows,
    SquareSizeMm,
    MarginMm,
    MarkerSizeMm,
    FaceEpsMm,
    CutoutWidthMm,
    CutoutDepthMm,
    PanelOverlapMm,
    PanelWMm,
    PanelHMm,
    PanelThickMm,
}

impl ParamKey {
    pub const ALL: [ParamKey; 12] = [
        ParamKey::Cols,
        ParamKey::Rows,
        ParamKey::SquareSizeMm,
        ParamKey::MarginMm,
        ParamKey::MarkerSizeMm,
        ParamKey::FaceEpsMm,
        ParamKey::CutoutWidthMm,
        ParamKey::CutoutDepthMm,
        ParamKey::PanelOverlapMm,
        ParamKey::PanelWMm,
        ParamKey::PanelHMm,
        ParamKey::PanelThickMm,
    ];

    /// Canonical upper-case key, matching the config field name.
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Cols => "COLS",
            ParamKey::Rows => "ROWS",
            ParamKey::SquareSizeMm => "SQUARE_SIZE_MM",
            ParamKey::MarginMm => "MARGIN_MM",
            ParamKey::MarkerSizeMm => "MARKER_SIZE_MM",
            ParamKey::FaceEpsMm => "FACE_EPS_MM",
            ParamKey::CutoutWidthMm => "CUTOUT_WIDTH_MM",
            ParamKey::CutoutDepthMm => "CUTOUT_DEPTH_MM",
            ParamKey::PanelOverlapMm => "PANEL_OVERLAP_MM",
            ParamKey::PanelWMm => "PANEL_W_MM",
            ParamKey::PanelHMm => "PANEL_H_MM",
            ParamKey::PanelThickMm => "PANEL_THICK_MM",
        }
    }

    /// Look up a key by name; `name` must already be upper-cased.
    ///
    /// The short names of the first-generation `dimensionsdoc` files
    /// (`CHECKER_COLS`, `SQUARE_SIZE`, `EPS`, ...) are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "COLS" | "CHECKER_COLS" => ParamKey::Cols,
            "ROWS" | "CHECKER_ROWS" => ParamKey::Rows,
            "SQUARE_SIZE_MM" | "SQUARE_SIZE" => ParamKey::SquareSizeMm,
            "MARGIN_MM" | "MARGIN" => ParamKey::MarginMm,
            "MARKER_SIZE_MM" | "MARKER_SIZE" => ParamKey::MarkerSizeMm,
            "FACE_EPS_MM" | "EPS" => ParamKey::FaceEpsMm,
            "CUTOUT_WIDTH_MM" | "CUTOUT_WIDTH" => ParamKey::CutoutWidthMm,
            "CUTOUT_DEPTH_MM" | "CUTOUT_DEPTH" => ParamKey::CutoutDepthMm,
            "PANEL_OVERLAP_MM" | "OVERLAP" => ParamKey::PanelOverlapMm,
            "PANEL_W_MM" | "PANEL_W" => ParamKey::PanelWMm,
            "PANEL_H_MM" | "PANEL_H" => ParamKey::PanelHMm,
            "PANEL_THICK_MM" | "PANEL_THICK" => ParamKey::PanelThickMm,
            _ => return None,
        };
        Some(key)
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, ParamKey::Cols | ParamKey::Rows)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced override value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Coerce a raw string for `key`: truncating float-to-int for integer keys.
    pub fn parse_for(key: ParamKey, raw: &str) -> Option<Self> {
        let v: f64 = raw.trim().parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        if key.is_integer() {
            let t = v.trunc();
            if t < i64::MIN as f64 || t > i64::MAX as f64 {
                return None;
            }
            Some(ParamValue::Int(t as i64))
        } else {
            Some(ParamValue::Float(v))
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Flat parameter table before validation.
///
/// `panel_w_mm` / `panel_h_mm` values `<= 0` mean "derive from the checker".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionParams {
    pub cols: i64,
    pub rows: i64,
    pub square_size_mm: f64,
    pub margin_mm: f64,
    pub marker_size_mm: f64,
    pub face_eps_mm: f64,
    pub cutout_width_mm: f64,
    pub cutout_depth_mm: f64,
    pub panel_overlap_mm: f64,
    pub panel_w_mm: f64,
    pub panel_h_mm: f64,
    pub panel_thick_mm: f64,
}

impl Default for DimensionParams {
    /// The 6x5 design-B rig: 14 mm squares, 12 mm margins, 0.8 mm laminate.
    fn default() -> Self {
        Self {
            cols: 6,
            rows: 5,
            square_size_mm: 14.0,
            margin_mm: 12.0,
            marker_size_mm: 10.5,
            face_eps_mm: 0.05,
            cutout_width_mm: 20.0,
            cutout_depth_mm: 10.0,
            panel_overlap_mm: 0.1,
            panel_w_mm: 108.0,
            panel_h_mm: 94.0,
            panel_thick_mm: 0.8,
        }
    }
}

impl DimensionParams {
    pub fn get(&self, key: ParamKey) -> ParamValue {
        match key {
            ParamKey::Cols => ParamValue::Int(self.cols),
            ParamKey::Rows => ParamValue::Int(self.rows),
            ParamKey::SquareSizeMm => ParamValue::Float(self.square_size_mm),
            ParamKey::MarginMm => ParamValue::Float(self.margin_mm),
            ParamKey::MarkerSizeMm => ParamValue::Float(self.marker_size_mm),
            ParamKey::FaceEpsMm => ParamValue::Float(self.face_eps_mm),
            ParamKey::CutoutWidthMm => ParamValue::Float(self.cutout_width_mm),
            ParamKey::CutoutDepthMm => ParamValue::Float(self.cutout_depth_mm),
            ParamKey::PanelOverlapMm => ParamValue::Float(self.panel_overlap_mm),
            ParamKey::PanelWMm => ParamValue::Float(self.panel_w_mm),
            ParamKey::PanelHMm => ParamValue::Float(self.panel_h_mm),
            ParamKey::PanelThickMm => ParamValue::Float(self.panel_thick_mm),
        }
    }

    /// Store a value; integer keys truncate floats and float keys widen ints.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        let as_f64 = match value {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        };
        let as_i64 = match value {
            ParamValue::Int(v) => v,
            ParamValue::Float(v) => v.trunc() as i64,
        };
        match key {
            ParamKey::Cols => self.cols = as_i64,
            ParamKey::Rows => self.rows = as_i64,
            ParamKey::SquareSizeMm => self.square_size_mm = as_f64,
            ParamKey::MarginMm => self.margin_mm = as_f64,
            ParamKey::MarkerSizeMm => self.marker_size_mm = as_f64,
            ParamKey::FaceEpsMm => self.face_eps_mm = as_f64,
            ParamKey::CutoutWidthMm => self.cutout_width_mm = as_f64,
            ParamKey::CutoutDepthMm => self.cutout_depth_mm = as_f64,
            ParamKey::PanelOverlapMm => self.panel_overlap_mm = as_f64,
            ParamKey::PanelWMm => self.panel_w_mm = as_f64,
            ParamKey::PanelHMm => self.panel_h_mm = as_f64,
            ParamKey::PanelThickMm => self.panel_thick_mm = as_f64,
        }
    }

    #[inline]
    pub fn active_w_mm(&self) -> f64 {
        self.cols as f64 * self.square_size_mm
    }

    #[inline]
    pub fn active_h_mm(&self) -> f64 {
        self.rows as f64 * self.square_size_mm
    }

    /// Panel width implied by the checker area plus both margins.
    #[inline]
    pub fn expected_panel_w_mm(&self) -> f64 {
        self.active_w_mm() + 2.0 * self.margin_mm
    }

    #[inline]
    pub fn expected_panel_h_mm(&self) -> f64 {
        self.active_h_mm() + 2.0 * self.margin_mm
    }

    /// Validate and split into the immutable rig configuration.
    pub fn validate(&self) -> Result<RigConfig, ConfigError> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(ConfigError::InvalidGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        let cols = u32::try_from(self.cols).map_err(|_| ConfigError::InvalidGrid {
            cols: self.cols,
            rows: self.rows,
        })?;
        let rows = u32::try_from(self.rows).map_err(|_| ConfigError::InvalidGrid {
            cols: self.cols,
            rows: self.rows,
        })?;

        for key in ParamKey::ALL.into_iter().filter(|k| !k.is_integer()) {
            if let ParamValue::Float(v) = self.get(key) {
                if !v.is_finite() || v <= 0.0 {
                    return Err(ConfigError::NonPositiveLength { key, value: v });
                }
            }
        }

        let pattern = PatternConfig {
            cols,
            rows,
            square_size_mm: self.square_size_mm,
            margin_mm: self.margin_mm,
            marker_size_mm: self.marker_size_mm,
            face_eps_mm: self.face_eps_mm,
            cutout_width_mm: self.cutout_width_mm,
            cutout_depth_mm: self.cutout_depth_mm,
            panel_overlap_mm: self.panel_overlap_mm,
        };
        let panel = PanelDimensions {
            panel_w_mm: self.panel_w_mm,
            panel_h_mm: self.panel_h_mm,
            panel_thick_mm: self.panel_thick_mm,
        };

        // Corner markers must not cross each other on the smallest face.
        let span = 2.0 * pattern.marker_inset_mm();
        let smallest_face = panel.panel_w_mm.min(panel.panel_h_mm);
        if span > smallest_face {
            return Err(ConfigError::MarkerDoesNotFit {
                span_mm: span,
                face_mm: smallest_face,
            });
        }
        if pattern.cutout_width_mm >= panel.panel_w_mm {
            return Err(ConfigError::CutoutTooWide {
                cutout_mm: pattern.cutout_width_mm,
                panel_w_mm: panel.panel_w_mm,
            });
        }

        Ok(RigConfig { pattern, panel })
    }
}

/// Checkerboard and marker parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Checker squares along the panel width.
    pub cols: u32,
    /// Checker squares along the panel height.
    pub rows: u32,
    pub square_size_mm: f64,
    /// Blank border between the panel edge and the checker area.
    pub margin_mm: f64,
    pub marker_size_mm: f64,
    /// Lift of marker quads above the inside face, against z-fighting.
    pub face_eps_mm: f64,
    pub cutout_width_mm: f64,
    pub cutout_depth_mm: f64,
    /// Extra outer extent added to panels so shared seams overlap.
    pub panel_overlap_mm: f64,
}

impl PatternConfig {
    #[inline]
    pub fn active_w_mm(&self) -> f64 {
        self.cols as f64 * self.square_size_mm
    }

    #[inline]
    pub fn active_h_mm(&self) -> f64 {
        self.rows as f64 * self.square_size_mm
    }

    /// Distance from a face edge to the center of a corner marker.
    #[inline]
    pub fn marker_inset_mm(&self) -> f64 {
        self.margin_mm + self.marker_size_mm / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelDimensions {
    pub panel_w_mm: f64,
    pub panel_h_mm: f64,
    pub panel_thick_mm: f64,
}

/// Validated, immutable rig configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    pub pattern: PatternConfig,
    pub panel: PanelDimensions,
}

impl RigConfig {
    /// Flatten back into the resolver's parameter table.
    pub fn to_params(&self) -> DimensionParams {
        let p = &self.pattern;
        DimensionParams {
            cols: i64::from(p.cols),
            rows: i64::from(p.rows),
            square_size_mm: p.square_size_mm,
            margin_mm: p.margin_mm,
            marker_size_mm: p.marker_size_mm,
            face_eps_mm: p.face_eps_mm,
            cutout_width_mm: p.cutout_width_mm,
            cutout_depth_mm: p.cutout_depth_mm,
            panel_overlap_mm: p.panel_overlap_mm,
            panel_w_mm: self.panel.panel_w_mm,
            panel_h_mm: self.panel.panel_h_mm,
            panel_thick_mm: self.panel.panel_thick_mm,
        }
    }

    /// Render as an override document that resolves back to `self`.
    pub fn to_override_doc(&self) -> String {
        let params = self.to_params();
        let mut out = String::from("# trihedral rig dimensions (mm)\n");
        for key in ParamKey::ALL {
            out.push_str(&format!("{} = {}\n", key.name(), params.get(key)));
        }
        out
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        let d = DimensionParams::default();
        RigConfig {
            pattern: PatternConfig {
                cols: 6,
                rows: 5,
                square_size_mm: d.square_size_mm,
                margin_mm: d.margin_mm,
                marker_size_mm: d.marker_size_mm,
                face_eps_mm: d.face_eps_mm,
                cutout_width_mm: d.cutout_width_mm,
                cutout_depth_mm: d.cutout_depth_mm,
                panel_overlap_mm: d.panel_overlap_mm,
            },
            panel: PanelDimensions {
                panel_w_mm: d.panel_w_mm,
                panel_h_mm: d.panel_h_mm,
                panel_thick_mm: d.panel_thick_mm,
            },
        }
    }
}

/// Configuration errors; every variant aborts before geometry is built.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("checker grid must have positive cols and rows (got cols={cols}, rows={rows})")]
    InvalidGrid { cols: i64, rows: i64 },
    #[error("{key} must be a positive finite length (got {value})")]
    NonPositiveLength { key: ParamKey, value: f64 },
    #[error("corner markers span {span_mm:.2} mm but the smallest face is {face_mm:.2} mm")]
    MarkerDoesNotFit { span_mm: f64, face_mm: f64 },
    #[error("cutout width {cutout_mm:.2} mm does not fit a {panel_w_mm:.2} mm floor")]
    CutoutTooWide { cutout_mm: f64, panel_w_mm: f64 },
    #[error("failed to read dimensions file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
