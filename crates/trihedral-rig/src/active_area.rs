//! Mapping of the checker pattern into the active area of a panel face.
//!
//! Face UVs run `0..1` over the whole inside face. The checker only covers
//! the area inside the margins: a mask selects between the checker layer
//! (sampled through an affine remap) and a flat margin layer.

use crate::panel::PanelSpec;
use serde::{Deserialize, Serialize};
use trihedral_core::PatternConfig;

/// Linear RGBA in `0..1`.
pub type Rgba = [f32; 4];

pub const MARGIN_COLOR: Rgba = [0.95, 0.95, 0.95, 1.0];
pub const CHECKER_DARK: Rgba = [0.0, 0.0, 0.0, 1.0];
pub const CHECKER_LIGHT: Rgba = [1.0, 1.0, 1.0, 1.0];
pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Pixels per checker square in generated rasters.
pub const DEFAULT_PX_PER_SQUARE: u32 = 256;

/// Affine remap and margin bounds of one face, in normalized texture space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveAreaMapping {
    pub scale_u: f64,
    pub scale_v: f64,
    pub offset_u: f64,
    pub offset_v: f64,
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl ActiveAreaMapping {
    pub fn new(panel_w: f64, panel_h: f64, active_w: f64, active_h: f64, margin: f64) -> Self {
        let u_min = margin / panel_w;
        let v_min = margin / panel_h;
        Self {
            scale_u: panel_w / active_w,
            scale_v: panel_h / active_h,
            offset_u: -margin / active_w,
            offset_v: -margin / active_h,
            u_min,
            u_max: 1.0 - u_min,
            v_min,
            v_max: 1.0 - v_min,
        }
    }

    /// Mapping of the full checker onto a `face_w x face_h` face.
    pub fn for_face(pattern: &PatternConfig, face_w: f64, face_h: f64) -> Self {
        Self::new(
            face_w,
            face_h,
            pattern.active_w_mm(),
            pattern.active_h_mm(),
            pattern.margin_mm,
        )
    }

    pub fn for_panel(pattern: &PatternConfig, panel: &PanelSpec) -> Self {
        Self::for_face(pattern, panel.face_width_mm, panel.face_height_mm)
    }

    /// Strictly inside the margins.
    #[inline]
    pub fn in_active_area(&self, u: f64, v: f64) -> bool {
        u > self.u_min && u < self.u_max && v > self.v_min && v < self.v_max
    }

    /// Face UV to checker texture coordinates.
    #[inline]
    pub fn remap(&self, u: f64, v: f64) -> (f64, f64) {
        (
            u * self.scale_u + self.offset_u,
            v * self.scale_v + self.offset_v,
        )
    }
}

/// A color source addressed in its own normalized coordinates.
pub trait ColorLayer {
    fn sample(&self, u: f64, v: f64) -> Rgba;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidColor(pub Rgba);

impl Default for SolidColor {
    fn default() -> Self {
        SolidColor(MARGIN_COLOR)
    }
}

impl ColorLayer for SolidColor {
    fn sample(&self, _u: f64, _v: f64) -> Rgba {
        self.0
    }
}

/// Crisp black/white checker with a fixed pixel count per square.
///
/// Row 0 is the bottom row; the square at `(row, col)` is dark when
/// `row + col` is even, so the bottom-left square is always dark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerRaster {
    pub cols: u32,
    pub rows: u32,
    pub px_per_square: u32,
}

impl CheckerRaster {
    pub fn new(cols: u32, rows: u32, px_per_square: u32) -> Self {
        Self {
            cols,
            rows,
            px_per_square,
        }
    }

    pub fn for_pattern(pattern: &PatternConfig) -> Self {
        Self::new(pattern.cols, pattern.rows, DEFAULT_PX_PER_SQUARE)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.cols * self.px_per_square
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rows * self.px_per_square
    }

    #[inline]
    pub fn is_dark(&self, row: u32, col: u32) -> bool {
        (row + col) % 2 == 0
    }

    /// Color of pixel `(x, y)` with `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let px = self.px_per_square.max(1);
        if self.is_dark(y / px, x / px) {
            CHECKER_DARK
        } else {
            CHECKER_LIGHT
        }
    }

    /// RGBA8 rows, top row first, as image encoders expect.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let (w, h) = (self.width(), self.height());
        let mut out = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for y in (0..h).rev() {
            for x in 0..w {
                out.extend(self.pixel(x, y).map(to_u8));
            }
        }
        out
    }
}

impl ColorLayer for CheckerRaster {
    /// Nearest sampling with clip extension: outside `[0, 1)` is transparent.
    fn sample(&self, u: f64, v: f64) -> Rgba {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return TRANSPARENT;
        }
        let x = ((u * self.width() as f64) as u32).min(self.width().saturating_sub(1));
        let y = ((v * self.height() as f64) as u32).min(self.height().saturating_sub(1));
        self.pixel(x, y)
    }
}

/// Mask-driven mix of an active layer and a margin layer.
#[derive(Clone, Debug)]
pub struct ActiveAreaShader<A, M> {
    pub mapping: ActiveAreaMapping,
    pub active: A,
    pub margin: M,
}

impl<A: ColorLayer, M: ColorLayer> ActiveAreaShader<A, M> {
    pub fn new(mapping: ActiveAreaMapping, active: A, margin: M) -> Self {
        Self {
            mapping,
            active,
            margin,
        }
    }

    /// Color of face UV `(u, v)`.
    pub fn shade(&self, u: f64, v: f64) -> Rgba {
        let fac = if self.mapping.in_active_area(u, v) {
            1.0
        } else {
            0.0
        };
        let (tu, tv) = self.mapping.remap(u, v);
        mix(self.margin.sample(u, v), self.active.sample(tu, tv), fac)
    }
}

impl ActiveAreaShader<CheckerRaster, SolidColor> {
    /// Default checker-in-margin appearance of a panel face.
    pub fn checker(pattern: &PatternConfig, panel: &PanelSpec) -> Self {
        Self::new(
            ActiveAreaMapping::for_panel(pattern, panel),
            CheckerRaster::for_pattern(pattern),
            SolidColor::default(),
        )
    }
}

/// Linear blend `a * (1 - fac) + b * fac`.
pub fn mix(a: Rgba, b: Rgba, fac: f32) -> Rgba {
    let mut out = a;
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x * (1.0 - fac) + y * fac;
    }
    out
}

#[inline]
pub fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
