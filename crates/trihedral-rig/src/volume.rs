//! Box volumes and subtractive booleans.
//!
//! The boolean itself is an injected capability (`VolumeSubtractor`) so a
//! full polygon-mesh engine can be plugged in. `AxisAlignedDifference` is the
//! analytic implementation: the difference of two axis-aligned boxes is a
//! union of at most six disjoint axis-aligned cells.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use trihedral_core::{Aabb, BoxVolume};

/// Cells thinner than this (mm) are dropped from differences.
const MIN_CELL_EXTENT_MM: f64 = 1e-9;

#[derive(thiserror::Error, Debug)]
pub enum VolumeError {
    #[error("box extents must be positive and finite (got {x}, {y}, {z})")]
    InvalidSize { x: f64, y: f64, z: f64 },
    #[error("box corner must be finite")]
    InvalidCorner,
}

/// Build a box from its minimum corner and strictly positive extents.
pub fn build_box(corner: Point3<f64>, size: Vector3<f64>) -> Result<BoxVolume, VolumeError> {
    if !corner.iter().all(|v| v.is_finite()) {
        return Err(VolumeError::InvalidCorner);
    }
    if !size.iter().all(|v| v.is_finite() && *v > 0.0) {
        return Err(VolumeError::InvalidSize {
            x: size.x,
            y: size.y,
            z: size.z,
        });
    }
    Ok(BoxVolume::new(corner, size))
}

/// Overlapping region of two boxes, `None` when disjoint.
pub fn intersection(a: &BoxVolume, b: &BoxVolume) -> Option<BoxVolume> {
    a.aabb().intersection(&b.aabb()).map(|bb| bb.to_box())
}

/// A solid represented as a union of disjoint axis-aligned cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub cells: Vec<BoxVolume>,
}

impl Solid {
    pub fn from_box(b: BoxVolume) -> Self {
        Self { cells: vec![b] }
    }

    pub fn volume(&self) -> f64 {
        self.cells.iter().map(BoxVolume::volume).sum()
    }

    /// Tight bounds over all cells, `None` for an empty solid.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.cells.iter().flat_map(|c| [c.min(), c.max()]))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Subtract `tool` from every cell.
    pub fn subtract(&self, tool: &BoxVolume, engine: &dyn VolumeSubtractor) -> Solid {
        let cells = self
            .cells
            .iter()
            .flat_map(|c| engine.subtract(c, tool).cells)
            .collect();
        Solid { cells }
    }
}

impl From<BoxVolume> for Solid {
    fn from(b: BoxVolume) -> Self {
        Solid::from_box(b)
    }
}

/// Boolean difference `a - b`.
pub trait VolumeSubtractor {
    fn subtract(&self, a: &BoxVolume, b: &BoxVolume) -> Solid;
}

/// Exact axis-aligned box difference.
#[derive(Clone, Copy, Debug, Default)]
pub struct AxisAlignedDifference;

impl VolumeSubtractor for AxisAlignedDifference {
    fn subtract(&self, a: &BoxVolume, b: &BoxVolume) -> Solid {
        let Some(cut) = a.aabb().intersection(&b.aabb()) else {
            return Solid::from_box(*a);
        };

        let outer = a.aabb();
        let mut cells = Vec::with_capacity(6);
        let mut push = |min: Point3<f64>, max: Point3<f64>| {
            let bb = Aabb::new(min, max);
            if bb.extent().iter().all(|e| *e > MIN_CELL_EXTENT_MM) {
                cells.push(bb.to_box());
            }
        };

        // slabs below / above the cut along X span the full Y and Z range
        push(
            outer.min,
            Point3::new(cut.min.x, outer.max.y, outer.max.z),
        );
        push(
            Point3::new(cut.max.x, outer.min.y, outer.min.z),
            outer.max,
        );
        // inside the cut's X range: slabs along Y
        push(
            Point3::new(cut.min.x, outer.min.y, outer.min.z),
            Point3::new(cut.max.x, cut.min.y, outer.max.z),
        );
        push(
            Point3::new(cut.min.x, cut.max.y, outer.min.z),
            Point3::new(cut.max.x, outer.max.y, outer.max.z),
        );
        // inside the cut's X and Y range: slabs along Z
        push(
            Point3::new(cut.min.x, cut.min.y, outer.min.z),
            Point3::new(cut.max.x, cut.max.y, cut.min.z),
        );
        push(
            Point3::new(cut.min.x, cut.min.y, cut.max.z),
            Point3::new(cut.max.x, cut.max.y, outer.max.z),
        );

        Solid { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn b(c: [f64; 3], s: [f64; 3]) -> BoxVolume {
        build_box(Point3::from(c), Vector3::from(s)).expect("box")
    }

    #[test]
    fn build_rejects_degenerate_sizes() {
        assert!(build_box(Point3::origin(), Vector3::new(1.0, 0.0, 1.0)).is_err());
        assert!(build_box(Point3::origin(), Vector3::new(1.0, -2.0, 1.0)).is_err());
        assert!(build_box(Point3::new(f64::NAN, 0.0, 0.0), Vector3::repeat(1.0)).is_err());
        let ok = b([1.0, 1.0, 1.0], [2.0, 4.0, 6.0]);
        assert_eq!(ok.center(), Point3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn disjoint_subtraction_is_identity() {
        let a = b([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let far = b([5.0, 5.0, 5.0], [1.0, 1.0, 1.0]);
        let out = AxisAlignedDifference.subtract(&a, &far);
        assert_eq!(out, Solid::from_box(a));
    }

    #[test]
    fn penetrating_notch_removes_exactly_the_intersection() {
        // floor-like slab with a front-edge notch through the full thickness
        let a = b([0.0, 0.0, 0.0], [108.1, 94.1, 0.8]);
        let notch = b([44.0, -10.0, -0.8], [20.0, 20.0, 2.4]);
        let out = AxisAlignedDifference.subtract(&a, &notch);
        let inter = intersection(&a, &notch).expect("overlap");

        assert_relative_eq!(inter.volume(), 20.0 * 10.0 * 0.8, epsilon = 1e-9);
        assert_relative_eq!(out.volume(), a.volume() - inter.volume(), epsilon = 1e-9);
        // left, right and back slabs; nothing above/below since Z is pierced
        assert_eq!(out.cells.len(), 3);
        assert_eq!(out.bounds().expect("bounds"), a.aabb());
    }

    #[test]
    fn interior_pocket_splits_into_six_cells() {
        let a = b([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]);
        let core = b([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        let out = AxisAlignedDifference.subtract(&a, &core);
        assert_eq!(out.cells.len(), 6);
        assert_relative_eq!(out.volume(), 26.0, epsilon = 1e-12);

        // cells are pairwise disjoint
        for (i, ci) in out.cells.iter().enumerate() {
            for cj in out.cells.iter().skip(i + 1) {
                assert!(intersection(ci, cj).is_none());
            }
        }
    }

    #[test]
    fn solid_subtract_applies_to_every_cell() {
        let solid = Solid {
            cells: vec![
                b([0.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
                b([2.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
            ],
        };
        let tool = b([1.0, -1.0, -1.0], [2.0, 3.0, 3.0]);
        let out = solid.subtract(&tool, &AxisAlignedDifference);
        assert_relative_eq!(out.volume(), 2.0, epsilon = 1e-12);
    }
}
