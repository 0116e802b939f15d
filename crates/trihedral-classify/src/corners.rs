use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use trihedral_core::{Aabb, Axis, AxisDirection, FaceCorners, Sign};

/// Which of the two faces perpendicular to the normal axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceSide {
    Min,
    Max,
}

impl FaceSide {
    /// Outward normal of this face of a box.
    pub fn outward(self, axis: Axis) -> AxisDirection {
        match self {
            FaceSide::Min => AxisDirection::new(axis, Sign::Neg),
            FaceSide::Max => AxisDirection::new(axis, Sign::Pos),
        }
    }
}

/// Labelled corners of the `side` face of `aabb` perpendicular to `axis`.
///
/// Left/right run along the first remaining axis and bottom/top along the
/// second (`X`: Y then Z, `Y`: X then Z, `Z`: X then Y).
pub fn face_corners(aabb: &Aabb, axis: Axis, side: FaceSide) -> FaceCorners {
    let [a, b] = axis.others();
    let level = match side {
        FaceSide::Min => aabb.min[axis.index()],
        FaceSide::Max => aabb.max[axis.index()],
    };
    let at = |ua: f64, vb: f64| {
        let mut p = Point3::origin();
        p[axis.index()] = level;
        p[a.index()] = ua;
        p[b.index()] = vb;
        p
    };
    let (a0, a1) = (aabb.min[a.index()], aabb.max[a.index()]);
    let (b0, b1) = (aabb.min[b.index()], aabb.max[b.index()]);
    FaceCorners {
        bl: at(a0, b0),
        br: at(a1, b0),
        tl: at(a0, b1),
        tr: at(a1, b1),
    }
}
