//! Axis-aligned geometry primitives shared by the assembler and the classifier.
//!
//! All coordinates are millimetres in a right-handed, Z-up frame whose origin
//! is the shared corner of the three panels.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axes in tie-breaking priority order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn unit(self) -> Vector3<f64> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// The two remaining axes, in ascending order.
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Pos,
    Neg,
}

impl Sign {
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Sign::Pos => 1.0,
            Sign::Neg => -1.0,
        }
    }
}

/// A signed axis, i.e. one of the six axis-aligned unit directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisDirection {
    pub axis: Axis,
    pub sign: Sign,
}

impl AxisDirection {
    pub const PLUS_X: AxisDirection = AxisDirection::new(Axis::X, Sign::Pos);
    pub const MINUS_X: AxisDirection = AxisDirection::new(Axis::X, Sign::Neg);
    pub const PLUS_Y: AxisDirection = AxisDirection::new(Axis::Y, Sign::Pos);
    pub const MINUS_Y: AxisDirection = AxisDirection::new(Axis::Y, Sign::Neg);
    pub const PLUS_Z: AxisDirection = AxisDirection::new(Axis::Z, Sign::Pos);
    pub const MINUS_Z: AxisDirection = AxisDirection::new(Axis::Z, Sign::Neg);

    pub const ALL: [AxisDirection; 6] = [
        AxisDirection::PLUS_X,
        AxisDirection::MINUS_X,
        AxisDirection::PLUS_Y,
        AxisDirection::MINUS_Y,
        AxisDirection::PLUS_Z,
        AxisDirection::MINUS_Z,
    ];

    pub const fn new(axis: Axis, sign: Sign) -> Self {
        Self { axis, sign }
    }

    #[inline]
    pub fn to_vector(self) -> Vector3<f64> {
        self.axis.unit() * self.sign.factor()
    }

    pub fn flipped(self) -> Self {
        let sign = match self.sign {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        };
        Self::new(self.axis, sign)
    }
}

impl fmt::Display for AxisDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self.sign {
            Sign::Pos => "+",
            Sign::Neg => "-",
        };
        write!(f, "{s}{}", self.axis)
    }
}

/// Solid box given by its minimum corner and positive extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxVolume {
    pub corner: Point3<f64>,
    pub size: Vector3<f64>,
}

impl BoxVolume {
    /// Unchecked constructor; use `trihedral_rig::build_box` for validation.
    pub fn new(corner: Point3<f64>, size: Vector3<f64>) -> Self {
        Self { corner, size }
    }

    #[inline]
    pub fn min(&self) -> Point3<f64> {
        self.corner
    }

    #[inline]
    pub fn max(&self) -> Point3<f64> {
        self.corner + self.size
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        self.corner + self.size * 0.5
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.size.x * self.size.y * self.size.z
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min(), self.max())
    }
}

/// Axis-aligned bounding box given by its min/max corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Tight bounds of a point cloud, `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut min = first;
        let mut max = first;
        for p in it {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        Some(Self { min, max })
    }

    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.extent().max()
    }

    /// Axis of the smallest extent; ties resolve in `Axis::ALL` order.
    pub fn smallest_axis(&self) -> Axis {
        let e = self.extent();
        let mut best = Axis::X;
        for axis in Axis::ALL {
            if e[axis.index()] < e[best.index()] {
                best = axis;
            }
        }
        best
    }

    /// Overlap of two boxes, `None` when they do not share positive volume.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let mut min = self.min;
        let mut max = self.max;
        for k in 0..3 {
            min[k] = self.min[k].max(other.min[k]);
            max[k] = self.max[k].min(other.max[k]);
            if max[k] <= min[k] {
                return None;
            }
        }
        Some(Aabb { min, max })
    }

    pub fn to_box(&self) -> BoxVolume {
        BoxVolume::new(self.min, self.extent())
    }
}

/// Corner label of a rectangular panel face, seen from the inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CornerLabel {
    BL,
    BR,
    TL,
    TR,
}

impl CornerLabel {
    pub const ALL: [CornerLabel; 4] = [
        CornerLabel::BL,
        CornerLabel::BR,
        CornerLabel::TL,
        CornerLabel::TR,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CornerLabel::BL => "BL",
            CornerLabel::BR => "BR",
            CornerLabel::TL => "TL",
            CornerLabel::TR => "TR",
        }
    }

    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, CornerLabel::BR | CornerLabel::TR)
    }

    #[inline]
    pub fn is_top(self) -> bool {
        matches!(self, CornerLabel::TL | CornerLabel::TR)
    }
}

impl fmt::Display for CornerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CornerLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BL" => Ok(CornerLabel::BL),
            "BR" => Ok(CornerLabel::BR),
            "TL" => Ok(CornerLabel::TL),
            "TR" => Ok(CornerLabel::TR),
            other => Err(format!("unknown corner label: {other}")),
        }
    }
}

/// The four labelled corners of one panel face, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceCorners {
    pub bl: Point3<f64>,
    pub br: Point3<f64>,
    pub tl: Point3<f64>,
    pub tr: Point3<f64>,
}

impl FaceCorners {
    pub fn get(&self, label: CornerLabel) -> Point3<f64> {
        match label {
            CornerLabel::BL => self.bl,
            CornerLabel::BR => self.br,
            CornerLabel::TL => self.tl,
            CornerLabel::TR => self.tr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_center_is_corner_plus_half_size() {
        let b = BoxVolume::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 6.0, 8.0));
        assert_eq!(b.center(), Point3::new(3.0, 5.0, 7.0));
        assert_relative_eq!(b.volume(), 192.0);
        assert_eq!(b.aabb().to_box(), b);
    }

    #[test]
    fn smallest_axis_breaks_ties_in_xyz_order() {
        let flat_z = Aabb::new(Point3::origin(), Point3::new(10.0, 10.0, 1.0));
        assert_eq!(flat_z.smallest_axis(), Axis::Z);

        let cube = Aabb::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        assert_eq!(cube.smallest_axis(), Axis::X);

        let tie_yz = Aabb::new(Point3::origin(), Point3::new(5.0, 1.0, 1.0));
        assert_eq!(tie_yz.smallest_axis(), Axis::Y);
    }

    #[test]
    fn intersection_requires_positive_overlap() {
        let a = Aabb::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        let touching = Aabb::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        assert!(a.intersection(&touching).is_none());

        let inner = Aabb::new(Point3::new(1.0, 1.0, -1.0), Point3::new(3.0, 3.0, 1.0));
        let i = a.intersection(&inner).expect("overlap");
        assert_eq!(i.min, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(i.max, Point3::new(2.0, 2.0, 1.0));
    }

    #[test]
    fn from_points_tracks_min_and_max() {
        let pts = [
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let bb = Aabb::from_points(pts).expect("bounds");
        assert_eq!(bb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bb.max, Point3::new(1.0, 4.0, 3.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn corner_labels_parse_case_insensitively() {
        assert_eq!("tr".parse::<CornerLabel>(), Ok(CornerLabel::TR));
        assert!("XX".parse::<CornerLabel>().is_err());
        assert!(CornerLabel::TR.is_top() && CornerLabel::TR.is_right());
    }

    #[test]
    fn axis_directions_are_unit_vectors() {
        for dir in AxisDirection::ALL {
            assert_relative_eq!(dir.to_vector().norm(), 1.0);
            assert_eq!(dir.flipped().to_vector(), -dir.to_vector());
        }
        assert_eq!(AxisDirection::MINUS_Y.to_string(), "-Y");
    }
}
