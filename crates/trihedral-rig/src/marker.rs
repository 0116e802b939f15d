//! Marker poses on panel faces.
//!
//! A marker is a flat square quad carrying an ArUco image. Its pose is
//! derived from the owning panel and a corner label on demand and is
//! never stored.

use crate::panel::{PanelRole, PanelSpec};
use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use trihedral_core::{CornerLabel, PatternConfig};

/// Cosine above which a normal counts as already facing canonical up.
pub const ALIGNED_COS: f64 = 0.99;

/// Identifier of one of the rig's eight markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MarkerId(u8);

impl MarkerId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(id: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&id).then_some(Self(id))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = MarkerId> {
        (Self::MIN..=Self::MAX).map(MarkerId)
    }
}

impl TryFrom<u8> for MarkerId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MarkerId::new(value).ok_or_else(|| {
            format!(
                "marker id {value} outside {}..={}",
                MarkerId::MIN,
                MarkerId::MAX
            )
        })
    }
}

impl From<MarkerId> for u8 {
    fn from(id: MarkerId) -> Self {
        id.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Center of a corner marker in face-local millimetres.
///
/// Measured from the face's own origin corner: `inset = margin + size / 2`
/// from both adjacent edges.
pub fn corner_center(
    face_w: f64,
    face_h: f64,
    label: CornerLabel,
    margin: f64,
    size: f64,
) -> Point2<f64> {
    let inset = margin + size / 2.0;
    let u = if label.is_right() { face_w - inset } else { inset };
    let v = if label.is_top() { face_h - inset } else { inset };
    Point2::new(u, v)
}

/// Rotation taking canonical up (`+Z`) onto `normal`.
///
/// Near-up normals give the identity; an exactly opposite normal flips
/// by pi about X.
pub fn orientation_for_normal(normal: &Vector3<f64>) -> UnitQuaternion<f64> {
    let up = Vector3::z();
    let n = normal.normalize();
    let cos = n.dot(&up);
    if cos > ALIGNED_COS {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(&up, &n).unwrap_or_else(|| {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    })
}

/// World pose of a marker quad.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub normal: Unit<Vector3<f64>>,
}

impl MarkerPose {
    /// Map a point of the marker's local XY plane to world space.
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.orientation * local.coords
    }
}

/// Computes marker poses for one checker pattern.
#[derive(Clone, Copy, Debug)]
pub struct MarkerPlacer {
    margin_mm: f64,
    face_eps_mm: f64,
}

impl MarkerPlacer {
    pub fn new(pattern: &PatternConfig) -> Self {
        Self {
            margin_mm: pattern.margin_mm,
            face_eps_mm: pattern.face_eps_mm,
        }
    }

    #[inline]
    pub fn face_eps_mm(&self) -> f64 {
        self.face_eps_mm
    }

    /// Pose of a `size`-mm marker at `label` of `panel`'s inside face.
    pub fn place(&self, panel: &PanelSpec, label: CornerLabel, size: f64) -> MarkerPose {
        let c = corner_center(
            panel.face_width_mm,
            panel.face_height_mm,
            label,
            self.margin_mm,
            size,
        );
        let position = panel.panel_point(c.x, c.y, self.face_eps_mm);
        pose(position, &panel.normal())
    }

    /// Pose at a free world point, lifted `d` along `normal`.
    pub fn place_at(&self, point: &Point3<f64>, normal: &Vector3<f64>, d: f64) -> MarkerPose {
        let n = normal.normalize();
        pose(point + n * d, &n)
    }
}

fn pose(position: Point3<f64>, normal: &Vector3<f64>) -> MarkerPose {
    MarkerPose {
        position,
        orientation: orientation_for_normal(normal),
        normal: Unit::new_normalize(*normal),
    }
}

/// Flat quad of a placed marker: four corners and their texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerQuad {
    /// Counter-clockwise seen from the normal side.
    pub corners: [Point3<f64>; 4],
    pub uvs: [[f32; 2]; 4],
    pub normal: Vector3<f64>,
}

/// Canonical texture coordinates of every marker quad.
pub const MARKER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Unit square scaled to `size` and moved to `pose`.
pub fn marker_quad(pose: &MarkerPose, size: f64) -> MarkerQuad {
    let h = size / 2.0;
    let local = [
        Point3::new(-h, -h, 0.0),
        Point3::new(h, -h, 0.0),
        Point3::new(h, h, 0.0),
        Point3::new(-h, h, 0.0),
    ];
    MarkerQuad {
        corners: local.map(|p| pose.transform_point(&p)),
        uvs: MARKER_UVS,
        normal: pose.normal.into_inner(),
    }
}

/// Where a marker goes on the rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSlot {
    pub id: MarkerId,
    pub panel: PanelRole,
    pub corner: CornerLabel,
}

/// A fully resolved marker ready for tessellation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub id: MarkerId,
    pub image: PathBuf,
    pub size_mm: f64,
    pub panel: PanelRole,
    pub corner: CornerLabel,
    pub pose: MarkerPose,
}

impl MarkerSpec {
    pub fn quad(&self) -> MarkerQuad {
        marker_quad(&self.pose, self.size_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::assemble_panels;
    use crate::volume::AxisAlignedDifference;
    use approx::assert_relative_eq;
    use trihedral_core::{AxisDirection, RigConfig};

    #[test]
    fn corner_centers_of_the_reference_face() {
        let c = |label| corner_center(84.0, 70.0, label, 12.0, 10.5);
        assert_eq!(c(CornerLabel::BL), Point2::new(17.25, 17.25));
        assert_eq!(c(CornerLabel::BR), Point2::new(66.75, 17.25));
        assert_eq!(c(CornerLabel::TL), Point2::new(17.25, 52.75));
        assert_eq!(c(CornerLabel::TR), Point2::new(66.75, 52.75));
    }

    #[test]
    fn corner_centers_stay_inside_the_margin_band() {
        for (w, h, margin, size) in [(84.0, 70.0, 12.0, 10.5), (30.0, 60.0, 2.0, 4.0)] {
            for label in CornerLabel::ALL {
                let c = corner_center(w, h, label, margin, size);
                assert!(c.x >= margin && c.x <= w - margin);
                assert!(c.y >= margin && c.y <= h - margin);
            }
        }
    }

    #[test]
    fn marker_ids_are_bounded() {
        assert!(MarkerId::new(0).is_none());
        assert!(MarkerId::new(9).is_none());
        assert_eq!(MarkerId::all().count(), 8);
        assert!(MarkerId::try_from(4u8).is_ok());
    }

    #[test]
    fn orientation_maps_up_onto_normal() {
        for dir in AxisDirection::ALL {
            let n = dir.to_vector();
            let q = orientation_for_normal(&n);
            assert_relative_eq!(q * Vector3::z(), n, epsilon = 1e-12);
        }
        assert_eq!(
            orientation_for_normal(&Vector3::new(0.0, 0.05, 1.0)),
            UnitQuaternion::identity()
        );
    }

    #[test]
    fn placed_markers_sit_on_their_face() {
        let cfg = RigConfig::default();
        let set = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let placer = MarkerPlacer::new(&cfg.pattern);

        let floor = placer.place(&set.floor, CornerLabel::BL, 10.5);
        assert_relative_eq!(floor.position, Point3::new(17.25, 17.25, 0.85), epsilon = 1e-12);

        let back = placer.place(&set.wall_back, CornerLabel::TR, 10.5);
        assert_relative_eq!(
            back.position,
            Point3::new(108.0 - 17.25, 94.0 - 0.05, 0.8 + 94.0 - 17.25),
            epsilon = 1e-12
        );

        let quad = marker_quad(&back, 10.5);
        for corner in quad.corners {
            assert_relative_eq!(corner.y, 94.0 - 0.05, epsilon = 1e-12);
        }
        assert_relative_eq!(
            (quad.corners[1] - quad.corners[0]).norm(),
            10.5,
            epsilon = 1e-12
        );
        assert_eq!(quad.uvs, MARKER_UVS);
    }

    #[test]
    fn place_at_offsets_along_normal() {
        let placer = MarkerPlacer::new(&RigConfig::default().pattern);
        let pose = placer.place_at(&Point3::new(1.0, 2.0, 3.0), &Vector3::new(2.0, 0.0, 0.0), 0.5);
        assert_relative_eq!(pose.position, Point3::new(1.5, 2.0, 3.0));
        assert_relative_eq!(pose.orientation * Vector3::z(), Vector3::x(), epsilon = 1e-12);
    }
}
