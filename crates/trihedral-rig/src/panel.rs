//! The three panels of the trihedral: floor, back wall and right wall.
//!
//! All panels share the world origin as their common corner. The overlap
//! only grows the outer extent of each box so seams do not leave slivers;
//! inside faces never move.

use crate::volume::{build_box, Solid, VolumeError, VolumeSubtractor};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use trihedral_core::{AxisDirection, BoxVolume, RigConfig};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelRole {
    Floor,
    WallBack,
    WallRight,
}

impl PanelRole {
    pub const ALL: [PanelRole; 3] = [PanelRole::Floor, PanelRole::WallBack, PanelRole::WallRight];

    pub fn as_str(self) -> &'static str {
        match self {
            PanelRole::Floor => "floor",
            PanelRole::WallBack => "wall_back",
            PanelRole::WallRight => "wall_right",
        }
    }
}

impl fmt::Display for PanelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assembled panel and the frame of its inside (target-carrying) face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub role: PanelRole,
    /// Uncut panel box.
    pub volume: BoxVolume,
    /// Panel material after any cutout.
    pub solid: Solid,
    pub inside_normal: AxisDirection,
    pub u_axis: AxisDirection,
    pub v_axis: AxisDirection,
    /// World position of face-local `(0, 0)`, on the inside face plane.
    pub face_origin: Point3<f64>,
    pub face_width_mm: f64,
    pub face_height_mm: f64,
}

impl PanelSpec {
    /// Map a face-local point to world space, lifted `d` along the inside normal.
    pub fn panel_point(&self, u: f64, v: f64, d: f64) -> Point3<f64> {
        self.face_origin
            + self.u_axis.to_vector() * u
            + self.v_axis.to_vector() * v
            + self.inside_normal.to_vector() * d
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.inside_normal.to_vector()
    }

    /// Face-local `(u, v)` normalized to `0..1` over the face size.
    pub fn face_uv(&self, p: &Point3<f64>) -> (f64, f64) {
        let rel = p - self.face_origin;
        (
            rel.dot(&self.u_axis.to_vector()) / self.face_width_mm,
            rel.dot(&self.v_axis.to_vector()) / self.face_height_mm,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSet {
    pub floor: PanelSpec,
    pub wall_back: PanelSpec,
    pub wall_right: PanelSpec,
}

impl PanelSet {
    pub fn get(&self, role: PanelRole) -> &PanelSpec {
        match role {
            PanelRole::Floor => &self.floor,
            PanelRole::WallBack => &self.wall_back,
            PanelRole::WallRight => &self.wall_right,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelSpec> {
        [&self.floor, &self.wall_back, &self.wall_right].into_iter()
    }
}

/// Fold relief notch cut out of the floor's front edge.
///
/// Spans `cutout_width` centered at `W/2`, reaches `cutout_depth` in from
/// `y = 0` and overshoots the floor thickness on both sides.
pub fn floor_cutout(config: &RigConfig) -> Result<BoxVolume, VolumeError> {
    let p = &config.pattern;
    let w = config.panel.panel_w_mm;
    let t = config.panel.panel_thick_mm;
    build_box(
        Point3::new(w / 2.0 - p.cutout_width_mm / 2.0, -p.cutout_depth_mm, -t),
        Vector3::new(p.cutout_width_mm, 2.0 * p.cutout_depth_mm, 3.0 * t),
    )
}

/// Build the floor, back wall and right wall for a validated configuration.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(config, subtractor)))]
pub fn assemble_panels(
    config: &RigConfig,
    subtractor: &dyn VolumeSubtractor,
) -> Result<PanelSet, VolumeError> {
    let w = config.panel.panel_w_mm;
    let h = config.panel.panel_h_mm;
    let t = config.panel.panel_thick_mm;
    let ov = config.pattern.panel_overlap_mm;
    let wall_z = (t - ov).max(0.0);

    let floor_box = build_box(Point3::origin(), Vector3::new(w + ov, h + ov, t))?;
    let cutout = floor_cutout(config)?;
    let floor_solid = subtractor.subtract(&floor_box, &cutout);
    log::debug!(
        "floor cutout removed {:.3} mm^3 in {} cells",
        floor_box.volume() - floor_solid.volume(),
        floor_solid.cells.len()
    );

    let floor = PanelSpec {
        role: PanelRole::Floor,
        volume: floor_box,
        solid: floor_solid,
        inside_normal: AxisDirection::PLUS_Z,
        u_axis: AxisDirection::PLUS_X,
        v_axis: AxisDirection::PLUS_Y,
        face_origin: Point3::new(0.0, 0.0, t),
        face_width_mm: w,
        face_height_mm: h,
    };

    let back_box = build_box(
        Point3::new(0.0, h, wall_z),
        Vector3::new(w + ov, t + ov, h + ov),
    )?;
    let wall_back = PanelSpec {
        role: PanelRole::WallBack,
        volume: back_box,
        solid: Solid::from_box(back_box),
        inside_normal: AxisDirection::MINUS_Y,
        u_axis: AxisDirection::PLUS_X,
        v_axis: AxisDirection::PLUS_Z,
        face_origin: Point3::new(0.0, h, t),
        face_width_mm: w,
        face_height_mm: h,
    };

    // the right wall hinges on the floor's Y edge, so it is H wide
    let right_box = build_box(
        Point3::new(w, 0.0, wall_z),
        Vector3::new(t + ov, h + ov, h + ov),
    )?;
    let wall_right = PanelSpec {
        role: PanelRole::WallRight,
        volume: right_box,
        solid: Solid::from_box(right_box),
        inside_normal: AxisDirection::MINUS_X,
        u_axis: AxisDirection::PLUS_Y,
        v_axis: AxisDirection::PLUS_Z,
        face_origin: Point3::new(w, 0.0, t),
        face_width_mm: h,
        face_height_mm: h,
    };

    Ok(PanelSet {
        floor,
        wall_back,
        wall_right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{intersection, AxisAlignedDifference};
    use approx::assert_relative_eq;
    use trihedral_core::DimensionParams;

    fn config_with_overlap(ov: f64) -> RigConfig {
        DimensionParams {
            panel_overlap_mm: ov,
            ..DimensionParams::default()
        }
        .validate()
        .expect("config")
    }

    #[test]
    fn default_rig_matches_hinge_layout() {
        let set = assemble_panels(&RigConfig::default(), &AxisAlignedDifference).expect("panels");

        assert_eq!(set.floor.volume.corner, Point3::origin());
        assert_relative_eq!(set.floor.volume.size, Vector3::new(108.1, 94.1, 0.8));

        assert_relative_eq!(set.wall_back.volume.corner, Point3::new(0.0, 94.0, 0.7));
        assert_relative_eq!(set.wall_back.volume.size, Vector3::new(108.1, 0.9, 94.1));

        assert_relative_eq!(set.wall_right.volume.corner, Point3::new(108.0, 0.0, 0.7));
        assert_relative_eq!(set.wall_right.volume.size, Vector3::new(0.9, 94.1, 94.1));
        assert_relative_eq!(set.wall_right.face_width_mm, 94.0);
    }

    #[test]
    fn inside_faces_do_not_depend_on_overlap() {
        let a = assemble_panels(&config_with_overlap(0.1), &AxisAlignedDifference).expect("a");
        let b = assemble_panels(&config_with_overlap(0.6), &AxisAlignedDifference).expect("b");
        for role in PanelRole::ALL {
            let (pa, pb) = (a.get(role), b.get(role));
            assert_eq!(pa.face_origin, pb.face_origin);
            assert_eq!(pa.inside_normal, pb.inside_normal);
            for (u, v) in [(0.0, 0.0), (10.0, 20.0), (50.0, 3.5)] {
                assert_eq!(pa.panel_point(u, v, 0.05), pb.panel_point(u, v, 0.05));
            }
        }
    }

    #[test]
    fn panel_point_follows_each_face_frame() {
        let set = assemble_panels(&RigConfig::default(), &AxisAlignedDifference).expect("panels");
        let d = 0.05;
        assert_relative_eq!(
            set.floor.panel_point(1.0, 2.0, d),
            Point3::new(1.0, 2.0, 0.8 + d)
        );
        assert_relative_eq!(
            set.wall_back.panel_point(1.0, 2.0, d),
            Point3::new(1.0, 94.0 - d, 0.8 + 2.0)
        );
        assert_relative_eq!(
            set.wall_right.panel_point(1.0, 2.0, d),
            Point3::new(108.0 - d, 1.0, 0.8 + 2.0)
        );
    }

    #[test]
    fn floor_cutout_penetrates_and_obeys_volume_identity() {
        let cfg = RigConfig::default();
        let set = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let cutout = floor_cutout(&cfg).expect("cutout");

        assert!(cutout.min().z < 0.0 && cutout.max().z > cfg.panel.panel_thick_mm);
        assert_relative_eq!(cutout.min().x, 44.0);
        assert_relative_eq!(cutout.max().y, 10.0);

        let removed = intersection(&set.floor.volume, &cutout).expect("overlap");
        assert_relative_eq!(
            set.floor.solid.volume(),
            set.floor.volume.volume() - removed.volume(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn face_uv_inverts_panel_point() {
        let set = assemble_panels(&RigConfig::default(), &AxisAlignedDifference).expect("panels");
        for panel in set.iter() {
            let p = panel.panel_point(panel.face_width_mm * 0.25, panel.face_height_mm * 0.5, 0.0);
            let (u, v) = panel.face_uv(&p);
            assert_relative_eq!(u, 0.25, epsilon = 1e-12);
            assert_relative_eq!(v, 0.5, epsilon = 1e-12);
        }
    }
}
