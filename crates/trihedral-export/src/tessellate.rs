//! Triangle meshes of solids and marker quads.
//!
//! Every box cell becomes six quads with outward normals. Cells of a cut
//! solid keep their shared internal faces; they are hidden inside the
//! material and cost only a few triangles.

use crate::mesh::MeshPart;
use nalgebra::Point3;
use trihedral_core::{Axis, AxisDirection, BoxVolume, Sign};
use trihedral_rig::{MarkerQuad, PanelSpec, Solid};

/// In-plane edge axes `(a, b)` of a face with `a x b` along `dir`.
pub fn face_axes(dir: AxisDirection) -> (Axis, Axis) {
    match (dir.axis, dir.sign) {
        (Axis::X, Sign::Pos) => (Axis::Y, Axis::Z),
        (Axis::X, Sign::Neg) => (Axis::Z, Axis::Y),
        (Axis::Y, Sign::Pos) => (Axis::Z, Axis::X),
        (Axis::Y, Sign::Neg) => (Axis::X, Axis::Z),
        (Axis::Z, Sign::Pos) => (Axis::X, Axis::Y),
        (Axis::Z, Sign::Neg) => (Axis::Y, Axis::X),
    }
}

/// Corners of one box face, counter-clockwise seen from outside.
pub fn face_quad(cell: &BoxVolume, dir: AxisDirection) -> [Point3<f64>; 4] {
    let (a, b) = face_axes(dir);
    let (min, max) = (cell.min(), cell.max());
    let mut base = min;
    if dir.sign == Sign::Pos {
        base[dir.axis.index()] = max[dir.axis.index()];
    }
    let ea = a.unit() * (max[a.index()] - min[a.index()]);
    let eb = b.unit() * (max[b.index()] - min[b.index()]);
    [base, base + ea, base + ea + eb, base + eb]
}

/// Mesh a solid. Faces pointing along `uv_panel`'s inside normal get planar
/// face UVs; every other face gets `(0, 0)`.
pub fn solid_mesh(
    name: impl Into<String>,
    solid: &Solid,
    material: usize,
    uv_panel: Option<&PanelSpec>,
) -> MeshPart {
    let mut part = MeshPart::new(name, material);
    for cell in &solid.cells {
        for dir in AxisDirection::ALL {
            let corners = face_quad(cell, dir);
            let uvs = match uv_panel {
                Some(panel) if panel.inside_normal == dir => corners.map(|p| {
                    let (u, v) = panel.face_uv(&p);
                    [u as f32, v as f32]
                }),
                _ => [[0.0; 2]; 4],
            };
            part.push_quad(corners, dir.to_vector(), uvs);
        }
    }
    part
}

pub fn box_mesh(name: impl Into<String>, cell: &BoxVolume, material: usize) -> MeshPart {
    solid_mesh(name, &Solid::from_box(*cell), material, None)
}

/// Single-sided marker quad.
pub fn marker_mesh(name: impl Into<String>, quad: &MarkerQuad, material: usize) -> MeshPart {
    let mut part = MeshPart::new(name, material);
    part.push_quad(quad.corners, quad.normal, quad.uvs);
    part
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use trihedral_core::RigConfig;
    use trihedral_rig::{assemble_panels, AxisAlignedDifference};

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        let cell = BoxVolume::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 3.0, 4.0));
        for dir in AxisDirection::ALL {
            let q = face_quad(&cell, dir);
            let n = (q[1] - q[0]).cross(&(q[3] - q[0])).normalize();
            assert_relative_eq!(n, dir.to_vector(), epsilon = 1e-12);
            // the face lies on the outer side of the box
            let c = (q[0].coords + q[2].coords) * 0.5;
            let outward = (Point3::from(c) - cell.center()).dot(&dir.to_vector());
            assert!(outward > 0.0);
        }
    }

    #[test]
    fn box_mesh_has_twelve_triangles() {
        let cell = BoxVolume::new(Point3::origin(), Vector3::new(1.0, 1.0, 1.0));
        let m = box_mesh("b", &cell, 0);
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.triangle_count(), 12);
        assert!(m.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
    }

    #[test]
    fn inside_face_gets_planar_uvs() {
        let cfg = RigConfig::default();
        let set = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let m = solid_mesh("back", &set.wall_back.solid, 0, Some(&set.wall_back));

        // -Y is the fourth direction in AxisDirection::ALL
        let inside = &m.uvs[12..16];
        assert_relative_eq!(inside[0][0], 0.0);
        // the wall box starts `overlap` below the face origin
        assert_relative_eq!(inside[0][1], (-0.1 / 94.0) as f32, epsilon = 1e-5);
        let top_right = inside[2];
        assert_relative_eq!(top_right[0], (108.1 / 108.0) as f32, epsilon = 1e-5);
        assert_relative_eq!(top_right[1], ((94.1 - 0.1) / 94.0) as f32, epsilon = 1e-5);
        // the outward +Y face is untextured
        assert!(m.uvs[8..12].iter().all(|uv| *uv == [0.0, 0.0]));
    }
}
