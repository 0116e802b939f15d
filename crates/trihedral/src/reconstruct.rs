//! Reconstruction path: markers and materials for an already-built rig.
//!
//! The input is a flat list of unlabeled parts. Roles come from
//! `trihedral_classify::classify`; markers are anchored on the bounding-box
//! corners of the max-side face of each panel, lifted `face_eps_mm` along
//! the outward axis.

use crate::error::PipelineError;
use crate::pipeline::add_markers;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trihedral_classify::{
    classify, face_corners, ClassifyParams, FaceSide, PartBounds, PartRole, RoleAssignment,
    SizeClass,
};
use trihedral_core::{Aabb, CornerLabel, FaceCorners, PatternConfig};
use trihedral_export::{box_mesh, Material, Scene};
use trihedral_rig::{marker_quad, MarkerId, MarkerImages, MarkerPlacer, MarkerPose};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where on a panel face a marker is anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerAnchor {
    Corner(CornerLabel),
    /// Midpoint of the segment between two corners.
    Between(CornerLabel, CornerLabel),
}

impl MarkerAnchor {
    pub fn resolve(self, corners: &FaceCorners) -> Point3<f64> {
        match self {
            MarkerAnchor::Corner(c) => corners.get(c),
            MarkerAnchor::Between(a, b) => nalgebra::center(&corners.get(a), &corners.get(b)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructSlot {
    pub id: MarkerId,
    pub part: PartRole,
    pub anchor: MarkerAnchor,
}

// 2 and 3 sit on the left wall's spine edge; unvalidated against the
// physical rig.
const RECONSTRUCT_SLOTS: [(u8, PartRole, MarkerAnchor); 8] = [
    (6, PartRole::Floor, MarkerAnchor::Corner(CornerLabel::BR)),
    (8, PartRole::Floor, MarkerAnchor::Corner(CornerLabel::BL)),
    (7, PartRole::Floor, MarkerAnchor::Corner(CornerLabel::TL)),
    (1, PartRole::WallLeft, MarkerAnchor::Corner(CornerLabel::TL)),
    (5, PartRole::WallLeft, MarkerAnchor::Corner(CornerLabel::BL)),
    (4, PartRole::WallRight, MarkerAnchor::Corner(CornerLabel::TR)),
    (3, PartRole::WallLeft, MarkerAnchor::Corner(CornerLabel::TR)),
    (
        2,
        PartRole::WallLeft,
        MarkerAnchor::Between(CornerLabel::TR, CornerLabel::BR),
    ),
];

/// Marker map used on classified parts.
pub fn reconstruction_layout() -> Vec<ReconstructSlot> {
    RECONSTRUCT_SLOTS
        .iter()
        .filter_map(|&(id, part, anchor)| {
            MarkerId::new(id).map(|id| ReconstructSlot { id, part, anchor })
        })
        .collect()
}

/// A marker placed on a classified part. Positions are millimetres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedMarker {
    pub id: MarkerId,
    pub part: PartRole,
    pub part_name: String,
    pub anchor: MarkerAnchor,
    pub image: PathBuf,
    pub size_mm: f64,
    pub pose: MarkerPose,
}

#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub assignment: RoleAssignment,
    /// Part bounds converted to millimetres, in input order.
    pub bounds_mm: Vec<Aabb>,
    pub markers: Vec<PlacedMarker>,
    /// Markers whose wall was not found.
    pub skipped: Vec<MarkerId>,
}

fn to_mm(aabb: &Aabb, unit_to_mm: f64) -> Aabb {
    Aabb::new(aabb.min * unit_to_mm, aabb.max * unit_to_mm)
}

/// Classify `parts` and place the marker map on the result.
///
/// Every marker image is checked first, so a missing file fails before any
/// classification work.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(parts = parts.len())))]
pub fn reconstruct_rig(
    parts: &[PartBounds],
    params: &ClassifyParams,
    pattern: &PatternConfig,
    images: &MarkerImages,
) -> Result<Reconstruction, PipelineError> {
    let slots = reconstruction_layout();
    images.check(slots.iter().map(|s| s.id))?;

    let assignment = classify(parts, params)?;
    let bounds_mm: Vec<Aabb> = assignment
        .parts
        .iter()
        .map(|p| to_mm(&p.aabb, params.unit_to_mm))
        .collect();

    let placer = MarkerPlacer::new(pattern);
    let mut markers = Vec::with_capacity(slots.len());
    let mut skipped = Vec::new();

    for slot in slots {
        let Some(idx) = index_of(&assignment, slot.part) else {
            log::warn!("no {} found; skipping marker {}", slot.part, slot.id);
            skipped.push(slot.id);
            continue;
        };
        let part = &assignment.parts[idx];
        let axis = part.normal_axis;
        let corners = face_corners(&bounds_mm[idx], axis, FaceSide::Max);
        let normal = FaceSide::Max.outward(axis).to_vector();
        let pose = placer.place_at(&slot.anchor.resolve(&corners), &normal, placer.face_eps_mm());
        log::debug!(
            "marker {} on {} {:?} at ({:.2}, {:.2}, {:.2})",
            slot.id,
            part.name,
            slot.anchor,
            pose.position.x,
            pose.position.y,
            pose.position.z
        );
        markers.push(PlacedMarker {
            id: slot.id,
            part: slot.part,
            part_name: part.name.clone(),
            anchor: slot.anchor,
            image: images.path_for(slot.id),
            size_mm: pattern.marker_size_mm,
            pose,
        });
    }

    log::info!(
        "classified {} parts (floor {:?}); placed {} markers, skipped {}",
        assignment.parts.len(),
        assignment.floor().name,
        markers.len(),
        skipped.len()
    );
    Ok(Reconstruction {
        assignment,
        bounds_mm,
        markers,
        skipped,
    })
}

fn index_of(assignment: &RoleAssignment, role: PartRole) -> Option<usize> {
    match role {
        PartRole::Floor => Some(assignment.floor),
        PartRole::WallLeft => assignment.wall_left,
        PartRole::WallRight => assignment.wall_right,
    }
}

/// Laminate boxes for every part plus the marker quads.
pub fn reconstruction_scene(rec: &Reconstruction) -> Result<Scene, PipelineError> {
    let mut scene = Scene::new();
    let white = scene.add_material(Material::laminate_white());
    let black = scene.add_material(Material::laminate_black());

    for (part, aabb) in rec.assignment.parts.iter().zip(&rec.bounds_mm) {
        let material = match part.size_class {
            SizeClass::Large => white,
            SizeClass::Small => black,
        };
        scene.add_part(box_mesh(part.name.clone(), &aabb.to_box(), material));
    }

    add_markers(
        &mut scene,
        rec.markers
            .iter()
            .map(|m| (m.id, m.image.as_path(), marker_quad(&m.pose, m.size_mm))),
    )?;
    Ok(scene)
}
