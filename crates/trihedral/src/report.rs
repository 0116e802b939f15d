//! JSON summaries written next to exported scenes.

use crate::pipeline::RigBuild;
use crate::reconstruct::{MarkerAnchor, Reconstruction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trihedral_classify::{PartClassification, PartRole};
use trihedral_core::{CornerLabel, RigConfig};
use trihedral_export::{ExportError, Scene};
use trihedral_rig::{ActiveAreaMapping, MarkerId, PanelRole};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelReport {
    pub role: PanelRole,
    pub inside_normal: String,
    pub face_width_mm: f64,
    pub face_height_mm: f64,
    pub volume_mm3: f64,
    pub cells: usize,
    pub mapping: ActiveAreaMapping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerReport {
    pub id: MarkerId,
    pub panel: PanelRole,
    pub corner: CornerLabel,
    pub position_mm: [f64; 3],
    pub normal: [f64; 3],
    pub image: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneStats {
    pub parts: usize,
    pub triangles: usize,
    pub images: usize,
}

impl From<&Scene> for SceneStats {
    fn from(scene: &Scene) -> Self {
        Self {
            parts: scene.parts.len(),
            triangles: scene.triangle_count(),
            images: scene.images.len(),
        }
    }
}

/// Summary of a forward build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub config: RigConfig,
    pub panels: Vec<PanelReport>,
    pub markers: Vec<MarkerReport>,
    pub scene: SceneStats,
    pub output: PathBuf,
}

impl BuildReport {
    pub fn new(build: &RigBuild, scene: &Scene, output: &Path) -> Self {
        let panels = build
            .panels
            .iter()
            .map(|p| PanelReport {
                role: p.role,
                inside_normal: p.inside_normal.to_string(),
                face_width_mm: p.face_width_mm,
                face_height_mm: p.face_height_mm,
                volume_mm3: p.solid.volume(),
                cells: p.solid.cells.len(),
                mapping: build.mapping(p),
            })
            .collect();
        let markers = build
            .markers
            .iter()
            .map(|m| MarkerReport {
                id: m.id,
                panel: m.panel,
                corner: m.corner,
                position_mm: m.pose.position.coords.into(),
                normal: m.pose.normal.into_inner().into(),
                image: m.image.clone(),
            })
            .collect();
        Self {
            config: build.config,
            panels,
            markers,
            scene: scene.into(),
            output: output.to_path_buf(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedMarkerReport {
    pub id: MarkerId,
    pub part: PartRole,
    pub part_name: String,
    pub anchor: MarkerAnchor,
    pub position_mm: [f64; 3],
    pub normal: [f64; 3],
}

/// Summary of a reconstruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconstructReport {
    pub parts: Vec<PartClassification>,
    pub floor: String,
    pub wall_left: Option<String>,
    pub wall_right: Option<String>,
    pub markers: Vec<PlacedMarkerReport>,
    pub skipped: Vec<MarkerId>,
    pub scene: SceneStats,
    pub output: PathBuf,
}

impl ReconstructReport {
    pub fn new(rec: &Reconstruction, scene: &Scene, output: &Path) -> Self {
        let a = &rec.assignment;
        Self {
            parts: a.parts.clone(),
            floor: a.floor().name.clone(),
            wall_left: a.wall_left().map(|p| p.name.clone()),
            wall_right: a.wall_right().map(|p| p.name.clone()),
            markers: rec
                .markers
                .iter()
                .map(|m| PlacedMarkerReport {
                    id: m.id,
                    part: m.part,
                    part_name: m.part_name.clone(),
                    anchor: m.anchor,
                    position_mm: m.pose.position.coords.into(),
                    normal: m.pose.normal.into_inner().into(),
                })
                .collect(),
            skipped: rec.skipped.clone(),
            scene: scene.into(),
            output: output.to_path_buf(),
        }
    }
}

/// Pretty-print `report` to `path`, creating the parent directory.
pub fn write_report<T: Serialize>(report: &T, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote report {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::build_rig_with;
    use trihedral_rig::{AxisAlignedDifference, MarkerImages};

    #[test]
    fn build_report_serializes_panels_and_markers() {
        let dir = tempfile::tempdir().expect("tempdir");
        for id in MarkerId::all() {
            std::fs::write(dir.path().join(format!("ArucoMarker{id}.png")), b"stub")
                .expect("write");
        }
        let build = build_rig_with(
            &RigConfig::default(),
            &MarkerImages::new(dir.path()),
            &AxisAlignedDifference,
        )
        .expect("build");
        let report = BuildReport::new(&build, &Scene::new(), Path::new("out/rig.glb"));
        assert_eq!(report.panels.len(), 3);
        assert_eq!(report.panels[0].inside_normal, "+Z");
        assert!(report.panels[0].cells > 1);

        let path = dir.path().join("reports/build.json");
        write_report(&report, &path).expect("write");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value["markers"][0]["id"], 8);
        assert_eq!(value["markers"][0]["panel"], "floor");
        assert_eq!(value["config"]["pattern"]["cols"], 6);
    }
}
