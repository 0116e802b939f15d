//! Forward path: configuration to a textured, marker-carrying scene.

use crate::error::PipelineError;
use std::path::Path;
use trihedral_core::RigConfig;
use trihedral_export::{
    bake_panel_texture, bake_size, encode_png, load_image, marker_mesh, solid_mesh, ExportError,
    ImageData, Material, Scene, SceneWriter,
};
use trihedral_rig::{
    assemble_panels, forward_layout, rig_markers, ActiveAreaMapping, ActiveAreaShader,
    AxisAlignedDifference, CheckerRaster, MarkerId, MarkerImages, MarkerQuad, MarkerSpec, PanelSet,
    PanelSpec, SolidColor, VolumeSubtractor, DEFAULT_PX_PER_SQUARE,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Knobs of scene generation that do not change the rig itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Baked texture density.
    pub px_per_square: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            px_per_square: DEFAULT_PX_PER_SQUARE,
        }
    }
}

/// Geometry and marker placement of one rig.
#[derive(Clone, Debug)]
pub struct RigBuild {
    pub config: RigConfig,
    pub panels: PanelSet,
    pub markers: Vec<MarkerSpec>,
}

impl RigBuild {
    pub fn mapping(&self, panel: &PanelSpec) -> ActiveAreaMapping {
        ActiveAreaMapping::for_panel(&self.config.pattern, panel)
    }
}

/// Build the rig with the analytic box difference.
pub fn build_rig(config: &RigConfig, images: &MarkerImages) -> Result<RigBuild, PipelineError> {
    build_rig_with(config, images, &AxisAlignedDifference)
}

/// Build the rig with a caller-provided boolean operator.
///
/// Marker images are checked before any geometry exists; all missing files
/// are reported in one error.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn build_rig_with(
    config: &RigConfig,
    images: &MarkerImages,
    subtractor: &dyn VolumeSubtractor,
) -> Result<RigBuild, PipelineError> {
    let slots = forward_layout();
    images.check(slots.iter().map(|s| s.id))?;

    let panels = assemble_panels(config, subtractor)?;
    let markers = rig_markers(config, &panels, &slots, images)?;
    log::info!(
        "assembled {} panels ({:.1} x {:.1} x {:.2} mm) with {} markers",
        panels.iter().count(),
        config.panel.panel_w_mm,
        config.panel.panel_h_mm,
        config.panel.panel_thick_mm,
        markers.len()
    );

    Ok(RigBuild {
        config: *config,
        panels,
        markers,
    })
}

/// Tessellate panels and markers and bake each panel's checker face.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn rig_scene(build: &RigBuild, options: &BuildOptions) -> Result<Scene, PipelineError> {
    let pattern = &build.config.pattern;
    let px = options.px_per_square.max(1);
    let mut scene = Scene::new();

    for panel in build.panels.iter() {
        let shader = ActiveAreaShader::new(
            build.mapping(panel),
            CheckerRaster::new(pattern.cols, pattern.rows, px),
            SolidColor::default(),
        );
        let (w, h) = bake_size(panel, pattern.square_size_mm, px);
        let raster = bake_panel_texture(&shader, w, h);
        let bytes = encode_png(&raster).map_err(ExportError::from)?;
        log::debug!("baked {} texture: {w}x{h} px, {} bytes", panel.role, bytes.len());

        let name = format!("Checker_{}", panel.role);
        let image = scene.add_image(ImageData {
            name: name.clone(),
            mime_type: "image/png".to_string(),
            bytes,
        });
        let material = scene.add_material(Material::checker_panel(name, image));
        scene.add_part(solid_mesh(
            format!("Panel_{}", panel.role),
            &panel.solid,
            material,
            Some(panel),
        ));
    }

    add_markers(
        &mut scene,
        build.markers.iter().map(|m| (m.id, m.image.as_path(), m.quad())),
    )?;
    Ok(scene)
}

/// Embed marker images and add one unlit quad per marker.
pub(crate) fn add_markers<'a, I>(scene: &mut Scene, markers: I) -> Result<(), PipelineError>
where
    I: IntoIterator<Item = (MarkerId, &'a Path, MarkerQuad)>,
{
    for (id, path, quad) in markers {
        let image = scene.add_image(load_image(path, format!("ArucoMarker{id}"))?);
        let material = scene.add_material(Material::marker(id, image));
        scene.add_part(marker_mesh(format!("MarkerPlane_{id}"), &quad, material));
    }
    Ok(())
}

/// Validate and hand the scene to `writer`.
pub fn export(scene: &Scene, writer: &dyn SceneWriter, path: &Path) -> Result<(), PipelineError> {
    scene.validate().map_err(ExportError::InvalidScene)?;
    writer.write(scene, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trihedral_export::RgbaImage;
    use trihedral_rig::{PanelRole, RigError};

    fn marker_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let img = RgbaImage {
            width: 2,
            height: 2,
            data: [[0u8, 0, 0, 255], [255, 255, 255, 255]].repeat(2).concat(),
        };
        let bytes = encode_png(&img).expect("png");
        for id in MarkerId::all() {
            std::fs::write(dir.path().join(format!("ArucoMarker{id}.png")), &bytes)
                .expect("write");
        }
        dir
    }

    #[test]
    fn missing_images_stop_the_build_before_geometry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = build_rig(&RigConfig::default(), &MarkerImages::new(dir.path())).unwrap_err();
        match err {
            PipelineError::Rig(RigError::MissingResource { paths }) => assert_eq!(paths.len(), 8),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scene_has_three_panels_and_eight_markers() {
        let dir = marker_dir();
        let build = build_rig(&RigConfig::default(), &MarkerImages::new(dir.path())).expect("build");
        assert_eq!(build.markers.len(), 8);

        let scene = rig_scene(&build, &BuildOptions { px_per_square: 4 }).expect("scene");
        assert_eq!(scene.parts.len(), 11);
        assert_eq!(scene.images.len(), 11);
        assert_eq!(scene.materials.iter().filter(|m| m.unlit).count(), 8);
        assert!(scene.validate().is_ok());
        assert_eq!(scene.parts[0].name, "Panel_floor");
        assert_eq!(scene.parts[3].name, "MarkerPlane_8");
    }

    #[test]
    fn right_wall_mapping_uses_its_square_face() {
        let dir = marker_dir();
        let build = build_rig(&RigConfig::default(), &MarkerImages::new(dir.path())).expect("build");
        let m = build.mapping(build.panels.get(PanelRole::WallRight));
        assert!((m.u_min - 12.0 / 94.0).abs() < 1e-12);
        assert!((m.scale_u - 94.0 / 84.0).abs() < 1e-12);
    }
}
