//! Material presets of the rig.

use crate::mesh::Material;
use trihedral_rig::MarkerId;

impl Material {
    /// Untextured PBR material.
    pub fn solid(name: impl Into<String>, base_color: [f32; 4], roughness: f32) -> Self {
        Self {
            name: name.into(),
            base_color,
            metallic: 0.0,
            roughness,
            base_color_texture: None,
            unlit: false,
            double_sided: false,
        }
    }

    /// Light laminate of large parts.
    pub fn laminate_white() -> Self {
        Self::solid("Laminate_White", [0.95, 0.95, 0.95, 1.0], 0.45)
    }

    /// Dark laminate of small parts.
    pub fn laminate_black() -> Self {
        Self::solid("Laminate_Black", [0.03, 0.03, 0.03, 1.0], 0.55)
    }

    /// Matte panel material carrying a baked checker texture.
    pub fn checker_panel(name: impl Into<String>, texture: usize) -> Self {
        Self {
            base_color_texture: Some(texture),
            ..Self::solid(name, [1.0, 1.0, 1.0, 1.0], 0.9)
        }
    }

    /// Unlit marker material, so the pattern reads the same under any light.
    pub fn marker(id: MarkerId, texture: usize) -> Self {
        Self {
            base_color_texture: Some(texture),
            unlit: true,
            ..Self::solid(format!("Marker_{id}"), [1.0, 1.0, 1.0, 1.0], 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let m = Material::marker(MarkerId::new(3).expect("id"), 2);
        assert_eq!(m.name, "Marker_3");
        assert!(m.unlit);
        assert_eq!(m.base_color_texture, Some(2));

        assert!(Material::laminate_black().base_color[0] < Material::laminate_white().base_color[0]);
        assert_eq!(Material::checker_panel("p", 0).roughness, 0.9);
    }
}
