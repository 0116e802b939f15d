//! Backend-neutral scene description.
//!
//! Positions are millimetres in the rig's Z-up frame. Texture coordinates
//! follow the face convention (`v` grows upward); writers convert both.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Encoded image bytes embedded as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// Index into `Scene::images`.
    pub base_color_texture: Option<usize>,
    pub unlit: bool,
    pub double_sided: bool,
}

/// Indexed triangle mesh with one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub positions: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: usize,
}

impl MeshPart {
    pub fn new(name: impl Into<String>, material: usize) -> Self {
        Self {
            name: name.into(),
            material,
            ..Self::default()
        }
    }

    /// Append a planar quad as two triangles `(0, 1, 2)` and `(0, 2, 3)`.
    pub fn push_quad(&mut self, corners: [Point3<f64>; 4], normal: Vector3<f64>, uvs: [[f32; 2]; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend(corners);
        self.normals.extend([normal; 4]);
        self.uvs.extend(uvs);
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A finished scene ready for a `SceneWriter`.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub parts: Vec<MeshPart>,
    pub materials: Vec<Material>,
    pub images: Vec<ImageData>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, image: ImageData) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_part(&mut self, part: MeshPart) {
        self.parts.push(part);
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(MeshPart::triangle_count).sum()
    }

    /// Check that every index is in range.
    pub fn validate(&self) -> Result<(), String> {
        for part in &self.parts {
            if part.material >= self.materials.len() {
                return Err(format!(
                    "part {:?} uses material {} of {}",
                    part.name,
                    part.material,
                    self.materials.len()
                ));
            }
            let n = part.positions.len();
            if part.normals.len() != n || part.uvs.len() != n {
                return Err(format!("part {:?} has mismatched attribute counts", part.name));
            }
            if part.indices.iter().any(|&i| i as usize >= n) {
                return Err(format!("part {:?} indexes past its vertices", part.name));
            }
        }
        for m in &self.materials {
            if let Some(t) = m.base_color_texture {
                if t >= self.images.len() {
                    return Err(format!("material {:?} uses missing image {t}", m.name));
                }
            }
        }
        Ok(())
    }
}
