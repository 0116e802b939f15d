//! Scene assembly and file output for trihedral rigs.
//!
//! Solids and marker quads are tessellated into a backend-neutral `Scene`;
//! the checker appearance of each panel is baked into an RGBA texture so
//! that formats without node graphs carry it exactly. `GlbWriter` is the
//! reference `SceneWriter`.

mod error;
mod glb;
mod material;
mod mesh;
mod tessellate;
mod texture;

pub use error::ExportError;
pub use glb::{
    encode_glb, to_gltf_direction, to_gltf_position, GlbWriter, SceneWriter, KHR_MATERIALS_UNLIT,
};
pub use mesh::{ImageData, Material, MeshPart, Scene};
pub use tessellate::{box_mesh, face_axes, face_quad, marker_mesh, solid_mesh};
pub use texture::{bake_panel_texture, bake_size, encode_png, load_image, RgbaImage};
