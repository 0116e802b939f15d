//! glTF 2.0 binary (GLB) writer.
//!
//! The whole file is assembled in memory and written with a single call,
//! so a failed export never leaves a truncated but valid-looking GLB.
//! Geometry is converted from millimetres, Z-up to metres, Y-up.

use crate::error::ExportError;
use crate::mesh::{Material, MeshPart, Scene};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use trihedral_core::MM_PER_M;

#[cfg(feature = "tracing")]
use tracing::instrument;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const FILTER_NEAREST: u32 = 9728;
const WRAP_CLAMP_TO_EDGE: u32 = 33071;
const MODE_TRIANGLES: u32 = 4;

pub const KHR_MATERIALS_UNLIT: &str = "KHR_materials_unlit";

/// Consumes a finished scene and persists it.
pub trait SceneWriter {
    fn write(&self, scene: &Scene, path: &Path) -> Result<(), ExportError>;
}

/// Writes binary glTF with all images embedded.
#[derive(Clone, Debug)]
pub struct GlbWriter {
    pub generator: String,
}

impl Default for GlbWriter {
    fn default() -> Self {
        Self {
            generator: format!("trihedral-rig {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SceneWriter for GlbWriter {
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, scene), fields(path = %path.display())))]
    fn write(&self, scene: &Scene, path: &Path) -> Result<(), ExportError> {
        let bytes = encode_glb(scene, &self.generator)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, &bytes).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "wrote {} ({} bytes, {} parts, {} triangles, {} images)",
            path.display(),
            bytes.len(),
            scene.parts.len(),
            scene.triangle_count(),
            scene.images.len()
        );
        Ok(())
    }
}

/// Millimetre Z-up point to metre Y-up glTF coordinates.
#[inline]
pub fn to_gltf_position(p: &Point3<f64>) -> [f32; 3] {
    [
        (p.x / MM_PER_M) as f32,
        (p.z / MM_PER_M) as f32,
        (-p.y / MM_PER_M) as f32,
    ]
}

/// Z-up direction to Y-up; a proper rotation, so winding is preserved.
#[inline]
pub fn to_gltf_direction(v: &Vector3<f64>) -> [f32; 3] {
    [v.x as f32, v.z as f32, -v.y as f32]
}

/// glTF texture coordinates have `v` pointing down.
#[inline]
fn to_gltf_uv(uv: &[f32; 2]) -> [f32; 2] {
    [uv[0], 1.0 - uv[1]]
}

#[derive(Default)]
struct BinBuffer {
    data: Vec<u8>,
    views: Vec<Value>,
}

impl BinBuffer {
    fn push_view(&mut self, bytes: &[u8], stride: Option<usize>, target: Option<u32>) -> usize {
        self.align();
        let mut view = Map::new();
        view.insert("buffer".into(), json!(0));
        view.insert("byteOffset".into(), json!(self.data.len()));
        view.insert("byteLength".into(), json!(bytes.len()));
        if let Some(stride) = stride {
            view.insert("byteStride".into(), json!(stride));
        }
        if let Some(target) = target {
            view.insert("target".into(), json!(target));
        }
        self.data.extend_from_slice(bytes);
        self.views.push(Value::Object(view));
        self.views.len() - 1
    }

    fn align(&mut self) {
        let pad = (4 - self.data.len() % 4) % 4;
        self.data.extend(std::iter::repeat_n(0u8, pad));
    }
}

fn f32_bytes<const N: usize>(items: &[[f32; N]]) -> Vec<u8> {
    items
        .iter()
        .flat_map(|v| v.iter().flat_map(|c| c.to_le_bytes()))
        .collect()
}

fn bounds(items: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in items {
        for k in 0..3 {
            min[k] = min[k].min(p[k]);
            max[k] = max[k].max(p[k]);
        }
    }
    (min, max)
}

/// Buffer views and accessors of one part; returns its primitive JSON.
fn push_part(bin: &mut BinBuffer, accessors: &mut Vec<Value>, part: &MeshPart) -> Value {
    let positions: Vec<[f32; 3]> = part.positions.iter().map(to_gltf_position).collect();
    let normals: Vec<[f32; 3]> = part.normals.iter().map(to_gltf_direction).collect();
    let uvs: Vec<[f32; 2]> = part.uvs.iter().map(to_gltf_uv).collect();
    let indices: Vec<u8> = part.indices.iter().flat_map(|i| i.to_le_bytes()).collect();
    let (min, max) = bounds(&positions);

    let pos_view = bin.push_view(&f32_bytes(&positions), Some(12), Some(TARGET_ARRAY_BUFFER));
    let nrm_view = bin.push_view(&f32_bytes(&normals), Some(12), Some(TARGET_ARRAY_BUFFER));
    let uv_view = bin.push_view(&f32_bytes(&uvs), Some(8), Some(TARGET_ARRAY_BUFFER));
    let idx_view = bin.push_view(&indices, None, Some(TARGET_ELEMENT_ARRAY_BUFFER));

    let first = accessors.len();
    accessors.push(json!({
        "bufferView": pos_view,
        "componentType": COMPONENT_FLOAT,
        "count": positions.len(),
        "type": "VEC3",
        "min": min,
        "max": max,
    }));
    accessors.push(json!({
        "bufferView": nrm_view,
        "componentType": COMPONENT_FLOAT,
        "count": normals.len(),
        "type": "VEC3",
    }));
    accessors.push(json!({
        "bufferView": uv_view,
        "componentType": COMPONENT_FLOAT,
        "count": uvs.len(),
        "type": "VEC2",
    }));
    accessors.push(json!({
        "bufferView": idx_view,
        "componentType": COMPONENT_UNSIGNED_INT,
        "count": part.indices.len(),
        "type": "SCALAR",
    }));

    json!({
        "attributes": {
            "POSITION": first,
            "NORMAL": first + 1,
            "TEXCOORD_0": first + 2,
        },
        "indices": first + 3,
        "material": part.material,
        "mode": MODE_TRIANGLES,
    })
}

fn material_json(m: &Material) -> Value {
    let mut pbr = Map::new();
    pbr.insert("baseColorFactor".into(), json!(m.base_color));
    pbr.insert("metallicFactor".into(), json!(m.metallic));
    pbr.insert("roughnessFactor".into(), json!(m.roughness));
    if let Some(tex) = m.base_color_texture {
        pbr.insert("baseColorTexture".into(), json!({ "index": tex }));
    }
    let mut out = Map::new();
    out.insert("name".into(), json!(m.name));
    out.insert("pbrMetallicRoughness".into(), Value::Object(pbr));
    out.insert("doubleSided".into(), json!(m.double_sided));
    if m.unlit {
        let mut ext = Map::new();
        ext.insert(KHR_MATERIALS_UNLIT.into(), json!({}));
        out.insert("extensions".into(), Value::Object(ext));
    }
    Value::Object(out)
}

/// Serialize `scene` into GLB bytes.
pub fn encode_glb(scene: &Scene, generator: &str) -> Result<Vec<u8>, ExportError> {
    scene.validate().map_err(ExportError::InvalidScene)?;
    let parts: Vec<&MeshPart> = scene.parts.iter().filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(ExportError::InvalidScene("scene has no geometry".into()));
    }

    let mut bin = BinBuffer::default();
    let mut accessors = Vec::new();
    let mut meshes = Vec::with_capacity(parts.len());
    let mut nodes = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let primitive = push_part(&mut bin, &mut accessors, part);
        meshes.push(json!({ "name": part.name, "primitives": [primitive] }));
        nodes.push(json!({ "name": part.name, "mesh": i }));
    }

    let mut images = Vec::with_capacity(scene.images.len());
    let mut textures = Vec::with_capacity(scene.images.len());
    for (i, img) in scene.images.iter().enumerate() {
        let view = bin.push_view(&img.bytes, None, None);
        images.push(json!({ "name": img.name, "bufferView": view, "mimeType": img.mime_type }));
        textures.push(json!({ "sampler": 0, "source": i }));
    }
    bin.align();

    let mut root = Map::new();
    root.insert(
        "asset".into(),
        json!({ "version": "2.0", "generator": generator }),
    );
    root.insert("scene".into(), json!(0));
    root.insert(
        "scenes".into(),
        json!([{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }]),
    );
    root.insert("nodes".into(), Value::Array(nodes));
    root.insert("meshes".into(), Value::Array(meshes));
    root.insert(
        "materials".into(),
        Value::Array(scene.materials.iter().map(material_json).collect()),
    );
    root.insert("accessors".into(), Value::Array(accessors));
    if !images.is_empty() {
        root.insert("images".into(), Value::Array(images));
        root.insert("textures".into(), Value::Array(textures));
        root.insert(
            "samplers".into(),
            json!([{
                "magFilter": FILTER_NEAREST,
                "minFilter": FILTER_NEAREST,
                "wrapS": WRAP_CLAMP_TO_EDGE,
                "wrapT": WRAP_CLAMP_TO_EDGE,
            }]),
        );
    }
    root.insert("bufferViews".into(), Value::Array(bin.views));
    root.insert("buffers".into(), json!([{ "byteLength": bin.data.len() }]));
    if scene.materials.iter().any(|m| m.unlit) {
        root.insert("extensionsUsed".into(), json!([KHR_MATERIALS_UNLIT]));
    }

    let mut json_bytes = serde_json::to_vec(&Value::Object(root))?;
    let json_pad = (4 - json_bytes.len() % 4) % 4;
    json_bytes.extend(std::iter::repeat_n(b' ', json_pad));

    let total = GLB_HEADER_LEN + CHUNK_HEADER_LEN + json_bytes.len() + CHUNK_HEADER_LEN + bin.data.len();
    let total_u32 = u32::try_from(total).map_err(|_| ExportError::TooLarge(total))?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(GLB_MAGIC);
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&total_u32.to_le_bytes());

    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);

    out.extend_from_slice(&(bin.data.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin.data);

    debug!(
        "encoded GLB: json {} bytes, bin {} bytes",
        json_bytes.len(),
        bin.data.len()
    );
    Ok(out)
}
