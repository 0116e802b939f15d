//! Raster textures: baked panel faces, PNG encoding and marker image loading.

use crate::error::ExportError;
use crate::mesh::ImageData;
use image::ImageFormat;
use png::{BitDepth, ColorType, Encoder};
use std::io::Cursor;
use std::path::Path;
use trihedral_rig::{to_u8, ActiveAreaShader, ColorLayer, PanelSpec};

/// RGBA8 raster, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaImage {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Raster size of a face at a fixed pixel density per checker square.
pub fn bake_size(panel: &PanelSpec, square_size_mm: f64, px_per_square: u32) -> (u32, u32) {
    let px_per_mm = px_per_square as f64 / square_size_mm;
    let w = (panel.face_width_mm * px_per_mm).ceil().max(1.0) as u32;
    let h = (panel.face_height_mm * px_per_mm).ceil().max(1.0) as u32;
    (w, h)
}

/// Sample `shader` at pixel centers over the whole face.
///
/// Row 0 is the top of the face (`v = 1`).
pub fn bake_panel_texture<A, M>(shader: &ActiveAreaShader<A, M>, width: u32, height: u32) -> RgbaImage
where
    A: ColorLayer,
    M: ColorLayer,
{
    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        let v = 1.0 - (y as f64 + 0.5) / height as f64;
        for x in 0..width {
            let u = (x as f64 + 0.5) / width as f64;
            data.extend(shader.shade(u, v).map(to_u8));
        }
    }
    RgbaImage {
        width,
        height,
        data,
    }
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, img.width, img.height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        let mut writer = enc.write_header()?;
        writer.write_image_data(&img.data)?;
    }
    Ok(buf)
}

/// Load a marker image for embedding.
///
/// PNG and JPEG bytes are kept verbatim; any other format `image` can
/// decode is re-encoded as PNG, since glTF only accepts those two.
pub fn load_image(path: &Path, name: impl Into<String>) -> Result<ImageData, ExportError> {
    let bytes = std::fs::read(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let format = image::guess_format(&bytes).map_err(|source| ExportError::UnsupportedImage {
        path: path.to_path_buf(),
        source,
    })?;

    let (mime_type, bytes) = match format {
        ImageFormat::Png | ImageFormat::Jpeg => (format.to_mime_type().to_string(), bytes),
        other => {
            log::debug!("re-encoding {} ({other:?}) as PNG", path.display());
            let decoded = image::load_from_memory_with_format(&bytes, other).map_err(|source| {
                ExportError::UnsupportedImage {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            let mut out = Cursor::new(Vec::new());
            decoded
                .write_to(&mut out, ImageFormat::Png)
                .map_err(|source| ExportError::UnsupportedImage {
                    path: path.to_path_buf(),
                    source,
                })?;
            (ImageFormat::Png.to_mime_type().to_string(), out.into_inner())
        }
    };

    Ok(ImageData {
        name: name.into(),
        mime_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trihedral_core::RigConfig;
    use trihedral_rig::{
        assemble_panels, ActiveAreaMapping, AxisAlignedDifference, CheckerRaster, SolidColor,
    };

    fn shader_for(px: u32) -> (ActiveAreaShader<CheckerRaster, SolidColor>, PanelSpec) {
        let cfg = RigConfig::default();
        let set = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let floor = set.floor.clone();
        let shader = ActiveAreaShader::new(
            ActiveAreaMapping::for_panel(&cfg.pattern, &floor),
            CheckerRaster::new(cfg.pattern.cols, cfg.pattern.rows, px),
            SolidColor::default(),
        );
        (shader, floor)
    }

    #[test]
    fn baked_face_has_margin_border_and_dark_bottom_left_square() {
        let (shader, floor) = shader_for(8);
        let (w, h) = bake_size(&floor, 14.0, 8);
        assert_eq!((w, h), (62, 54));
        let img = bake_panel_texture(&shader, w, h);
        assert_eq!(img.data.len(), (w * h * 4) as usize);

        let margin = [242, 242, 242, 255];
        assert_eq!(img.pixel(0, 0), margin);
        assert_eq!(img.pixel(w - 1, h - 1), margin);
        // 12 mm margin is ~6.9 px; 2 px further in along the bottom-left
        assert_eq!(img.pixel(9, h - 10), [0, 0, 0, 255]);
    }

    #[test]
    fn png_round_trips_through_image_sniffing() {
        let img = RgbaImage {
            width: 2,
            height: 1,
            data: vec![0, 0, 0, 255, 255, 255, 255, 255],
        };
        let bytes = encode_png(&img).expect("encode");
        assert_eq!(image::guess_format(&bytes).expect("format"), ImageFormat::Png);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("m.png");
        std::fs::write(&path, &bytes).expect("write");
        let loaded = load_image(&path, "m").expect("load");
        assert_eq!(loaded.mime_type, "image/png");
        assert_eq!(loaded.bytes, bytes);
    }

    #[test]
    fn unknown_bytes_are_rejected_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"definitely not an image").expect("write");
        match load_image(&path, "junk") {
            Err(ExportError::UnsupportedImage { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
