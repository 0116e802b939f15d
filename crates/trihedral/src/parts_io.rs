//! JSON input of the reconstruction path.
//!
//! ```json
//! {
//!   "params": { "unit_to_mm": 1000.0 },
//!   "parts": [
//!     { "name": "floor", "min": [0, 0, 0], "max": [0.108, 0.094, 0.0008] },
//!     { "name": "tab", "vertices": [[0.05, 0.05, 0.0], [0.06, 0.06, 0.0008]] }
//!   ]
//! }
//! ```

use crate::error::PipelineError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trihedral_classify::{ClassifyParams, PartBounds};
use trihedral_core::Aabb;

/// One part, given either by its bounds or by its raw vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartInput {
    Bounds {
        name: String,
        min: [f64; 3],
        max: [f64; 3],
    },
    Vertices {
        name: String,
        vertices: Vec<[f64; 3]>,
    },
}

impl PartInput {
    pub fn name(&self) -> &str {
        match self {
            PartInput::Bounds { name, .. } | PartInput::Vertices { name, .. } => name,
        }
    }

    /// Bounds in scene units. Swapped min/max components are tolerated.
    pub fn to_bounds(&self) -> Result<PartBounds, PipelineError> {
        match self {
            PartInput::Bounds { name, min, max } => {
                let corners = [Point3::from(*min), Point3::from(*max)];
                Aabb::from_points(corners)
                    .map(|aabb| PartBounds::new(name.clone(), aabb))
                    .ok_or_else(|| PipelineError::EmptyPart { name: name.clone() })
            }
            PartInput::Vertices { name, vertices } => {
                PartBounds::from_vertices(name.clone(), vertices.iter().map(|v| Point3::from(*v)))
                    .ok_or_else(|| PipelineError::EmptyPart { name: name.clone() })
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartsDocument {
    #[serde(default)]
    pub params: ClassifyParams,
    pub parts: Vec<PartInput>,
}

impl PartsDocument {
    pub fn bounds(&self) -> Result<Vec<PartBounds>, PipelineError> {
        self.parts.iter().map(PartInput::to_bounds).collect()
    }
}

pub fn load_parts(path: &Path) -> Result<PartsDocument, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: PartsDocument =
        serde_json::from_str(&text).map_err(|source| PipelineError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("loaded {} part(s) from {}", doc.parts.len(), path.display());
    Ok(doc)
}
