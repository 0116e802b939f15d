use std::path::PathBuf;
use trihedral_classify::ClassifyError;
use trihedral_core::ConfigError;
use trihedral_export::ExportError;
use trihedral_rig::{RigError, VolumeError};

/// Any failure of the forward or reconstruction pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error(transparent)]
    Rig(#[from] RigError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("part {name:?} has no vertices")]
    EmptyPart { name: String },
}
