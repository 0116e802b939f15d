use crate::marker::MarkerId;
use crate::volume::VolumeError;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RigError {
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error("missing {} marker image(s): {}", .paths.len(), join_paths(.paths))]
    MissingResource { paths: Vec<PathBuf> },
    #[error("marker id {id} is placed more than once")]
    DuplicateMarker { id: MarkerId },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
