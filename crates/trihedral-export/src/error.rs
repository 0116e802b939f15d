use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image {path}")]
    UnsupportedImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode PNG texture")]
    Png(#[from] png::EncodingError),
    #[error("failed to serialize glTF JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    InvalidScene(String),
    #[error("binary buffer exceeds 4 GiB ({0} bytes)")]
    TooLarge(usize),
}
