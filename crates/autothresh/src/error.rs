use std::path::PathBuf;

use autothresh_core::{PixelBufferError, ThresholdConfigError, TileError};

/// Failure inside an image codec.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),
    #[error(transparent)]
    Buffer(#[from] PixelBufferError),
    #[error(transparent)]
    Tile(#[from] TileError),
    #[error("{0}")]
    Layout(String),
}

/// Failure confined to one file; the batch moves on.
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("unsupported image shape: {0}")]
    UnsupportedImageShape(String),
    #[error("decode failed: {0}")]
    Decode(#[source] CodecError),
    #[error("tiling failed: {0}")]
    Tile(#[from] TileError),
    #[error("encode failed: {0}")]
    Encode(#[source] CodecError),
}

/// Invalid batch configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Threshold(#[from] ThresholdConfigError),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("tile size {0} is not a positive multiple of 16")]
    TileSize(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Failure that stops the whole batch.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("input directory {} not found", .0.display())]
    InputNotFound(PathBuf),
    #[error("cannot list input directory {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no supported images in {}", .0.display())]
    EmptyInput(PathBuf),
    #[error("output directory {} is not writable: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("cannot write threshold report: {0}")]
    Report(#[source] ConfigIoError),
}
