//! Image file boundary of the pipeline.
//!
//! The pipeline only talks to [`ImageCodec`]; the shipped implementation is
//! [`crate::TiffCodec`].

use std::path::Path;

use autothresh_core::{BitDepth, ByteOrder, PixelBuffer, Tile, TileGrid};
use serde::{Deserialize, Serialize};

use crate::error::FileError;

/// Planar configuration as stored in the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanarConfig {
    /// Samples interleaved per pixel.
    #[default]
    Chunky,
    /// One plane per sample.
    Planar,
}

/// Unit of the X/Y resolution values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionUnit {
    None,
    Inch,
    Centimeter,
}

/// Descriptive metadata carried unchanged from the decoded input to the
/// encoded output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub bit_depth: BitDepth,
    #[serde(default)]
    pub planar: PlanarConfig,
    /// Pixels per resolution unit as `(numerator, denominator)`.
    #[serde(default)]
    pub x_resolution: Option<(u32, u32)>,
    #[serde(default)]
    pub y_resolution: Option<(u32, u32)>,
    #[serde(default)]
    pub resolution_unit: Option<ResolutionUnit>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub software: Option<String>,
}

impl ImageMetadata {
    pub fn new(bit_depth: BitDepth) -> Self {
        Self {
            bit_depth,
            planar: PlanarConfig::Chunky,
            x_resolution: None,
            y_resolution: None,
            resolution_unit: None,
            description: None,
            software: None,
        }
    }
}

/// A decoded single-channel image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub buffer: PixelBuffer,
    pub metadata: ImageMetadata,
}

/// Decode/encode capability for one file format.
pub trait ImageCodec {
    /// Whether `path` is a file this codec reads, judged by name only.
    fn accepts(&self, path: &Path) -> bool;

    /// Read a single-channel 8/16-bit unsigned image. Anything else fails
    /// with [`FileError::UnsupportedImageShape`].
    fn decode(&self, path: &Path) -> Result<DecodedImage, FileError>;

    /// Byte order in which 16-bit tile bytes must be handed to
    /// [`ImageCodec::encode`].
    fn byte_order(&self) -> ByteOrder;

    /// Write a tiled image. `tiles` arrive in grid order, packed in
    /// [`ImageCodec::byte_order`], edge tiles unpadded.
    fn encode(
        &self,
        path: &Path,
        grid: &TileGrid,
        metadata: &ImageMetadata,
        tiles: &[Tile],
    ) -> Result<(), FileError>;
}
