//! Batch binarization of tiled grayscale images.
//!
//! Every image in an input directory is thresholded with one of the
//! [`ThresholdMethod`]s, binarized, and written as a tiled TIFF of the same
//! bit depth and metadata into an output directory. Files fail
//! independently; see [`BatchReport`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use autothresh::{BatchConfig, ThresholdMethod};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = BatchConfig::new("scans", "masks", ThresholdMethod::Otsu);
//! config.concurrency = 4;
//! let report = autothresh::run(&config)?;
//! for failed in report.failed() {
//!     eprintln!("{}: {:?}", failed.input.display(), failed.outcome);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `autothresh::core`: histogram, threshold methods, binarizer, tiling.
//! - [`ImageCodec`]: the file-format boundary; [`TiffCodec`] implements it.
//! - [`BatchPipeline`]: discovery and the per-file stage machine.
//! - [`BatchConfig`]: JSON-loadable run settings.

mod codec;
mod config;
mod error;
mod pipeline;
mod tiff_codec;

pub use autothresh_core as core;

pub use autothresh_core::{Polarity, ThresholdMethod};
pub use codec::{DecodedImage, ImageCodec, ImageMetadata, PlanarConfig, ResolutionUnit};
pub use config::{BatchConfig, SuccessPolicy};
pub use error::{BatchError, CodecError, ConfigError, ConfigIoError, FileError};
pub use pipeline::{
    run, BatchPipeline, BatchReport, FileOutcome, FileReport, FileStage, ThresholdRecord,
};
pub use tiff_codec::{Compression, TiffCodec, DEFAULT_TILE_SIZE, TILE_ALIGN};
