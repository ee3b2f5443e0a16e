//! Histogram auto-thresholding for single-channel scientific images.
//!
//! The crate is I/O free. It covers the pieces of a binarization run that
//! only look at pixels:
//!
//! - [`PixelBuffer`]: 8/16-bit row-major samples with validated dimensions.
//! - [`Histogram`] and [`BracketedHistogram`]: counts and their populated range.
//! - [`ThresholdSelector`]: the eighteen [`ThresholdMethod`]s behind one
//!   dispatch, including offset correction back to intensities.
//! - [`Binarizer`]: two-level conversion with selectable [`Polarity`].
//! - [`TileGrid`] and [`TileCodec`]: tile geometry and byte packing for
//!   tiled encoders.
//!
//! ```
//! use autothresh_core::{Binarizer, Histogram, PixelBuffer, ThresholdMethod, ThresholdSelector};
//!
//! let buf = PixelBuffer::from_u8(4, 1, vec![10, 12, 200, 210]).unwrap();
//! let hist = Histogram::build(&buf).bracket();
//! let selector = ThresholdSelector::new(ThresholdMethod::Mean, None).unwrap();
//! let t = selector.resolve(hist.as_ref());
//! let out = Binarizer::default().apply(&buf, t);
//! assert_eq!(out.get(0, 0), 0);
//! assert_eq!(out.get(3, 0), 255);
//! ```

mod binarize;
mod histogram;
mod logger;
mod method;
pub mod methods;
mod pixel;
mod selector;
mod tile;

pub use binarize::{Binarizer, Polarity};
pub use histogram::{BracketedHistogram, Histogram, HistogramOptions};
pub use method::{ThresholdConfigError, ThresholdMethod};
pub use pixel::{BitDepth, ByteOrder, PixelBuffer, PixelBufferError, PixelData};
pub use selector::{compute_bin, select, Selection, ThresholdSelector, NO_THRESHOLD};
pub use tile::{pack_tile, unpack_tile, Tile, TileCodec, TileError, TileGrid, TileRect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
