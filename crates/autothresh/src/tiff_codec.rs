//! Tiled TIFF reader/writer built on the `tiff` crate.
//!
//! Reading accepts strip- or tile-organized single-channel unsigned 8/16-bit
//! files. Writing always produces one tiled IFD; edge tiles are zero-padded
//! to the full tile size because TIFF tiles are fixed-size.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use autothresh_core::{BitDepth, ByteOrder, PixelBuffer, PixelData, Tile, TileGrid};
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{Rational, TiffEncoder};
use tiff::tags::{
    CompressionMethod, PhotometricInterpretation, PlanarConfiguration, SampleFormat, Tag,
};
use tiff::ColorType;

use crate::codec::{DecodedImage, ImageCodec, ImageMetadata, PlanarConfig, ResolutionUnit};
use crate::error::{CodecError, FileError};

/// TIFF tiles must be a multiple of this many pixels on each side.
pub const TILE_ALIGN: usize = 16;

/// Default output tile edge.
pub const DEFAULT_TILE_SIZE: usize = 1024;

const DECODE_LIMIT: usize = 1024 * 1024 * 1024;

/// Lossless compression of output tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    None,
    /// zlib stream, TIFF compression 8.
    #[default]
    Deflate,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Self::None => CompressionMethod::None,
            Self::Deflate => CompressionMethod::Deflate,
        }
    }

    fn compress<'a>(self, raw: Cow<'a, [u8]>) -> std::io::Result<Cow<'a, [u8]>> {
        match self {
            Self::None => Ok(raw),
            Self::Deflate => {
                let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&raw)?;
                Ok(Cow::Owned(enc.finish()?))
            }
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "deflate" => Ok(Self::Deflate),
            other => Err(format!("unknown compression '{other}' (expected none or deflate)")),
        }
    }
}

/// [`ImageCodec`] for `.tif` / `.tiff` files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TiffCodec {
    pub compression: Compression,
}

impl TiffCodec {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    fn open(path: &Path) -> Result<Decoder<BufReader<File>>, CodecError> {
        let file = File::open(path)?;
        let mut limits = Limits::default();
        limits.decoding_buffer_size = DECODE_LIMIT;
        limits.ifd_value_size = DECODE_LIMIT;
        limits.intermediate_buffer_size = DECODE_LIMIT;
        Ok(Decoder::new(BufReader::new(file))?.with_limits(limits))
    }

    fn write_tiled(
        &self,
        path: &Path,
        grid: &TileGrid,
        metadata: &ImageMetadata,
        tiles: &[Tile],
    ) -> Result<(), CodecError> {
        let tile_size = grid.tile_size();
        if tile_size % TILE_ALIGN != 0 {
            return Err(CodecError::Layout(format!(
                "tile size {tile_size} is not a multiple of {TILE_ALIGN}"
            )));
        }
        if tiles.len() != grid.tile_count() {
            return Err(CodecError::Layout(format!(
                "expected {} tiles, got {}",
                grid.tile_count(),
                tiles.len()
            )));
        }
        let bpp = metadata.bit_depth.bytes_per_sample();

        let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
        let mut dir = encoder.new_directory()?;

        let mut offsets = vec![0u32; tiles.len()];
        let mut byte_counts = vec![0u32; tiles.len()];
        for tile in tiles {
            let index = tile.rect.row * grid.n_x_tiles() + tile.rect.col;
            if tile.rect.col >= grid.n_x_tiles() || index >= tiles.len() {
                return Err(CodecError::Layout(format!(
                    "tile ({}, {}) outside the grid",
                    tile.rect.col, tile.rect.row
                )));
            }
            let payload = self.compression.compress(pad_tile(tile, tile_size, bpp)?)?;
            let offset = dir.write_data(&payload[..])?;
            offsets[index] = u32::try_from(offset)
                .map_err(|_| CodecError::Layout(format!("tile offset {offset} exceeds 32 bits")))?;
            byte_counts[index] = to_u32(payload.len(), "tile byte count")?;
        }

        dir.write_tag(Tag::ImageWidth, to_u32(grid.width(), "width")?)?;
        dir.write_tag(Tag::ImageLength, to_u32(grid.height(), "height")?)?;
        dir.write_tag(Tag::BitsPerSample, metadata.bit_depth.bits())?;
        dir.write_tag(Tag::Compression, self.compression.method().to_u16())?;
        dir.write_tag(
            Tag::PhotometricInterpretation,
            PhotometricInterpretation::BlackIsZero.to_u16(),
        )?;
        dir.write_tag(Tag::SamplesPerPixel, 1u16)?;
        dir.write_tag(Tag::PlanarConfiguration, planar_tag(metadata.planar).to_u16())?;
        dir.write_tag(Tag::TileWidth, to_u32(tile_size, "tile size")?)?;
        dir.write_tag(Tag::TileLength, to_u32(tile_size, "tile size")?)?;
        dir.write_tag(Tag::TileOffsets, offsets.as_slice())?;
        dir.write_tag(Tag::TileByteCounts, byte_counts.as_slice())?;
        dir.write_tag(Tag::SampleFormat, SampleFormat::Uint.to_u16())?;
        if let Some((n, d)) = metadata.x_resolution {
            dir.write_tag(Tag::XResolution, Rational { n, d })?;
        }
        if let Some((n, d)) = metadata.y_resolution {
            dir.write_tag(Tag::YResolution, Rational { n, d })?;
        }
        if let Some(unit) = metadata.resolution_unit {
            dir.write_tag(Tag::ResolutionUnit, resolution_unit_tag(unit))?;
        }
        if let Some(description) = &metadata.description {
            dir.write_tag(Tag::ImageDescription, description.as_str())?;
        }
        if let Some(software) = &metadata.software {
            dir.write_tag(Tag::Software, software.as_str())?;
        }
        dir.finish()?;
        Ok(())
    }
}

impl ImageCodec for TiffCodec {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage, FileError> {
        let decode_err = |e: CodecError| FileError::Decode(e);
        let mut decoder = Self::open(path).map_err(decode_err)?;
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| decode_err(e.into()))?;

        let depth = match decoder.colortype().map_err(|e| decode_err(e.into()))? {
            ColorType::Gray(bits) => BitDepth::from_bits(bits as u16).ok_or_else(|| {
                FileError::UnsupportedImageShape(format!("{bits}-bit grayscale"))
            })?,
            other => {
                return Err(FileError::UnsupportedImageShape(format!(
                    "{other:?}, expected single-channel grayscale"
                )))
            }
        };
        if let Some(formats) = tag_u16s(&mut decoder, Tag::SampleFormat) {
            if formats.iter().any(|&f| f != SampleFormat::Uint.to_u16()) {
                return Err(FileError::UnsupportedImageShape(format!(
                    "sample format {formats:?}, expected unsigned integer"
                )));
            }
        }

        let metadata = read_metadata(&mut decoder, depth);
        let data = match decoder.read_image().map_err(|e| decode_err(e.into()))? {
            DecodingResult::U8(v) if depth == BitDepth::Eight => PixelData::U8(v),
            DecodingResult::U16(v) if depth == BitDepth::Sixteen => PixelData::U16(v),
            _ => {
                return Err(FileError::UnsupportedImageShape(
                    "samples are not unsigned 8/16-bit integers".to_string(),
                ))
            }
        };
        let buffer = PixelBuffer::new(width as usize, height as usize, data)
            .map_err(|e| decode_err(e.into()))?;
        Ok(DecodedImage { buffer, metadata })
    }

    /// The `tiff` encoder writes a header in host byte order.
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::native()
    }

    fn encode(
        &self,
        path: &Path,
        grid: &TileGrid,
        metadata: &ImageMetadata,
        tiles: &[Tile],
    ) -> Result<(), FileError> {
        self.write_tiled(path, grid, metadata, tiles)
            .map_err(FileError::Encode)
    }
}

fn to_u32(v: usize, what: &str) -> Result<u32, CodecError> {
    u32::try_from(v).map_err(|_| CodecError::Layout(format!("{what} {v} exceeds 32 bits")))
}

/// Copy an edge tile into a zeroed full-size tile.
fn pad_tile(tile: &Tile, tile_size: usize, bpp: usize) -> Result<Cow<'_, [u8]>, CodecError> {
    let rect = &tile.rect;
    if tile.bytes.len() != rect.byte_len(bpp) {
        return Err(CodecError::Layout(format!(
            "tile ({}, {}) has {} bytes, expected {}",
            rect.col,
            rect.row,
            tile.bytes.len(),
            rect.byte_len(bpp)
        )));
    }
    if rect.width == tile_size && rect.height == tile_size {
        return Ok(Cow::Borrowed(&tile.bytes));
    }
    let full_row = tile_size * bpp;
    let row_len = rect.width * bpp;
    let mut out = vec![0u8; full_row * tile_size];
    for (r, src) in tile.bytes.chunks_exact(row_len).enumerate() {
        out[r * full_row..r * full_row + row_len].copy_from_slice(src);
    }
    Ok(Cow::Owned(out))
}

fn tag_u16s<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> Option<Vec<u16>> {
    decoder.find_tag(tag).ok().flatten()?.into_u16_vec().ok()
}

fn tag_rational<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> Option<(u32, u32)> {
    match decoder.find_tag(tag) {
        Ok(Some(Value::Rational(n, d))) => Some((n, d)),
        _ => None,
    }
}

fn tag_ascii<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> Option<String> {
    match decoder.find_tag(tag) {
        Ok(Some(Value::Ascii(s))) => Some(s),
        _ => None,
    }
}

fn read_metadata<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    bit_depth: BitDepth,
) -> ImageMetadata {
    let planar = match tag_u16s(decoder, Tag::PlanarConfiguration).as_deref() {
        Some([2, ..]) => PlanarConfig::Planar,
        _ => PlanarConfig::Chunky,
    };
    let resolution_unit = match tag_u16s(decoder, Tag::ResolutionUnit).as_deref() {
        Some([1, ..]) => Some(ResolutionUnit::None),
        Some([2, ..]) => Some(ResolutionUnit::Inch),
        Some([3, ..]) => Some(ResolutionUnit::Centimeter),
        _ => None,
    };
    ImageMetadata {
        bit_depth,
        planar,
        x_resolution: tag_rational(decoder, Tag::XResolution),
        y_resolution: tag_rational(decoder, Tag::YResolution),
        resolution_unit,
        description: tag_ascii(decoder, Tag::ImageDescription),
        software: tag_ascii(decoder, Tag::Software),
    }
}

fn planar_tag(planar: PlanarConfig) -> PlanarConfiguration {
    match planar {
        PlanarConfig::Chunky => PlanarConfiguration::Chunky,
        PlanarConfig::Planar => PlanarConfiguration::Planar,
    }
}

fn resolution_unit_tag(unit: ResolutionUnit) -> u16 {
    match unit {
        ResolutionUnit::None => 1,
        ResolutionUnit::Inch => 2,
        ResolutionUnit::Centimeter => 3,
    }
}
