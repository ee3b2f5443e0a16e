//! Tile geometry and per-tile byte packing.
//!
//! A [`TileGrid`] covers an image with `tile_size` squares starting at the
//! top-left corner. Edge tiles are clipped to the image, never padded; any
//! padding a file format needs is the encoder's business.

use crate::pixel::{BitDepth, ByteOrder, PixelBuffer, PixelBufferError};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TileError {
    #[error("tile size must be positive")]
    ZeroTileSize,
    #[error("image of {width}x{height} has no area to tile")]
    EmptyImage { width: usize, height: usize },
    #[error("tile ({col}, {row}) outside {n_x}x{n_y} grid")]
    OutOfGrid {
        col: usize,
        row: usize,
        n_x: usize,
        n_y: usize,
    },
    #[error("tile at ({x}, {y}) carries {got} bytes, expected {expected}")]
    TileLength {
        x: usize,
        y: usize,
        expected: usize,
        got: usize,
    },
    #[error("expected {expected} tiles, got {got}")]
    TileCount { expected: usize, got: usize },
    #[error(transparent)]
    Buffer(#[from] PixelBufferError),
}

/// Pixel rectangle of one tile, clipped to the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub col: usize,
    pub row: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    /// Packed byte length at `bytes_per_pixel`.
    pub fn byte_len(&self, bytes_per_pixel: usize) -> usize {
        self.width * self.height * bytes_per_pixel
    }
}

/// Regular grid of `tile_size` squares over a `width x height` image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: usize,
    n_x: usize,
    n_y: usize,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, tile_size: usize) -> Result<Self, TileError> {
        if tile_size == 0 {
            return Err(TileError::ZeroTileSize);
        }
        if width == 0 || height == 0 {
            return Err(TileError::EmptyImage { width, height });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            n_x: width.div_ceil(tile_size),
            n_y: height.div_ceil(tile_size),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    pub fn n_x_tiles(&self) -> usize {
        self.n_x
    }

    pub fn n_y_tiles(&self) -> usize {
        self.n_y
    }

    pub fn tile_count(&self) -> usize {
        self.n_x * self.n_y
    }

    pub fn tile(&self, col: usize, row: usize) -> Result<TileRect, TileError> {
        if col >= self.n_x || row >= self.n_y {
            return Err(TileError::OutOfGrid {
                col,
                row,
                n_x: self.n_x,
                n_y: self.n_y,
            });
        }
        Ok(self.rect(col, row))
    }

    fn rect(&self, col: usize, row: usize) -> TileRect {
        let x = col * self.tile_size;
        let y = row * self.tile_size;
        TileRect {
            col,
            row,
            x,
            y,
            width: self.tile_size.min(self.width - x),
            height: self.tile_size.min(self.height - y),
        }
    }

    /// Tiles in row-major order: rows top to bottom, left to right within a
    /// row.
    pub fn tiles(&self) -> impl Iterator<Item = TileRect> + '_ {
        (0..self.n_y).flat_map(move |row| (0..self.n_x).map(move |col| self.rect(col, row)))
    }
}

/// Copy one tile out of a packed row-major image.
///
/// `bytes` holds `image_width * bytes_per_pixel` bytes per row.
pub fn pack_tile(
    bytes: &[u8],
    image_width: usize,
    bytes_per_pixel: usize,
    tile: &TileRect,
) -> Vec<u8> {
    let stride = image_width * bytes_per_pixel;
    let row_len = tile.width * bytes_per_pixel;
    let mut out = Vec::with_capacity(row_len * tile.height);
    for r in 0..tile.height {
        let start = (tile.y + r) * stride + tile.x * bytes_per_pixel;
        out.extend_from_slice(&bytes[start..start + row_len]);
    }
    out
}

/// Inverse of [`pack_tile`]: write tile rows back into the packed image.
pub fn unpack_tile(
    tile_bytes: &[u8],
    image: &mut [u8],
    image_width: usize,
    bytes_per_pixel: usize,
    tile: &TileRect,
) -> Result<(), TileError> {
    let expected = tile.byte_len(bytes_per_pixel);
    if tile_bytes.len() != expected {
        return Err(TileError::TileLength {
            x: tile.x,
            y: tile.y,
            expected,
            got: tile_bytes.len(),
        });
    }
    let stride = image_width * bytes_per_pixel;
    let row_len = tile.width * bytes_per_pixel;
    for (r, src) in tile_bytes.chunks_exact(row_len).enumerate() {
        let start = (tile.y + r) * stride + tile.x * bytes_per_pixel;
        image[start..start + row_len].copy_from_slice(src);
    }
    Ok(())
}

/// Packed bytes of one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub rect: TileRect,
    pub bytes: Vec<u8>,
}

/// Splits buffers into tiles and reassembles them at a fixed depth and byte
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCodec {
    grid: TileGrid,
    depth: BitDepth,
    order: ByteOrder,
}

impl TileCodec {
    pub fn new(grid: TileGrid, depth: BitDepth, order: ByteOrder) -> Self {
        Self { grid, depth, order }
    }

    /// Grid and depth taken from `buffer`.
    pub fn for_buffer(
        buffer: &PixelBuffer,
        tile_size: usize,
        order: ByteOrder,
    ) -> Result<Self, TileError> {
        let grid = TileGrid::new(buffer.width(), buffer.height(), tile_size)?;
        Ok(Self::new(grid, buffer.bit_depth(), order))
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.depth
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Every tile of `buffer` in grid order.
    pub fn split(&self, buffer: &PixelBuffer) -> Vec<Tile> {
        let bytes = buffer.to_bytes(self.order);
        let bpp = self.depth.bytes_per_sample();
        self.grid
            .tiles()
            .map(|rect| Tile {
                bytes: pack_tile(&bytes, self.grid.width(), bpp, &rect),
                rect,
            })
            .collect()
    }

    /// Rebuild the buffer from tiles in any order.
    pub fn assemble(&self, tiles: &[Tile]) -> Result<PixelBuffer, TileError> {
        if tiles.len() != self.grid.tile_count() {
            return Err(TileError::TileCount {
                expected: self.grid.tile_count(),
                got: tiles.len(),
            });
        }
        let bpp = self.depth.bytes_per_sample();
        let mut image = vec![0u8; self.grid.width() * self.grid.height() * bpp];
        for tile in tiles {
            let rect = self.grid.tile(tile.rect.col, tile.rect.row)?;
            unpack_tile(&tile.bytes, &mut image, self.grid.width(), bpp, &rect)?;
        }
        Ok(PixelBuffer::from_bytes(
            self.grid.width(),
            self.grid.height(),
            self.depth,
            self.order,
            &image,
        )?)
    }
}
