//! Single-channel pixel buffers at 8 or 16 bits per sample.

use serde::{Deserialize, Serialize};

/// Supported sample bit depths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Map a raw bits-per-sample value; anything but 8 or 16 is unsupported.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
        }
    }

    /// Number of histogram bins, `2^bits`.
    pub fn bins(self) -> usize {
        1usize << self.bits()
    }

    /// Brightest representable level (255 or 65535).
    pub fn max_value(self) -> u16 {
        match self {
            Self::Eight => u8::MAX as u16,
            Self::Sixteen => u16::MAX,
        }
    }
}

/// Byte order used when 16-bit samples are serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the running host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::LittleEndian
        } else {
            Self::BigEndian
        }
    }

    #[inline]
    pub fn encode_u16(self, v: u16) -> [u8; 2] {
        match self {
            Self::LittleEndian => v.to_le_bytes(),
            Self::BigEndian => v.to_be_bytes(),
        }
    }

    #[inline]
    pub fn decode_u16(self, b: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(b),
            Self::BigEndian => u16::from_be_bytes(b),
        }
    }
}

/// Sample storage, one variant per bit depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl PixelData {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bit_depth(&self) -> BitDepth {
        match self {
            Self::U8(_) => BitDepth::Eight,
            Self::U16(_) => BitDepth::Sixteen,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PixelBufferError {
    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
    #[error("invalid sample buffer length (expected {expected} samples, got {got})")]
    LengthMismatch { expected: usize, got: usize },
    #[error("invalid byte buffer length (expected {expected} bytes, got {got})")]
    ByteLengthMismatch { expected: usize, got: usize },
}

/// Row-major single-channel image, `len == width * height` samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: PixelData,
}

impl PixelBuffer {
    /// Validate dimensions against the sample count.
    pub fn new(width: usize, height: usize, data: PixelData) -> Result<Self, PixelBufferError> {
        if width == 0 || height == 0 {
            return Err(PixelBufferError::EmptyImage { width, height });
        }
        let expected = width * height;
        if data.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_u8(width: usize, height: usize, data: Vec<u8>) -> Result<Self, PixelBufferError> {
        Self::new(width, height, PixelData::U8(data))
    }

    pub fn from_u16(
        width: usize,
        height: usize,
        data: Vec<u16>,
    ) -> Result<Self, PixelBufferError> {
        Self::new(width, height, PixelData::U16(data))
    }

    /// Rebuild a buffer from packed bytes, the inverse of [`PixelBuffer::to_bytes`].
    pub fn from_bytes(
        width: usize,
        height: usize,
        depth: BitDepth,
        order: ByteOrder,
        bytes: &[u8],
    ) -> Result<Self, PixelBufferError> {
        let expected = width * height * depth.bytes_per_sample();
        if bytes.len() != expected {
            return Err(PixelBufferError::ByteLengthMismatch {
                expected,
                got: bytes.len(),
            });
        }
        let data = match depth {
            BitDepth::Eight => PixelData::U8(bytes.to_vec()),
            BitDepth::Sixteen => PixelData::U16(
                bytes
                    .chunks_exact(2)
                    .map(|b| order.decode_u16([b[0], b[1]]))
                    .collect(),
            ),
        };
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// In-place sample access; callers must keep the sample count.
    pub(crate) fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    pub fn into_data(self) -> PixelData {
        self.data
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.data.bit_depth()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bit_depth().bytes_per_sample()
    }

    /// Packed length in bytes.
    pub fn byte_len(&self) -> usize {
        self.width * self.height * self.bytes_per_pixel()
    }

    /// Sample at `(x, y)` widened to `u16`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        let idx = y * self.width + x;
        match &self.data {
            PixelData::U8(v) => v[idx] as u16,
            PixelData::U16(v) => v[idx],
        }
    }

    /// Lowest and highest sample values.
    pub fn min_max(&self) -> (u16, u16) {
        fn fold<T: Copy + Into<u16>>(v: &[T]) -> (u16, u16) {
            v.iter().fold((u16::MAX, 0u16), |(lo, hi), &s| {
                let s: u16 = s.into();
                (lo.min(s), hi.max(s))
            })
        }
        match &self.data {
            PixelData::U8(v) => fold(v),
            PixelData::U16(v) => fold(v),
        }
    }

    /// Serialize samples: 8-bit passes through, 16-bit becomes two bytes per
    /// sample in `order`.
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        match &self.data {
            PixelData::U8(v) => v.clone(),
            PixelData::U16(v) => {
                let mut out = Vec::with_capacity(v.len() * 2);
                for &s in v {
                    out.extend_from_slice(&order.encode_u16(s));
                }
                out
            }
        }
    }
}
