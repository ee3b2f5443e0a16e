//! Two-level conversion of a pixel buffer around a threshold.

use serde::{Deserialize, Serialize};

use crate::pixel::{PixelBuffer, PixelData};

/// Which side of the threshold becomes the bright level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Samples above the threshold become the bit-depth maximum.
    #[default]
    ForegroundHigh,
    /// Samples above the threshold become 0.
    ForegroundLow,
}

/// Maps every sample to 0 or the bit-depth maximum.
///
/// A threshold at or below `-1` leaves the buffer untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Binarizer {
    pub polarity: Polarity,
}

impl Binarizer {
    pub fn new(polarity: Polarity) -> Self {
        Self { polarity }
    }

    /// Binarized copy of `buffer`.
    pub fn apply(&self, buffer: &PixelBuffer, threshold: f64) -> PixelBuffer {
        self.binarize(buffer.clone(), threshold)
    }

    /// Binarize in place and hand the buffer back.
    pub fn binarize(&self, mut buffer: PixelBuffer, threshold: f64) -> PixelBuffer {
        if threshold <= -1.0 {
            return buffer;
        }
        let (above, below) = self.levels(buffer.bit_depth().max_value());
        match buffer.data_mut() {
            PixelData::U8(v) => {
                let (above, below) = (above as u8, below as u8);
                for s in v.iter_mut() {
                    *s = if *s as f64 > threshold { above } else { below };
                }
            }
            PixelData::U16(v) => {
                for s in v.iter_mut() {
                    *s = if *s as f64 > threshold { above } else { below };
                }
            }
        }
        buffer
    }

    fn levels(&self, max: u16) -> (u16, u16) {
        match self.polarity {
            Polarity::ForegroundHigh => (max, 0),
            Polarity::ForegroundLow => (0, max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_around_threshold() {
        let buf = PixelBuffer::from_u8(4, 1, vec![0, 10, 11, 200]).unwrap();
        let out = Binarizer::default().apply(&buf, 10.0);
        assert_eq!(out.data(), &PixelData::U8(vec![0, 0, 255, 255]));
    }

    #[test]
    fn sixteen_bit_uses_full_range() {
        let buf = PixelBuffer::from_u16(3, 1, vec![100, 1000, 60000]).unwrap();
        let out = Binarizer::default().apply(&buf, 999.5);
        assert_eq!(out.data(), &PixelData::U16(vec![0, 65535, 65535]));
    }

    #[test]
    fn inverse_polarity_swaps_levels() {
        let buf = PixelBuffer::from_u8(3, 1, vec![5, 50, 150]).unwrap();
        let out = Binarizer::new(Polarity::ForegroundLow).apply(&buf, 50.0);
        assert_eq!(out.data(), &PixelData::U8(vec![255, 255, 0]));
    }

    #[test]
    fn no_threshold_passes_through() {
        let buf = PixelBuffer::from_u16(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(Binarizer::default().apply(&buf, -1.0), buf);
        assert_eq!(Binarizer::default().apply(&buf, -7.0), buf);
    }

    #[test]
    fn binarizing_twice_changes_nothing() {
        let buf = PixelBuffer::from_u8(5, 1, vec![3, 90, 128, 129, 250]).unwrap();
        let b = Binarizer::default();
        for t in [0.0, 128.0, 254.0] {
            let once = b.apply(&buf, t);
            assert_eq!(b.apply(&once, t), once);
        }
    }

    #[test]
    fn keeps_shape_and_depth() {
        let buf = PixelBuffer::from_u16(3, 2, vec![0; 6]).unwrap();
        let out = Binarizer::default().binarize(buf, 0.0);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.bit_depth(), crate::pixel::BitDepth::Sixteen);
    }
}
