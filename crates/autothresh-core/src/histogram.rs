//! Intensity histograms and bracketing.
//!
//! Bracketing restricts a histogram to the inclusive range between its lowest
//! and highest populated bins. Threshold methods only ever see the bracketed
//! counts; the offset is added back by [`crate::ThresholdSelector::resolve`].

use serde::{Deserialize, Serialize};

use crate::pixel::{PixelBuffer, PixelData};

/// Histogram clamping applied before bracketing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramOptions {
    /// Zero the count of intensity 0.
    #[serde(default)]
    pub ignore_black: bool,
    /// Zero the count of the brightest intensity (255 or 65535).
    #[serde(default)]
    pub ignore_white: bool,
}

/// Full-range intensity counts, `len == 2^bit_depth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// Count every sample of `buffer`.
    pub fn build(buffer: &PixelBuffer) -> Self {
        let mut counts = vec![0u64; buffer.bit_depth().bins()];
        match buffer.data() {
            PixelData::U8(v) => {
                for &s in v {
                    counts[s as usize] += 1;
                }
            }
            PixelData::U16(v) => {
                for &s in v {
                    counts[s as usize] += 1;
                }
            }
        }
        Self { counts }
    }

    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Apply `ignore_black` / `ignore_white`.
    pub fn clamp(&mut self, opts: HistogramOptions) {
        if opts.ignore_black {
            if let Some(first) = self.counts.first_mut() {
                *first = 0;
            }
        }
        if opts.ignore_white {
            if let Some(last) = self.counts.last_mut() {
                *last = 0;
            }
        }
    }

    /// Restrict to `[min_bin..=max_bin]`.
    ///
    /// Both ends are found with full scans. Returns `None` when no bin is
    /// populated.
    pub fn bracket(&self) -> Option<BracketedHistogram> {
        let mut max_bin = None;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > 0 {
                max_bin = Some(i);
            }
        }
        let mut min_bin = None;
        for (i, &c) in self.counts.iter().enumerate().rev() {
            if c > 0 {
                min_bin = Some(i);
            }
        }
        let (min_bin, max_bin) = (min_bin?, max_bin?);
        Some(BracketedHistogram {
            counts: self.counts[min_bin..=max_bin].to_vec(),
            min_bin,
            max_bin,
        })
    }
}

/// Populated sub-range of a [`Histogram`], re-indexed from 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BracketedHistogram {
    counts: Vec<u64>,
    min_bin: usize,
    max_bin: usize,
}

impl BracketedHistogram {
    /// Wrap already-bracketed counts whose bin 0 sits at `min_bin`.
    ///
    /// Used by callers that hold a histogram from elsewhere; no validation of
    /// the end bins is done.
    pub fn from_counts(counts: Vec<u64>, min_bin: usize) -> Self {
        let max_bin = min_bin + counts.len().saturating_sub(1);
        Self {
            counts,
            min_bin,
            max_bin,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn min_bin(&self) -> usize {
        self.min_bin
    }

    pub fn max_bin(&self) -> usize {
        self.max_bin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;

    #[test]
    fn counts_eight_bit_samples() {
        let buf = PixelBuffer::from_u8(4, 1, vec![0, 3, 3, 255]).unwrap();
        let h = Histogram::build(&buf);
        assert_eq!(h.len(), 256);
        assert_eq!(h.counts()[3], 2);
        assert_eq!(h.counts()[255], 1);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn sixteen_bit_histogram_has_full_range() {
        let buf = PixelBuffer::from_u16(2, 1, vec![1000, 65535]).unwrap();
        let h = Histogram::build(&buf);
        assert_eq!(h.len(), 65536);
        assert_eq!(h.counts()[65535], 1);
    }

    #[test]
    fn bracket_keeps_inclusive_populated_range() {
        let mut counts = vec![0u64; 16];
        counts[4] = 2;
        counts[6] = 0;
        counts[9] = 7;
        let b = Histogram::from_counts(counts).bracket().unwrap();
        assert_eq!(b.min_bin(), 4);
        assert_eq!(b.max_bin(), 9);
        assert_eq!(b.len(), 6);
        assert_eq!(b.counts(), &[2, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn single_value_brackets_to_one_bin() {
        let buf = PixelBuffer::from_u8(3, 3, vec![42; 9]).unwrap();
        let b = Histogram::build(&buf).bracket().unwrap();
        assert_eq!((b.min_bin(), b.max_bin(), b.len()), (42, 42, 1));
    }

    #[test]
    fn clamping_can_empty_the_histogram() {
        let buf = PixelBuffer::from_u8(2, 1, vec![0, 255]).unwrap();
        let mut h = Histogram::build(&buf);
        h.clamp(HistogramOptions {
            ignore_black: true,
            ignore_white: true,
        });
        assert!(h.bracket().is_none());
    }
}
