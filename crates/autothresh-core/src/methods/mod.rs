//! Histogram threshold algorithms.
//!
//! Every function takes bracketed counts (index 0 is the lowest populated
//! intensity) and returns a 0-based bin index into them, or `None` when the
//! histogram cannot be split. Results follow the ImageJ auto-threshold family
//! bin for bin.

mod entropy;
mod fuzzy;
mod isodata;
mod modes;
mod moments;
mod otsu;
mod triangle;

pub use entropy::{max_entropy, renyi_entropy, shanbhag, yen};
pub use fuzzy::{huang, huang2};
pub use isodata::{ij_default, iso_data};
pub use modes::{intermodes, minimum};
pub use moments::{li, mean, min_error_i, moments, percentile};
pub use otsu::otsu;
pub use triangle::triangle;

/// Cap for the iterative searches (smoothing, Li, MinErrorI).
pub(crate) const MAX_ITERATIONS: usize = 10_000;

/// `Math.round` semantics: ties go up.
#[inline]
pub(crate) fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

#[inline]
pub(crate) fn in_range(t: i64, n: usize) -> Option<usize> {
    if t >= 0 && (t as usize) < n {
        Some(t as usize)
    } else {
        None
    }
}

#[inline]
pub(crate) fn total(data: &[u64]) -> f64 {
    data.iter().sum::<u64>() as f64
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two well separated gaussian-ish modes over `n` bins.
    pub fn bimodal(n: usize, lo: f64, hi: f64, spread: f64) -> Vec<u64> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                let a = (-(x - lo).powi(2) / (2.0 * spread * spread)).exp();
                let b = (-(x - hi).powi(2) / (2.0 * spread * spread)).exp();
                (1000.0 * a + 600.0 * b).round() as u64 + 1
            })
            .collect()
    }
}
