//! Mode-seeking methods: smooth the histogram with a 3-point running mean
//! until exactly two local maxima remain.
//!
//! Prewitt & Mendelsohn (1966) "The analysis of cell images", Annals of the
//! New York Academy of Sciences 128: 1035-1053.

use super::MAX_ITERATIONS;

fn is_bimodal(y: &[f64]) -> bool {
    let mut modes = 0;
    for k in 1..y.len().saturating_sub(1) {
        if y[k - 1] < y[k] && y[k + 1] < y[k] {
            modes += 1;
            if modes > 2 {
                return false;
            }
        }
    }
    modes == 2
}

/// One pass of the running mean; values outside the histogram count as 0.
fn smooth(src: &[f64], dst: &mut [f64]) {
    let n = src.len();
    for i in 1..n - 1 {
        dst[i] = (src[i - 1] + src[i] + src[i + 1]) / 3.0;
    }
    dst[0] = (src[0] + src[1]) / 3.0;
    dst[n - 1] = (src[n - 2] + src[n - 1]) / 3.0;
}

/// Smooth until bimodal. `None` if that takes more than [`MAX_ITERATIONS`].
fn smooth_until_bimodal(data: &[u64], method: &str) -> Option<Vec<f64>> {
    let mut hist: Vec<f64> = data.iter().map(|&c| c as f64).collect();
    let mut scratch = vec![0f64; hist.len()];
    let mut iter = 0;
    while !is_bimodal(&hist) {
        smooth(&hist, &mut scratch);
        std::mem::swap(&mut hist, &mut scratch);
        iter += 1;
        if iter > MAX_ITERATIONS {
            log::debug!("{method} threshold not found after {MAX_ITERATIONS} iterations");
            return None;
        }
    }
    Some(hist)
}

/// Midpoint between the two peaks of the smoothed histogram.
pub fn intermodes(data: &[u64]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    let hist = smooth_until_bimodal(data, "Intermodes")?;
    let mut tt = 0usize;
    for i in 1..hist.len() - 1 {
        if hist[i - 1] < hist[i] && hist[i + 1] < hist[i] {
            tt += i;
        }
    }
    Some(tt / 2)
}

/// Valley between the two peaks of the smoothed histogram.
pub fn minimum(data: &[u64]) -> Option<usize> {
    if data.len() < 2 {
        return Some(0);
    }
    let max = data.iter().rposition(|&c| c > 0).unwrap_or(0);
    let hist = smooth_until_bimodal(data, "Minimum")?;
    (1..max).find(|&i| hist[i - 1] > hist[i] && hist[i + 1] >= hist[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::fixtures::bimodal;

    #[test]
    fn bimodal_test_counts_strict_maxima() {
        assert!(is_bimodal(&[0.0, 2.0, 1.0, 3.0, 0.0]));
        assert!(!is_bimodal(&[0.0, 2.0, 0.0]));
        assert!(!is_bimodal(&[0.0, 2.0, 1.0, 3.0, 1.0, 4.0, 0.0]));
    }

    #[test]
    fn intermodes_is_peak_midpoint() {
        // Already bimodal: peaks at 2 and 7.
        let h = [1, 3, 9, 3, 1, 1, 4, 8, 2, 1];
        assert_eq!(intermodes(&h), Some(4));
    }

    #[test]
    fn minimum_finds_valley() {
        let h = [1, 3, 9, 3, 1, 1, 4, 8, 2, 1];
        assert_eq!(minimum(&h), Some(4));
    }

    #[test]
    fn noisy_modes_are_smoothed() {
        let mut h = bimodal(100, 20.0, 75.0, 5.0);
        for (i, v) in h.iter_mut().enumerate() {
            if i % 3 == 0 {
                *v += 40;
            }
        }
        let t = minimum(&h).unwrap();
        assert!(t > 30 && t < 68, "t = {t}");
        let t = intermodes(&h).unwrap();
        assert!(t > 35 && t < 60, "t = {t}");
    }

    #[test]
    fn flat_histogram_never_becomes_bimodal() {
        assert_eq!(intermodes(&[5, 5]), None);
    }
}
