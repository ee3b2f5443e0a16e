//! Iterative intermeans (IsoData) variants.

use super::{in_range, round_half_up};

/// ImageJ's "Default" method, a modified IsoData.
///
/// The two extreme bins are excluded from the statistics. The moving split
/// advances until it passes the midpoint of the two class means.
pub fn ij_default(data: &[u64]) -> Option<usize> {
    let n = data.len();
    if n == 0 {
        return None;
    }
    let max_value = n - 1;
    let mut d = data.to_vec();
    d[0] = 0;
    d[max_value] = 0;

    let mut min = 0;
    while d[min] == 0 && min < max_value {
        min += 1;
    }
    let mut max = max_value;
    while d[max] == 0 && max > 0 {
        max -= 1;
    }
    if min >= max {
        return Some(n / 2);
    }

    // Prefix sums; the per-iteration partial sums are exact integers, so this
    // gives the same values as re-summing every step.
    let mut count = vec![0f64; n + 1];
    let mut weighted = vec![0f64; n + 1];
    for (i, &c) in d.iter().enumerate() {
        count[i + 1] = count[i] + c as f64;
        weighted[i + 1] = weighted[i] + i as f64 * c as f64;
    }
    let range = |lo: usize, hi: usize| -> (f64, f64) {
        (weighted[hi + 1] - weighted[lo], count[hi + 1] - count[lo])
    };

    let mut moving = min;
    let result = loop {
        let (sum1, sum2) = range(min, moving);
        let (sum3, sum4) = range(moving + 1, max);
        let result = (sum1 / sum2 + sum3 / sum4) / 2.0;
        moving += 1;
        if !((moving + 1) as f64 <= result && moving + 1 < max) {
            break result;
        }
    };
    in_range(round_half_up(result), n)
}

/// Ridler & Calvard's IsoData (intermeans), integer class means.
pub fn iso_data(data: &[u64]) -> Option<usize> {
    let n = data.len();
    if n < 3 {
        return None;
    }
    let mut g = 0usize;
    for (i, &c) in data.iter().enumerate().skip(1) {
        if c > 0 {
            g = i + 1;
            break;
        }
    }
    loop {
        let lower = &data[..(g + 1).min(n)];
        let (mut l, mut totl) = (0u64, 0u64);
        for (i, &c) in lower.iter().enumerate() {
            totl += c;
            l += c * i as u64;
        }
        let (mut h, mut toth) = (0u64, 0u64);
        for (i, &c) in data.iter().enumerate().skip(g + 1) {
            toth += c;
            h += c * i as u64;
        }
        if totl > 0 && toth > 0 {
            l /= totl;
            h /= toth;
            if g as i64 == round_half_up((l + h) as f64 / 2.0) {
                break;
            }
        }
        g += 1;
        if g > n - 2 {
            log::debug!("IsoData threshold not found");
            return None;
        }
    }
    Some(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::fixtures::bimodal;

    #[test]
    fn ij_default_splits_modes() {
        let h = bimodal(256, 50.0, 200.0, 12.0);
        let t = ij_default(&h).unwrap();
        assert!(t > 90 && t < 170, "t = {t}");
    }

    #[test]
    fn ij_default_ignores_extreme_bins() {
        // Only the end bins are populated: nothing left after exclusion.
        assert_eq!(ij_default(&[10, 0, 0, 0, 10]), Some(2));
    }

    #[test]
    fn iso_data_converges_between_modes() {
        let h = bimodal(256, 50.0, 200.0, 12.0);
        let t = iso_data(&h).unwrap();
        assert!(t > 90 && t < 170, "t = {t}");
    }

    #[test]
    fn iso_data_gives_up_on_two_bins() {
        assert_eq!(iso_data(&[3, 4]), None);
    }
}
