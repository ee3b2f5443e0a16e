//! Huang's fuzzy thresholding: minimize the fuzziness (Shannon entropy of the
//! membership function) of the two-class partition.
//!
//! Huang L.-K. and Wang M.-J.J. (1995) "Image Thresholding by Minimizing the
//! Measures of Fuzziness", Pattern Recognition 28(1): 41-51.

use super::round_half_up;

#[inline]
fn shannon(mu: f64) -> f64 {
    -mu * mu.ln() - (1.0 - mu) * (1.0 - mu).ln()
}

/// Direct evaluation, quadratic in the number of bins.
pub fn huang(data: &[u64]) -> Option<usize> {
    let n = data.len();
    if n == 0 {
        return None;
    }
    let first_bin = data.iter().position(|&c| c != 0).unwrap_or(0);
    let last_bin = (first_bin..n)
        .rev()
        .find(|&i| data[i] != 0)
        .unwrap_or(n - 1);
    let term = 1.0 / (last_bin - first_bin) as f64;

    // Mean of the background for every candidate threshold.
    let mut mu_0 = vec![0f64; n];
    let (mut sum_pix, mut num_pix) = (0f64, 0f64);
    for ih in first_bin..n {
        sum_pix += ih as f64 * data[ih] as f64;
        num_pix += data[ih] as f64;
        mu_0[ih] = sum_pix / num_pix;
    }

    // Mean of the object for every candidate threshold.
    let mut mu_1 = vec![0f64; n];
    let (mut sum_pix, mut num_pix) = (0f64, 0f64);
    for ih in (1..=last_bin).rev() {
        sum_pix += ih as f64 * data[ih] as f64;
        num_pix += data[ih] as f64;
        mu_1[ih - 1] = sum_pix / num_pix;
    }

    let membership_entropy = |ih: usize, mean: f64| -> f64 {
        let mu_x = 1.0 / (1.0 + term * (ih as f64 - mean).abs());
        if mu_x < 1e-06 || mu_x > 0.999999 {
            0.0
        } else {
            data[ih] as f64 * shannon(mu_x)
        }
    };

    let mut threshold = None;
    let mut min_ent = f64::MAX;
    for it in 0..n {
        let mut ent = 0f64;
        for ih in 0..=it {
            ent += membership_entropy(ih, mu_0[it]);
        }
        for ih in it + 1..n {
            ent += membership_entropy(ih, mu_1[it]);
        }
        if ent < min_ent {
            min_ent = ent;
            threshold = Some(it);
        }
    }
    threshold
}

/// Same criterion evaluated with cumulative sums and a precomputed entropy
/// table indexed by `|x - mu|`; handles 16-bit histograms efficiently.
pub fn huang2(data: &[u64]) -> Option<usize> {
    let n = data.len();
    let first = data.iter().position(|&c| c != 0)?;
    let mut last = n - 1;
    while last > first && data[last] == 0 {
        last -= 1;
    }
    if first == last {
        return Some(0);
    }

    // Cumulative counts and cumulative intensity-weighted counts.
    let mut s = vec![0f64; last + 1];
    let mut w = vec![0f64; last + 1];
    s[0] = data[0] as f64;
    for i in first.max(1)..=last {
        s[i] = s[i - 1] + data[i] as f64;
        w[i] = w[i - 1] + i as f64 * data[i] as f64;
    }

    let c = (last - first) as f64;
    let mut smu = vec![0f64; last + 1 - first];
    for (i, v) in smu.iter_mut().enumerate().skip(1) {
        let mu = 1.0 / (1.0 + i as f64 / c);
        *v = shannon(mu);
    }

    let mut best_threshold = 0usize;
    let mut best_entropy = f64::MAX;
    for threshold in first..=last {
        let mut entropy = 0f64;
        let mu = round_half_up(w[threshold] / s[threshold]);
        for i in first..=threshold {
            entropy += smu[(i as i64 - mu).unsigned_abs() as usize] * data[i] as f64;
        }
        let mu = round_half_up((w[last] - w[threshold]) / (s[last] - s[threshold]));
        for i in threshold + 1..=last {
            entropy += smu[(i as i64 - mu).unsigned_abs() as usize] * data[i] as f64;
        }
        if best_entropy > entropy {
            best_entropy = entropy;
            best_threshold = threshold;
        }
    }
    Some(best_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::fixtures::bimodal;

    #[test]
    fn huang_lands_between_modes() {
        let h = bimodal(120, 25.0, 90.0, 6.0);
        let t = huang(&h).unwrap();
        assert!(t > 35 && t < 80, "t = {t}");
    }

    #[test]
    fn huang2_lands_between_modes() {
        let h = bimodal(120, 25.0, 90.0, 6.0);
        let t = huang2(&h).unwrap();
        assert!(t > 35 && t < 80, "t = {t}");
    }

    #[test]
    fn huang2_single_bin_is_zero() {
        assert_eq!(huang2(&[7]), Some(0));
    }
}
