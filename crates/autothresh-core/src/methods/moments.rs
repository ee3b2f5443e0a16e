//! Statistics-driven methods: mean, percentile, moment preservation, minimum
//! error and minimum cross entropy.

use super::{in_range, total, MAX_ITERATIONS};

fn mean_index(data: &[u64]) -> i64 {
    let (mut tot, mut sum) = (0f64, 0f64);
    for (i, &c) in data.iter().enumerate() {
        tot += c as f64;
        sum += i as f64 * c as f64;
    }
    (sum / tot).floor() as i64
}

/// Integer part of the mean intensity.
///
/// Glasbey C.A. (1993) "An analysis of histogram-based thresholding
/// algorithms", CVGIP: Graphical Models and Image Processing 55: 532-537.
pub fn mean(data: &[u64]) -> Option<usize> {
    in_range(mean_index(data), data.len())
}

/// Tsai's moment-preserving threshold.
///
/// The first three moments of the image are matched by a two-level image;
/// the threshold is the bin closest to the resulting object fraction.
pub fn moments(data: &[u64]) -> Option<usize> {
    let total = total(data);
    let histo: Vec<f64> = data.iter().map(|&c| c as f64 / total).collect();

    let m0 = 1.0;
    let (mut m1, mut m2, mut m3) = (0f64, 0f64, 0f64);
    for (i, &h) in histo.iter().enumerate() {
        let di = i as f64;
        m1 += di * h;
        m2 += di * di * h;
        m3 += di * di * di * h;
    }

    let cd = m0 * m2 - m1 * m1;
    let c0 = (-m2 * m2 + m1 * m3) / cd;
    let c1 = (m0 * -m3 + m2 * m1) / cd;
    let z0 = 0.5 * (-c1 - (c1 * c1 - 4.0 * c0).sqrt());
    let z1 = 0.5 * (-c1 + (c1 * c1 - 4.0 * c0).sqrt());
    // Fraction of object pixels in the target binary image.
    let p0 = (z1 - m1) / (z1 - z0);

    let mut sum = 0f64;
    for (i, &h) in histo.iter().enumerate() {
        sum += h;
        if sum > p0 {
            return Some(i);
        }
    }
    None
}

/// Bin whose cumulative fraction is closest to 50 %.
pub fn percentile(data: &[u64]) -> Option<usize> {
    const PTILE: f64 = 0.5;
    let total = total(data);
    let mut best = None;
    let mut closest = 1f64;
    let mut partial = 0f64;
    for (i, &c) in data.iter().enumerate() {
        partial += c as f64;
        let dist = (partial / total - PTILE).abs();
        if dist < closest {
            closest = dist;
            best = Some(i);
        }
    }
    best
}

/// Kittler & Illingworth's iterative minimum error thresholding, started
/// from the mean.
pub fn min_error_i(data: &[u64]) -> Option<usize> {
    let n = data.len();
    if n == 0 {
        return None;
    }
    // Prefix sums of counts, first and second moments.
    let mut a = vec![0f64; n];
    let mut b = vec![0f64; n];
    let mut c = vec![0f64; n];
    let (mut sa, mut sb, mut sc) = (0f64, 0f64, 0f64);
    for (i, &v) in data.iter().enumerate() {
        let (x, v) = (i as f64, v as f64);
        sa += v;
        sb += x * v;
        sc += x * x * v;
        a[i] = sa;
        b[i] = sb;
        c[i] = sc;
    }
    let at = |t: &[f64], j: i64| -> f64 {
        if j < 0 {
            0.0
        } else {
            t[(j as usize).min(n - 1)]
        }
    };
    let last = n as i64 - 1;

    let mut threshold = mean_index(data);
    let mut previous = -2i64;
    let mut iterations = 0;
    while threshold != previous {
        let a_t = at(&a, threshold);
        let a_n = at(&a, last);
        let b_t = at(&b, threshold);
        let b_n = at(&b, last);
        let c_t = at(&c, threshold);
        let c_n = at(&c, last);

        let mu = b_t / a_t;
        let nu = (b_n - b_t) / (a_n - a_t);
        let p = a_t / a_n;
        let q = (a_n - a_t) / a_n;
        let sigma2 = c_t / a_t - mu * mu;
        let tau2 = (c_n - c_t) / (a_n - a_t) - nu * nu;

        // Terms of the quadratic whose root is the next threshold.
        let w0 = 1.0 / sigma2 - 1.0 / tau2;
        let w1 = mu / sigma2 - nu / tau2;
        let w2 = (mu * mu) / sigma2 - (nu * nu) / tau2
            + ((sigma2 * (q * q)) / (tau2 * (p * p))).log10();

        let sqterm = w1 * w1 - w0 * w2;
        if sqterm < 0.0 {
            log::debug!("MinErrorI not converging: imaginary root");
            break;
        }

        previous = threshold;
        let next = (w1 + sqterm.sqrt()) / w0;
        if next.is_nan() {
            log::debug!("MinErrorI not converging: NaN root");
        } else {
            threshold = next.floor() as i64;
        }

        iterations += 1;
        if iterations > MAX_ITERATIONS {
            break;
        }
    }
    in_range(threshold, n)
}

/// Li's iterative minimum cross entropy.
///
/// Li C.H. and Tam P.K.S. (1998) "An Iterative Algorithm for Minimum Cross
/// Entropy Thresholding", Pattern Recognition Letters 18(8): 771-776.
pub fn li(data: &[u64]) -> Option<usize> {
    const TOLERANCE: f64 = 0.5;
    let n = data.len();
    let num_pixels = total(data);
    if n == 0 || num_pixels == 0.0 {
        return None;
    }

    let mut mean = 0f64;
    for (ih, &c) in data.iter().enumerate().skip(1) {
        mean += ih as f64 * c as f64;
    }
    mean /= num_pixels;

    let class_mean = |range: std::ops::Range<usize>| -> f64 {
        let (mut sum, mut num) = (0f64, 0f64);
        for ih in range {
            sum += ih as f64 * data[ih] as f64;
            num += data[ih] as f64;
        }
        if num == 0.0 {
            0.0
        } else {
            sum / num
        }
    };

    let mut new_thresh = mean;
    let mut threshold;
    let mut iterations = 0;
    loop {
        let old_thresh = new_thresh;
        threshold = (old_thresh + 0.5) as i64;
        let split = (threshold + 1).clamp(0, n as i64) as usize;
        let mean_back = class_mean(0..split);
        let mean_obj = class_mean(split..n);

        let temp = (mean_back - mean_obj) / (mean_back.ln() - mean_obj.ln());
        new_thresh = if temp < -f64::EPSILON {
            (temp - 0.5) as i64 as f64
        } else {
            (temp + 0.5) as i64 as f64
        };

        iterations += 1;
        if (new_thresh - old_thresh).abs() <= TOLERANCE || iterations > MAX_ITERATIONS {
            break;
        }
    }
    in_range(threshold, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::fixtures::bimodal;

    #[test]
    fn mean_floors() {
        // mean = (0*1 + 1*1 + 2*2) / 4 = 1.25
        assert_eq!(mean(&[1, 1, 2]), Some(1));
    }

    #[test]
    fn percentile_is_the_median_bin() {
        assert_eq!(percentile(&[10, 10, 10, 10]), Some(1));
        // Closest to one half wins even when the median sits further right.
        assert_eq!(percentile(&[1, 1, 1, 97]), Some(2));
    }

    #[test]
    fn moments_preserve_object_fraction() {
        let h = bimodal(200, 50.0, 140.0, 10.0);
        let t = moments(&h).unwrap();
        assert!(t > 60 && t < 140, "t = {t}");
    }

    #[test]
    fn min_error_splits_modes() {
        let h = bimodal(200, 50.0, 140.0, 10.0);
        let t = min_error_i(&h).unwrap();
        assert!(t > 65 && t < 125, "t = {t}");
    }

    #[test]
    fn li_splits_modes() {
        let h = bimodal(200, 50.0, 140.0, 10.0);
        let t = li(&h).unwrap();
        assert!(t > 65 && t < 125, "t = {t}");
    }
}
