//! Entropy-based methods: Kapur's maximum entropy, Renyi's entropy
//! combination, Shanbhag's fuzzy entropy and Yen's maximum correlation.

use super::total;

/// Java `Double.MIN_VALUE`, the starting maximum for the entropy scans.
const MIN_POSITIVE: f64 = 5e-324;
const EPSILON: f64 = f64::EPSILON;

/// Normalized histogram with its cumulative sums.
struct Cumulative {
    norm: Vec<f64>,
    /// Probability of the background class `[0, it]`.
    p1: Vec<f64>,
    /// Probability of the object class `(it, n)`.
    p2: Vec<f64>,
}

impl Cumulative {
    fn new(data: &[u64]) -> Option<Self> {
        let n = data.len();
        let total = total(data);
        if n == 0 || total == 0.0 {
            return None;
        }
        let norm: Vec<f64> = data.iter().map(|&c| c as f64 / total).collect();
        let mut p1 = vec![0f64; n];
        let mut p2 = vec![0f64; n];
        p1[0] = norm[0];
        p2[0] = 1.0 - p1[0];
        for ih in 1..n {
            p1[ih] = p1[ih - 1] + norm[ih];
            p2[ih] = 1.0 - p1[ih];
        }
        Some(Self { norm, p1, p2 })
    }

    fn len(&self) -> usize {
        self.norm.len()
    }

    /// First bin with a non-negligible background probability.
    fn first_bin(&self) -> usize {
        self.p1
            .iter()
            .position(|p| p.abs() >= EPSILON)
            .unwrap_or(0)
    }

    /// Last bin at or after `first` with a non-negligible object
    /// probability; the top bin when there is none.
    fn last_bin(&self, first: usize) -> usize {
        (first..self.len())
            .rev()
            .find(|&ih| self.p2[ih].abs() >= EPSILON)
            .unwrap_or(self.len() - 1)
    }

    fn bounds(&self) -> (usize, usize) {
        let first = self.first_bin();
        (first, self.last_bin(first))
    }

    /// Kapur's entropy scan over `[first, last]`. `None` when no bin beats
    /// `init`.
    fn kapur(&self, first: usize, last: usize, init: f64) -> Option<usize> {
        let mut threshold = None;
        let mut max_ent = init;
        for it in first..=last {
            let mut ent_back = 0f64;
            for ih in 0..=it {
                if self.norm[ih] != 0.0 {
                    let r = self.norm[ih] / self.p1[it];
                    ent_back -= r * r.ln();
                }
            }
            let mut ent_obj = 0f64;
            for ih in it + 1..self.len() {
                if self.norm[ih] != 0.0 {
                    let r = self.norm[ih] / self.p2[it];
                    ent_obj -= r * r.ln();
                }
            }
            let tot_ent = ent_back + ent_obj;
            if max_ent < tot_ent {
                max_ent = tot_ent;
                threshold = Some(it);
            }
        }
        threshold
    }

    /// Renyi entropy of order `alpha` scanned over `[first, last]`.
    fn renyi(&self, first: usize, last: usize, alpha: f64) -> usize {
        let term = 1.0 / (1.0 - alpha);
        let mut threshold = 0;
        let mut max_ent = 0f64;
        for it in first..=last {
            let mut ent_back = 0f64;
            for ih in 0..=it {
                ent_back += moment(self.norm[ih], self.p1[it], alpha);
            }
            let mut ent_obj = 0f64;
            for ih in it + 1..self.len() {
                ent_obj += moment(self.norm[ih], self.p2[it], alpha);
            }
            let mut tot_ent = 0f64;
            if ent_back * ent_obj > 0.0 {
                tot_ent = term * (ent_back * ent_obj).ln();
            }
            if tot_ent > max_ent {
                max_ent = tot_ent;
                threshold = it;
            }
        }
        threshold
    }
}

fn moment(norm: f64, class: f64, alpha: f64) -> f64 {
    if alpha == 0.5 {
        (norm / class).sqrt()
    } else {
        (norm * norm) / (class * class)
    }
}

/// Kapur, Sahoo & Wong's maximum entropy.
///
/// Kapur J.N., Sahoo P.K., and Wong A.K.C. (1985) "A New Method for
/// Gray-Level Picture Thresholding Using the Entropy of the Histogram",
/// Graphical Models and Image Processing 29(3): 273-285.
pub fn max_entropy(data: &[u64]) -> Option<usize> {
    let cum = Cumulative::new(data)?;
    let (first, last) = cum.bounds();
    cum.kapur(first, last, MIN_POSITIVE)
}

/// Kapur, Sahoo & Wong's Renyi-entropy combination of three thresholds
/// (orders 0.5, 1 and 2).
pub fn renyi_entropy(data: &[u64]) -> Option<usize> {
    let cum = Cumulative::new(data)?;
    let (first, last) = cum.bounds();

    // Order 1 is plain Kapur, which this scan starts from bin zero.
    let t_star2 = cum.kapur(first, last, 0.0).unwrap_or(0);
    let t_star1 = cum.renyi(first, last, 0.5);
    let t_star3 = cum.renyi(first, last, 2.0);

    let mut stars = [t_star1, t_star2, t_star3];
    stars.sort_unstable();
    let [t1, t2, t3] = stars;

    let close = |a: usize, b: usize| a.abs_diff(b) <= 5;
    let (b1, b2, b3) = if close(t1, t2) {
        if close(t2, t3) {
            (1.0, 2.0, 1.0)
        } else {
            (0.0, 1.0, 3.0)
        }
    } else if close(t2, t3) {
        (3.0, 1.0, 0.0)
    } else {
        (1.0, 2.0, 1.0)
    };

    let omega = cum.p1[t3] - cum.p1[t1];
    let opt = t1 as f64 * (cum.p1[t1] + 0.25 * omega * b1)
        + 0.25 * t2 as f64 * omega * b2
        + t3 as f64 * (cum.p2[t3] + 0.25 * omega * b3);
    super::in_range(opt as i64, cum.len())
}

/// Shanbhag's fuzzy-membership entropy balance.
///
/// Shanbhag A.G. (1994) "Utilization of Information Measure as a Means of
/// Image Thresholding", Graphical Models and Image Processing 56(5): 414-419.
pub fn shanbhag(data: &[u64]) -> Option<usize> {
    let cum = Cumulative::new(data)?;
    let (first, last) = cum.bounds();

    let mut threshold = None;
    let mut min_ent = f64::MAX;
    for it in first..=last {
        let mut ent_back = 0f64;
        let term = 0.5 / cum.p1[it];
        for ih in 1..=it {
            ent_back -= cum.norm[ih] * (1.0 - term * cum.p1[ih - 1]).ln();
        }
        ent_back *= term;

        let mut ent_obj = 0f64;
        let term = 0.5 / cum.p2[it];
        for ih in it + 1..cum.len() {
            ent_obj -= cum.norm[ih] * (1.0 - term * cum.p2[ih]).ln();
        }
        ent_obj *= term;

        let tot_ent = (ent_back - ent_obj).abs();
        if tot_ent < min_ent {
            min_ent = tot_ent;
            threshold = Some(it);
        }
    }
    threshold
}

/// Yen's maximum correlation criterion.
///
/// Yen J.C., Chang F.J., and Chang S. (1995) "A New Criterion for Automatic
/// Multilevel Thresholding", IEEE Trans. on Image Processing 4(3): 370-378.
pub fn yen(data: &[u64]) -> Option<usize> {
    let cum = Cumulative::new(data)?;
    let n = cum.len();

    let mut p1_sq = vec![0f64; n];
    p1_sq[0] = cum.norm[0] * cum.norm[0];
    for ih in 1..n {
        p1_sq[ih] = p1_sq[ih - 1] + cum.norm[ih] * cum.norm[ih];
    }
    let mut p2_sq = vec![0f64; n];
    for ih in (0..n - 1).rev() {
        p2_sq[ih] = p2_sq[ih + 1] + cum.norm[ih + 1] * cum.norm[ih + 1];
    }

    let mut threshold = None;
    let mut max_crit = MIN_POSITIVE;
    for it in 0..n {
        let corr = p1_sq[it] * p2_sq[it];
        let spread = cum.p1[it] * (1.0 - cum.p1[it]);
        let crit = -(if corr > 0.0 { corr.ln() } else { 0.0 })
            + 2.0 * (if spread > 0.0 { spread.ln() } else { 0.0 });
        if crit > max_crit {
            max_crit = crit;
            threshold = Some(it);
        }
    }
    threshold
}
