/// Otsu's method: maximize the between-class variance.
///
/// Uses the cumulative normalized histogram formulation (Celebi), so ties and
/// empty-class bins (`0/0`) behave as in the ImageJ implementation: a NaN
/// variance never wins.
pub fn otsu(data: &[u64]) -> Option<usize> {
    let n = data.len();
    let num_pixels = super::total(data);
    if n == 0 || num_pixels == 0.0 {
        return None;
    }
    let term = 1.0 / num_pixels;

    let histo: Vec<f64> = data.iter().map(|&c| term * c as f64).collect();
    let mut cnh = vec![0f64; n];
    let mut mean = vec![0f64; n];
    cnh[0] = histo[0];
    for ih in 1..n {
        cnh[ih] = cnh[ih - 1] + histo[ih];
        mean[ih] = mean[ih - 1] + ih as f64 * histo[ih];
    }
    let total_mean = mean[n - 1];

    let mut best = None;
    let mut max_bcv = 0f64;
    for ih in 0..n {
        let mut bcv = total_mean * cnh[ih] - mean[ih];
        bcv *= bcv / (cnh[ih] * (1.0 - cnh[ih]));
        if max_bcv < bcv {
            max_bcv = bcv;
            best = Some(ih);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::fixtures::bimodal;

    #[test]
    fn splits_two_modes() {
        let h = bimodal(200, 40.0, 150.0, 10.0);
        let t = otsu(&h).unwrap();
        assert!(t > 60 && t < 130, "t = {t}");
    }

    #[test]
    fn two_bins_split_between_them() {
        assert_eq!(otsu(&[5, 5]), Some(0));
    }

    #[test]
    fn uniform_run_splits_in_the_middle() {
        assert_eq!(otsu(&[100; 128]), Some(63));
    }
}
