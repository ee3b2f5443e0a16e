use super::in_range;

/// Zack's triangle method.
///
/// Draws a line from the histogram peak to the far end of the longer tail
/// and picks the bin furthest below it, shifted one bin towards the peak.
///
/// Zack G.W., Rogers W.E. and Latt S.A. (1977) "Automatic Measurement of
/// Sister Chromatid Exchange Frequency", J. Histochem. Cytochem. 25(7): 741-753.
pub fn triangle(data: &[u64]) -> Option<usize> {
    let n = data.len();
    if n == 0 {
        return None;
    }

    // One bin below the first populated bin, one above the last.
    let mut min = data.iter().position(|&c| c > 0).unwrap_or(0);
    if min > 0 {
        min -= 1;
    }
    let mut min2 = data.iter().rposition(|&c| c > 0).unwrap_or(0);
    if min2 < n - 1 {
        min2 += 1;
    }
    let mut max = 0;
    let mut dmax = 0u64;
    for (i, &c) in data.iter().enumerate() {
        if c > dmax {
            max = i;
            dmax = c;
        }
    }

    // Work on the longer side; mirror when it is to the right of the peak.
    let inverted = (max as i64 - min as i64) < (min2 as i64 - max as i64);
    let mut d: Vec<f64> = data.iter().map(|&c| c as f64).collect();
    if inverted {
        d.reverse();
        min = n - 1 - min2;
        max = n - 1 - max;
    }

    if min == max {
        return Some(min);
    }

    let mut nx = d[max];
    let mut ny = min as f64 - max as f64;
    let norm = (nx * nx + ny * ny).sqrt();
    nx /= norm;
    ny /= norm;
    let dd = nx * min as f64 + ny * d[min];

    let mut split = min as i64;
    let mut split_distance = 0f64;
    for (i, &v) in d.iter().enumerate().take(max + 1).skip(min + 1) {
        let dist = nx * i as f64 + ny * v - dd;
        if dist > split_distance {
            split = i as i64;
            split_distance = dist;
        }
    }
    split -= 1;

    if inverted {
        split = n as i64 - 1 - split;
    }
    in_range(split, n)
}
