//! Descriptive statistics used by the reports.

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Median of the data.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Percentile by linear interpolation between closest ranks.
///
/// `p` is in [0, 100].
pub fn percentile(data: &[f64], p: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let k = (sorted.len() - 1) as f64 * p / 100.0;
    let f = k.floor() as usize;
    let c = f + 1;
    if c >= sorted.len() {
        return Some(sorted[sorted.len() - 1]);
    }
    Some(sorted[f] + (k - f as f64) * (sorted[c] - sorted[f]))
}

/// Exclusive-method quartiles (Q1, Q2, Q3). Needs at least two points.
pub fn quartiles(data: &[f64]) -> Option<[f64; 3]> {
    let ld = data.len();
    if ld < 2 {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let m = ld + 1;
    let mut out = [0.0; 3];
    for (idx, i) in (1..=3usize).enumerate() {
        let j = (i * m) / 4;
        let delta = (i * m) % 4;
        let j = j.clamp(1, ld - 1);
        out[idx] = (sorted[j - 1] * (4 - delta) as f64 + sorted[j] * delta as f64) / 4.0;
    }
    Some(out)
}

/// Median of integer samples, as f64.
pub fn median_i64(data: &[i64]) -> Option<f64> {
    let as_f64: Vec<f64> = data.iter().map(|v| *v as f64).collect();
    median(&as_f64)
}

/// Sample standard deviation. Needs at least two points.
pub fn stdev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m) * (x - m)).sum();
    Some((ss / (data.len() - 1) as f64).sqrt())
}

/// Population standard deviation, used for the coefficient of variation.
pub fn stdev_population(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m) * (x - m)).sum();
    Some((ss / data.len() as f64).sqrt())
}

/// Pearson correlation coefficient.
///
/// None when either series is constant or the lengths differ.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx) * (a - mx);
        vy += (b - my) * (b - my);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx * vy).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_median() {
        assert_eq!(mean(&[]), None);
        assert!(close(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0));
        assert!(close(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0));
        assert!(close(median(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5));
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert!(close(percentile(&data, 0.0).unwrap(), 1.0));
        assert!(close(percentile(&data, 50.0).unwrap(), 2.5));
        assert!(close(percentile(&data, 95.0).unwrap(), 3.85));
        assert!(close(percentile(&data, 100.0).unwrap(), 4.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_quartiles_exclusive() {
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(close(q[0], 1.25));
        assert!(close(q[1], 2.5));
        assert!(close(q[2], 3.75));
        assert_eq!(quartiles(&[1.0]), None);
    }

    #[test]
    fn test_stdev() {
        assert!(close(stdev(&[1.0, 2.0, 3.0, 4.0]).unwrap(), (5.0f64 / 3.0).sqrt()));
        assert_eq!(stdev(&[1.0]), None);
        assert!(close(stdev_population(&[2.0, 4.0]).unwrap(), 1.0));
    }

    #[test]
    fn test_pearson() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!(close(pearson(&x, &up).unwrap(), 1.0));
        assert!(close(pearson(&x, &down).unwrap(), -1.0));
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&x, &[1.0]), None);
    }
}
