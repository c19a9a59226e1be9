use ndarray::{arr1, Array1, ArrayView1};

// ------------------------ helpers ------------------------
pub fn logsumexp(xs: &[f64]) -> f64 {
    let m = xs.iter().copied().fold(f64::NEG_INFINITY, |a, b| a.max(b));
    if !m.is_finite() {
        return m;
    }
    m + xs.iter().map(|x| (x - m).exp()).sum::<f64>().ln()
}

pub fn linspace(a: f64, b: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return arr1(&[a]);
    }
    let step = (b - a) / (n as f64 - 1.0);
    Array1::from((0..n).map(|i| a + step * i as f64).collect::<Vec<_>>())
}

/// Sample variance (n-1 denominator). Zero for fewer than two values.
pub fn sample_variance(xs: ArrayView1<f64>) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mean = xs.sum() / n as f64;
    xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n as f64 - 1.0)
}

/// Index of the maximum value, ties broken by the lowest index.
pub fn argmax(xs: ArrayView1<f64>) -> usize {
    let mut pos = 0;
    let mut max = f64::NEG_INFINITY;
    for (i, &x) in xs.iter().enumerate() {
        if x > max {
            max = x;
            pos = i;
        }
    }
    pos
}
