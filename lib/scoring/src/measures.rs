//! Diversity and correlation measures used by the built-in importance models.
//!
//! Diversity measures are in bits so numeric, categorical and boolean
//! attributes land on a comparable scale.

/// Shannon entropy (bits) of a frequency distribution.
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let counts: Vec<usize> = counts.into_iter().filter(|c| *c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .map(|c| {
            let p = *c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Entropy of numeric values after equal-width binning.
///
/// The bin count is capped at the number of finite values.
pub fn numeric_entropy(values: &[f64], bins: usize) -> f64 {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 2 || bins < 2 {
        return 0.0;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return 0.0;
    }

    let bins = bins.min(values.len());
    let mut histogram = vec![0usize; bins];
    for v in &values {
        let bin = (((v - min) / range) * bins as f64) as usize;
        histogram[bin.min(bins - 1)] += 1;
    }
    shannon_entropy(histogram)
}

/// log2 of the number of distinct categories.
pub fn categorical_diversity(distinct: usize) -> f64 {
    if distinct < 2 {
        0.0
    } else {
        (distinct as f64).log2()
    }
}

/// Binary entropy of a true/false split: 1.0 when perfectly balanced.
pub fn boolean_balance(trues: usize, falses: usize) -> f64 {
    shannon_entropy([trues, falses])
}

/// Pearson correlation coefficient, `None` when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then_some(r)
}
