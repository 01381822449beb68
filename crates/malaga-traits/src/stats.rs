//! Statistical utility functions shared by the table and evaluation crates.
//!
//! All helpers ignore nothing implicitly: callers decide which values are
//! valid and pass only those. Degenerate inputs yield `NaN` rather than an
//! error, matching how undefined statistics are reported in output tables.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-12;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator). `NaN` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Keeps only finite values.
pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Ratio that is `NaN` when the denominator is zero or not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator.abs() < MIN_STD_THRESHOLD {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// 1-based ranks with ties sharing their average rank.
///
/// `[3.0, 1.0, 3.0]` ranks as `[2.5, 1.0, 2.5]`.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share rank (i+1 + j+1) / 2
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation of two equally long slices.
///
/// `NaN` when lengths differ, fewer than two pairs are given, or either side
/// has zero variance. Variance is judged relative to the sum of squares, so
/// the result does not depend on the units of either side.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut sum_x_sq = 0.0;
    let mut sum_y_sq = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
        sum_x_sq += a * a;
        sum_y_sq += b * b;
    }

    // rounding leaves constant inputs with a residual of order EPSILON^2
    if var_x <= f64::EPSILON * sum_x_sq || var_y <= f64::EPSILON * sum_y_sq {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Spearman rank correlation: Pearson correlation of average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}
