//! Numeric helpers shared by derivation, metrics and charts.
//!
//! All functions ignore nothing implicitly: callers pass the non-missing
//! values they want aggregated. Functions return `None` where the statistic
//! is undefined instead of producing NaN.

use std::cmp::Ordering;

/// Arithmetic mean
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;
    if values.is_empty() {
        return None;
    }
    Some(values.mean())
}

/// Sort a copy of the values ascending with a total order
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile of already-sorted values using linear interpolation between
/// order statistics (position `q * (n - 1)`)
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Quantile of unsorted values
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Median of unsorted values
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Sample standard deviation (`n - 1` denominator)
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;
    if values.len() < 2 {
        return None;
    }
    Some(values.std_dev())
}

/// Adjusted Fisher-Pearson sample skewness
#[must_use]
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 <= 0.0 {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Ranks starting at 1 with ties sharing their average rank
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j hold equal values
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation of paired values
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    use statrs::statistics::Statistics;
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (sx, sy) = (std_dev(x)?, std_dev(y)?);
    if sx <= 0.0 || sy <= 0.0 {
        return None;
    }
    let r = x.covariance(y) / (sx * sy);
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

/// Spearman rank correlation of paired values
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Silverman's rule-of-thumb bandwidth for a Gaussian KDE
#[must_use]
pub fn silverman_bandwidth(values: &[f64]) -> Option<f64> {
    let sd = std_dev(values)?;
    let s = sorted(values);
    let iqr = quantile_sorted(&s, 0.75)? - quantile_sorted(&s, 0.25)?;
    let spread = match (sd > 0.0, iqr > 0.0) {
        (true, true) => sd.min(iqr / 1.34),
        (true, false) => sd,
        (false, true) => iqr / 1.34,
        (false, false) => return None,
    };
    Some(0.9 * spread * (values.len() as f64).powf(-0.2))
}

/// Gaussian kernel density evaluated at each grid point
#[must_use]
pub fn gaussian_kde(values: &[f64], grid: &[f64], bandwidth: f64) -> Vec<f64> {
    if values.is_empty() || bandwidth <= 0.0 {
        return vec![0.0; grid.len()];
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|&g| {
            values
                .iter()
                .map(|&v| {
                    let z = (g - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect()
}

/// Number of histogram bins for a view of `n` values
#[must_use]
pub fn histogram_bin_count(n: usize, max_bins: usize) -> usize {
    let root = (n as f64).sqrt().ceil() as usize;
    root.clamp(1, max_bins.max(1))
}

/// Equal-width bin edges and counts over `[min, max]`
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins
    pub edges: Vec<f64>,
    /// Count per bin; the last bin is closed on the right
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Lay out equal-width bins between `min` and `max`
    #[must_use]
    pub fn with_range(min: f64, max: f64, bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        Self {
            edges,
            counts: vec![0; bins],
        }
    }

    /// Build a histogram spanning the observed range of the values
    #[must_use]
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        let (min, max) = min_max(values)?;
        let mut hist = Self::with_range(min, max, bins);
        for &v in values {
            hist.add(v);
        }
        Some(hist)
    }

    /// Index of the bin a value falls into, if inside the range
    #[must_use]
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        let lo = *self.edges.first()?;
        let hi = *self.edges.last()?;
        if !(lo..=hi).contains(&value) {
            return None;
        }
        let bins = self.counts.len();
        let idx = ((value - lo) / (hi - lo) * bins as f64).floor() as usize;
        Some(idx.min(bins - 1))
    }

    /// Count one value
    pub fn add(&mut self, value: f64) {
        if let Some(idx) = self.bin_of(value) {
            self.counts[idx] += 1;
        }
    }
}

/// Minimum and maximum of the values
#[must_use]
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().min_by(f64::total_cmp)?;
    let max = values.iter().copied().max_by(f64::total_cmp)?;
    Some((min, max))
}

/// Order two `(name, value)` entries by value descending then name ascending
#[must_use]
pub fn by_value_desc_then_name(a: (&str, f64), b: (&str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Order two `(name, value)` entries by value ascending then name ascending
#[must_use]
pub fn by_value_asc_then_name(a: (&str, f64), b: (&str, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0))
}
