use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::model::{Column, ZipRecord};

// ---------------------------------------------------------------------------
// Per-column descriptive statistics
// ---------------------------------------------------------------------------

/// Count / mean / min / max over the non-missing values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// `None` when there are no values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| !v.is_nan()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| ColumnStats {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Mean of a column over a view, `None` if every value is missing.
pub fn mean(view: &FilteredView<'_>, column: Column) -> Option<f64> {
    ColumnStats::from_values(view.records().filter_map(|r| r.value(column))).map(|s| s.mean)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// The `n` highest composite scores; ties keep file order.
pub fn top_n(view: &FilteredView<'_>, n: usize) -> Vec<usize> {
    ranked(view, n, true)
}

/// The `n` lowest composite scores; ties keep file order.
pub fn bottom_n(view: &FilteredView<'_>, n: usize) -> Vec<usize> {
    ranked(view, n, false)
}

fn ranked(view: &FilteredView<'_>, n: usize, descending: bool) -> Vec<usize> {
    let records = &view.dataset().records;
    let mut indices: Vec<usize> = view
        .indices()
        .iter()
        .copied()
        .filter(|&i| !records[i].composite_score.is_nan())
        .collect();
    // sort_by is stable, so equal scores stay in file order.
    indices.sort_by(|&a, &b| {
        let (sa, sb) = (records[a].composite_score, records[b].composite_score);
        if descending {
            sb.total_cmp(&sa)
        } else {
            sa.total_cmp(&sb)
        }
    });
    indices.truncate(n);
    indices
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson coefficient. `None` with fewer than two points or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < 1e-12 {
        None
    } else {
        Some((cov / denominator).clamp(-1.0, 1.0))
    }
}

/// Symmetric matrix of pairwise-complete Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(view: &FilteredView<'_>, columns: &[Column]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = view
                .records()
                .filter_map(|r| Some((r.value(columns[i])?, r.value(columns[j])?)))
                .unzip();
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Distributions and groupings
// ---------------------------------------------------------------------------

/// Count per score category, most frequent first; ties by first appearance.
pub fn category_counts(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for r in view.records() {
        match counts.iter_mut().find(|(c, _)| *c == r.score_category) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.score_category.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `bins` equal-width bins spanning `[min, max]`; the last bin is closed.
    /// A constant column collapses into a single bin of width 1.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        let stats = ColumnStats::from_values(values.iter().copied())?;
        if bins == 0 {
            return None;
        }
        let span = stats.max - stats.min;
        if span <= 0.0 {
            return Some(Histogram {
                start: stats.min - 0.5,
                bin_width: 1.0,
                counts: vec![stats.count],
            });
        }

        let bin_width = span / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in values.iter().filter(|v| !v.is_nan()) {
            let idx = (((v - stats.min) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Histogram {
            start: stats.min,
            bin_width,
            counts,
        })
    }

    /// Centre of bin `i`, for plotting.
    pub fn center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histogram of one column over a view.
pub fn histogram(view: &FilteredView<'_>, column: Column, bins: usize) -> Option<Histogram> {
    let values: Vec<f64> = view.records().filter_map(|r| r.value(column)).collect();
    Histogram::from_values(&values, bins)
}

/// Mean of `column` per city, highest first, at most `limit` cities.
/// Equal means keep alphabetical city order.
pub fn city_means(view: &FilteredView<'_>, column: Column, limit: usize) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in view.records() {
        if let Some(v) = r.value(column) {
            let entry = sums.entry(r.primary_city.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    let mut means: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(city, (sum, n))| (city.to_string(), sum / n as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means.truncate(limit);
    means
}

/// Statistics for each numeric column in `columns`, in the given order.
/// Text columns are skipped; an all-blank column has `None` stats.
pub fn describe(
    view: &FilteredView<'_>,
    columns: &[Column],
) -> Vec<(Column, Option<ColumnStats>)> {
    columns
        .iter()
        .filter(|c| c.is_numeric())
        .map(|&col| {
            let stats = ColumnStats::from_values(view.records().filter_map(|r| r.value(col)));
            (col, stats)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard needs for one render
// ---------------------------------------------------------------------------

/// Aggregates over a filtered view. Indices refer to dataset rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub stats: BTreeMap<Column, ColumnStats>,
    pub top: Vec<usize>,
    pub bottom: Vec<usize>,
    pub correlations: CorrelationMatrix,
    pub category_counts: Vec<(String, usize)>,
}

impl Summary {
    pub fn mean(&self, column: Column) -> Option<f64> {
        self.stats.get(&column).map(|s| s.mean)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Compute all aggregates for a view; `top_n` sizes the ranking tables.
pub fn summarize(view: &FilteredView<'_>, top_n_size: usize) -> Summary {
    let stats = Column::numeric()
        .filter_map(|col| {
            ColumnStats::from_values(view.records().filter_map(|r: &ZipRecord| r.value(col)))
                .map(|s| (col, s))
        })
        .collect();

    Summary {
        count: view.len(),
        stats,
        top: top_n(view, top_n_size),
        bottom: bottom_n(view, top_n_size),
        correlations: correlation_matrix(view, &Column::SCORES),
        category_counts: category_counts(view),
    }
}
