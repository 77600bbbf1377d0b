use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{ZipDataset, ZipRecord};

// ---------------------------------------------------------------------------
// Score range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Minimum score {min} is greater than maximum score {max}")]
    InvertedRange { min: f64, max: f64 },
}

/// Inclusive `[min, max]` bounds on the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    min: f64,
    max: f64,
}

impl ScoreRange {
    /// Rejects `min > max` so the active range is always well formed.
    pub fn new(min: f64, max: f64) -> Result<Self, FilterError> {
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(ScoreRange { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// NaN is never contained.
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}

// ---------------------------------------------------------------------------
// Filter criteria: which categories / cities / scores are selected
// ---------------------------------------------------------------------------

/// User-selected constraints. A `None` field is inactive and passes every record.
/// An active but empty set passes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub categories: Option<BTreeSet<String>>,
    pub cities: Option<BTreeSet<String>>,
    pub score_range: Option<ScoreRange>,
}

impl FilterCriteria {
    /// Whether any constraint is active.
    pub fn is_active(&self) -> bool {
        self.categories.is_some() || self.cities.is_some() || self.score_range.is_some()
    }

    /// Conjunction of all active constraints.
    pub fn matches(&self, record: &ZipRecord) -> bool {
        if let Some(selected) = &self.categories {
            if !selected.contains(&record.score_category) {
                return false;
            }
        }
        if let Some(selected) = &self.cities {
            if !selected.contains(&record.primary_city) {
                return false;
            }
        }
        if let Some(range) = &self.score_range {
            if !range.contains(record.composite_score) {
                return false;
            }
        }
        true
    }
}

/// Return indices of records that pass all active filters, in file order.
pub fn filtered_indices(records: &[ZipRecord], criteria: &FilterCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Case-insensitive substring match on zip code, city or category.
/// An empty (or whitespace) term matches everything.
pub fn matches_search(record: &ZipRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        &record.zip_code,
        &record.primary_city,
        &record.score_category,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

// ---------------------------------------------------------------------------
// FilteredView – the records passing the current criteria
// ---------------------------------------------------------------------------

/// A borrowed subset of a dataset, in original row order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a ZipDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Run the filter over the whole dataset.
    pub fn new(dataset: &'a ZipDataset, criteria: &FilterCriteria) -> Self {
        FilteredView {
            dataset,
            indices: filtered_indices(&dataset.records, criteria),
        }
    }

    /// Wrap an index list computed earlier (e.g. cached in the app state).
    pub fn from_indices(dataset: &'a ZipDataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    /// Narrow the view further by a free-text search term.
    pub fn search(&self, term: &str) -> FilteredView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| matches_search(&self.dataset.records[i], term))
            .collect();
        FilteredView {
            dataset: self.dataset,
            indices,
        }
    }

    pub fn dataset(&self) -> &'a ZipDataset {
        self.dataset
    }

    /// Dataset row indices of the view.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'a ZipRecord> {
        let dataset = self.dataset;
        self.indices.get(position).map(|&i| &dataset.records[i])
    }

    pub fn records(&self) -> impl Iterator<Item = &'a ZipRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    /// Owned copy of the rows, e.g. to build a new dataset from the view.
    pub fn to_records(&self) -> Vec<ZipRecord> {
        self.records().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn set(values: &[&str]) -> Option<BTreeSet<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    fn two_zips() -> ZipDataset {
        ZipDataset::from_records(vec![
            record("Z1", "A", "Medium", 50.0),
            record("Z2", "B", "High", 80.0),
        ])
    }

    fn sample() -> ZipDataset {
        ZipDataset::from_records(vec![
            record("90001", "Los Angeles", "Low", 35.0),
            record("90210", "Beverly Hills", "Very High", 92.0),
            record("90012", "Los Angeles", "High", 71.0),
            record("91101", "Pasadena", "High", 68.5),
            record("90731", "San Pedro", "Medium", f64::NAN),
            record("90802", "Long Beach", "Medium", 55.0),
        ])
    }

    fn all_criteria(ds: &ZipDataset) -> Vec<FilterCriteria> {
        vec![
            FilterCriteria::default(),
            FilterCriteria {
                categories: set(&["High"]),
                ..Default::default()
            },
            FilterCriteria {
                cities: set(&["Los Angeles", "Pasadena"]),
                ..Default::default()
            },
            FilterCriteria {
                categories: set(&[]),
                ..Default::default()
            },
            FilterCriteria {
                score_range: ScoreRange::new(50.0, 75.0).ok(),
                ..Default::default()
            },
            FilterCriteria {
                categories: Some(ds.categories.clone()),
                cities: set(&["Los Angeles"]),
                score_range: ScoreRange::new(0.0, 50.0).ok(),
            },
        ]
    }

    #[test]
    fn worked_example() {
        let ds = two_zips();
        let zips = |c: &FilterCriteria| {
            FilteredView::new(&ds, c)
                .records()
                .map(|r| r.zip_code.clone())
                .collect::<Vec<_>>()
        };

        let by_city = FilterCriteria {
            cities: set(&["A"]),
            ..Default::default()
        };
        assert_eq!(zips(&by_city), vec!["Z1"]);

        let by_score = FilterCriteria {
            score_range: ScoreRange::new(60.0, 100.0).ok(),
            ..Default::default()
        };
        assert_eq!(zips(&by_score), vec!["Z2"]);

        let both = FilterCriteria {
            cities: set(&["A"]),
            score_range: ScoreRange::new(60.0, 100.0).ok(),
            ..Default::default()
        };
        assert!(zips(&both).is_empty());
    }

    #[test]
    fn no_constraints_returns_everything() {
        let ds = sample();
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_active());
        let view = FilteredView::new(&ds, &criteria);
        assert_eq!(view.indices(), (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn view_is_subset_in_order() {
        let ds = sample();
        for criteria in all_criteria(&ds) {
            let view = FilteredView::new(&ds, &criteria);
            assert!(view.len() <= ds.len());
            assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
            for &i in view.indices() {
                assert!(i < ds.len());
                assert!(criteria.matches(&ds.records[i]));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample();
        for criteria in all_criteria(&ds) {
            let once = FilteredView::new(&ds, &criteria).to_records();
            let reloaded = ZipDataset::from_records(once.clone());
            let twice = FilteredView::new(&reloaded, &criteria).to_records();
            assert_eq!(once.len(), twice.len());
            let zips = |rs: &[ZipRecord]| rs.iter().map(|r| r.zip_code.clone()).collect::<Vec<_>>();
            assert_eq!(zips(&once), zips(&twice));
        }
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = sample();
        let criteria = FilterCriteria {
            cities: set(&[]),
            ..Default::default()
        };
        assert!(FilteredView::new(&ds, &criteria).is_empty());
    }

    #[test]
    fn range_is_inclusive_and_excludes_nan() {
        let ds = sample();
        let criteria = FilterCriteria {
            score_range: ScoreRange::new(35.0, 92.0).ok(),
            ..Default::default()
        };
        let view = FilteredView::new(&ds, &criteria);
        assert_eq!(view.len(), 5);
        assert!(view.records().all(|r| r.zip_code != "90731"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            ScoreRange::new(80.0, 20.0),
            Err(FilterError::InvertedRange {
                min: 80.0,
                max: 20.0
            })
        );
        let point = ScoreRange::new(42.0, 42.0).unwrap();
        assert!(point.contains(42.0));
    }

    #[test]
    fn search_narrows_view() {
        let ds = sample();
        let view = FilteredView::new(&ds, &FilterCriteria::default());
        assert_eq!(view.search("los angeles").len(), 2);
        assert_eq!(view.search("9021").len(), 1);
        assert_eq!(view.search("high").len(), 3);
        assert_eq!(view.search("  ").len(), ds.len());
        assert!(view.search("tokyo").is_empty());
    }
}
