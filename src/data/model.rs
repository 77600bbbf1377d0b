use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column – the fixed schema of the input file
// ---------------------------------------------------------------------------

/// Every column the dashboard expects in the input file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    ZipCode,
    PrimaryCity,
    ScoreCategory,
    CompositeScore,
    DensityScore,
    TransitScore,
    IncomeScore,
    EducationScore,
    HousingScore,
    MedianIncome,
    MedianHomeValue,
    EstimatedPopulation,
    PopulationDensity,
    PublicTransitPct,
    EducationPct,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::ZipCode,
        Column::PrimaryCity,
        Column::ScoreCategory,
        Column::CompositeScore,
        Column::DensityScore,
        Column::TransitScore,
        Column::IncomeScore,
        Column::EducationScore,
        Column::HousingScore,
        Column::MedianIncome,
        Column::MedianHomeValue,
        Column::EstimatedPopulation,
        Column::PopulationDensity,
        Column::PublicTransitPct,
        Column::EducationPct,
    ];

    /// Component scores that make up the composite score.
    pub const COMPONENT_SCORES: [Column; 5] = [
        Column::DensityScore,
        Column::TransitScore,
        Column::IncomeScore,
        Column::EducationScore,
        Column::HousingScore,
    ];

    /// Composite score followed by its components (correlation heatmap axes).
    pub const SCORES: [Column; 6] = [
        Column::CompositeScore,
        Column::DensityScore,
        Column::TransitScore,
        Column::IncomeScore,
        Column::EducationScore,
        Column::HousingScore,
    ];

    /// Columns shown in the data table before the user picks any.
    pub const TABLE_DEFAULT: [Column; 7] = [
        Column::ZipCode,
        Column::PrimaryCity,
        Column::CompositeScore,
        Column::ScoreCategory,
        Column::MedianIncome,
        Column::MedianHomeValue,
        Column::EstimatedPopulation,
    ];

    /// Header name as it appears in the CSV file.
    pub fn name(self) -> &'static str {
        match self {
            Column::ZipCode => "zip_code",
            Column::PrimaryCity => "primary_city",
            Column::ScoreCategory => "score_category",
            Column::CompositeScore => "composite_score",
            Column::DensityScore => "density_score",
            Column::TransitScore => "transit_score",
            Column::IncomeScore => "income_score",
            Column::EducationScore => "education_score",
            Column::HousingScore => "housing_score",
            Column::MedianIncome => "median_income",
            Column::MedianHomeValue => "median_home_value",
            Column::EstimatedPopulation => "estimated_population",
            Column::PopulationDensity => "population_density",
            Column::PublicTransitPct => "public_transit_pct",
            Column::EducationPct => "education_pct",
        }
    }

    /// Human readable label for axes and headers.
    pub fn label(self) -> &'static str {
        match self {
            Column::ZipCode => "Zip Code",
            Column::PrimaryCity => "City",
            Column::ScoreCategory => "Score Category",
            Column::CompositeScore => "Composite Score",
            Column::DensityScore => "Density Score",
            Column::TransitScore => "Transit Score",
            Column::IncomeScore => "Income Score",
            Column::EducationScore => "Education Score",
            Column::HousingScore => "Housing Score",
            Column::MedianIncome => "Median Income ($)",
            Column::MedianHomeValue => "Median Home Value ($)",
            Column::EstimatedPopulation => "Estimated Population",
            Column::PopulationDensity => "Population Density",
            Column::PublicTransitPct => "Public Transit Usage (%)",
            Column::EducationPct => "Education Level (%)",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Column::ZipCode | Column::PrimaryCity | Column::ScoreCategory
        )
    }

    /// All numeric columns, in file order.
    pub fn numeric() -> impl Iterator<Item = Column> {
        Column::ALL.into_iter().filter(|c| c.is_numeric())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// ZipRecord – one row of the input file
// ---------------------------------------------------------------------------

/// A single zip code row. Blank numeric cells load as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRecord {
    pub zip_code: String,
    pub primary_city: String,
    pub score_category: String,
    pub composite_score: f64,
    pub density_score: Option<f64>,
    pub transit_score: Option<f64>,
    pub income_score: Option<f64>,
    pub education_score: Option<f64>,
    pub housing_score: Option<f64>,
    pub median_income: Option<f64>,
    pub median_home_value: Option<f64>,
    pub estimated_population: Option<f64>,
    pub population_density: Option<f64>,
    pub public_transit_pct: Option<f64>,
    pub education_pct: Option<f64>,
}

impl ZipRecord {
    /// Record with the key columns set and every optional metric blank.
    pub fn new(
        zip_code: impl Into<String>,
        primary_city: impl Into<String>,
        score_category: impl Into<String>,
        composite_score: f64,
    ) -> Self {
        ZipRecord {
            zip_code: zip_code.into(),
            primary_city: primary_city.into(),
            score_category: score_category.into(),
            composite_score,
            density_score: None,
            transit_score: None,
            income_score: None,
            education_score: None,
            housing_score: None,
            median_income: None,
            median_home_value: None,
            estimated_population: None,
            population_density: None,
            public_transit_pct: None,
            education_pct: None,
        }
    }

    /// Numeric value of `column`, `None` for text columns, blanks and NaN.
    pub fn value(&self, column: Column) -> Option<f64> {
        self.raw(column).filter(|x| !x.is_nan())
    }

    /// Numeric field as stored, NaN included.
    fn raw(&self, column: Column) -> Option<f64> {
        match column {
            Column::ZipCode | Column::PrimaryCity | Column::ScoreCategory => None,
            Column::CompositeScore => Some(self.composite_score),
            Column::DensityScore => self.density_score,
            Column::TransitScore => self.transit_score,
            Column::IncomeScore => self.income_score,
            Column::EducationScore => self.education_score,
            Column::HousingScore => self.housing_score,
            Column::MedianIncome => self.median_income,
            Column::MedianHomeValue => self.median_home_value,
            Column::EstimatedPopulation => self.estimated_population,
            Column::PopulationDensity => self.population_density,
            Column::PublicTransitPct => self.public_transit_pct,
            Column::EducationPct => self.education_pct,
        }
    }

    /// Mutable slot for an optional numeric column, used by the non-CSV loaders.
    pub fn numeric_slot(&mut self, column: Column) -> Option<&mut Option<f64>> {
        match column {
            Column::DensityScore => Some(&mut self.density_score),
            Column::TransitScore => Some(&mut self.transit_score),
            Column::IncomeScore => Some(&mut self.income_score),
            Column::EducationScore => Some(&mut self.education_score),
            Column::HousingScore => Some(&mut self.housing_score),
            Column::MedianIncome => Some(&mut self.median_income),
            Column::MedianHomeValue => Some(&mut self.median_home_value),
            Column::EstimatedPopulation => Some(&mut self.estimated_population),
            Column::PopulationDensity => Some(&mut self.population_density),
            Column::PublicTransitPct => Some(&mut self.public_transit_pct),
            Column::EducationPct => Some(&mut self.education_pct),
            _ => None,
        }
    }

    /// Raw cell text as written to CSV. Missing values become empty strings.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::ZipCode => self.zip_code.clone(),
            Column::PrimaryCity => self.primary_city.clone(),
            Column::ScoreCategory => self.score_category.clone(),
            Column::CompositeScore => self.composite_score.to_string(),
            other => self.raw(other).map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    /// Cell text for display: numbers rounded, blanks shown as a dash.
    pub fn display(&self, column: Column) -> String {
        match column {
            Column::ZipCode | Column::PrimaryCity | Column::ScoreCategory => self.cell(column),
            Column::MedianIncome | Column::MedianHomeValue => match self.value(column) {
                Some(v) => format_dollars(v),
                None => "–".to_string(),
            },
            Column::EstimatedPopulation => match self.value(column) {
                Some(v) => format_thousands(v),
                None => "–".to_string(),
            },
            other => match self.value(other) {
                Some(v) => format!("{v:.2}"),
                None => "–".to_string(),
            },
        }
    }
}

/// `1234567.8` → `1,234,568`.
pub fn format_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// `85000.4` → `$85,000`.
pub fn format_dollars(v: f64) -> String {
    format!("${}", format_thousands(v))
}

// ---------------------------------------------------------------------------
// ZipDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter domains.
#[derive(Debug, Clone)]
pub struct ZipDataset {
    /// All rows, in file order.
    pub records: Vec<ZipRecord>,
    /// Sorted unique score categories.
    pub categories: BTreeSet<String>,
    /// Sorted unique primary cities.
    pub cities: BTreeSet<String>,
    /// `(min, max)` of the composite score, ignoring NaN. `None` when empty.
    pub score_bounds: Option<(f64, f64)>,
}

impl ZipDataset {
    /// Build filter domains from the loaded rows.
    pub fn from_records(records: Vec<ZipRecord>) -> Self {
        let categories = records.iter().map(|r| r.score_category.clone()).collect();
        let cities = records.iter().map(|r| r.primary_city.clone()).collect();
        let score_bounds = records
            .iter()
            .filter_map(|r| r.value(Column::CompositeScore))
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });

        ZipDataset {
            records,
            categories,
            cities,
            score_bounds,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small record with every optional metric filled from `score`.
    pub(crate) fn record(zip: &str, city: &str, category: &str, score: f64) -> ZipRecord {
        ZipRecord {
            zip_code: zip.to_string(),
            primary_city: city.to_string(),
            score_category: category.to_string(),
            composite_score: score,
            density_score: Some(score / 2.0),
            transit_score: Some(100.0 - score),
            income_score: Some(score),
            education_score: Some(score * 0.8),
            housing_score: None,
            median_income: Some(score * 1000.0),
            median_home_value: Some(score * 10_000.0),
            estimated_population: Some(20_000.0 + score),
            population_density: Some(score * 50.0),
            public_transit_pct: Some(5.5),
            education_pct: Some(score / 2.0),
        }
    }

    #[test]
    fn column_names_round_trip() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("nope"), None);
        assert_eq!(Column::numeric().count(), 12);
    }

    #[test]
    fn value_skips_text_blank_and_nan() {
        let mut r = record("90001", "Los Angeles", "High", 71.5);
        assert_eq!(r.value(Column::CompositeScore), Some(71.5));
        assert_eq!(r.value(Column::PrimaryCity), None);
        assert_eq!(r.value(Column::HousingScore), None);
        r.median_income = Some(f64::NAN);
        assert_eq!(r.value(Column::MedianIncome), None);
    }

    #[test]
    fn cell_preserves_leading_zeros_and_blanks() {
        let r = record("01234", "Avalon", "Low", 12.25);
        assert_eq!(r.cell(Column::ZipCode), "01234");
        assert_eq!(r.cell(Column::CompositeScore), "12.25");
        assert_eq!(r.cell(Column::HousingScore), "");
        assert_eq!(r.cell(Column::MedianIncome), "12250");
    }

    #[test]
    fn display_formats_money_and_counts() {
        let r = record("90001", "Los Angeles", "High", 85.0);
        assert_eq!(r.display(Column::MedianIncome), "$85,000");
        assert_eq!(r.display(Column::EstimatedPopulation), "20,085");
        assert_eq!(r.display(Column::HousingScore), "–");
        assert_eq!(format_thousands(-1234.0), "-1,234");
        assert_eq!(format_thousands(999.0), "999");
    }

    #[test]
    fn dataset_domains() {
        let ds = ZipDataset::from_records(vec![
            record("90001", "Los Angeles", "High", 80.0),
            record("90210", "Beverly Hills", "Very High", 95.0),
            record("90002", "Los Angeles", "High", f64::NAN),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.cities.iter().cloned().collect::<Vec<_>>(),
            vec!["Beverly Hills", "Los Angeles"]
        );
        assert_eq!(ds.categories.len(), 2);
        assert_eq!(ds.score_bounds, Some((80.0, 95.0)));
        assert_eq!(ZipDataset::from_records(Vec::new()).score_bounds, None);
    }
}
