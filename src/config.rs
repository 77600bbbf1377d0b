use std::path::{Path, PathBuf};

/// File name looked up when no path is given on the command line.
pub const DEFAULT_DATASET: &str = "LA_County_Analysis_Final_with_Scores.csv";

/// Fixed dashboard settings. Only the dataset path comes from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Explicit dataset path (first positional argument).
    pub dataset_path: Option<PathBuf>,
    /// Rows in the top / bottom ranking tables.
    pub top_n: usize,
    /// Bins per histogram.
    pub histogram_bins: usize,
    /// Cities shown in the "top cities" bar charts.
    pub city_bar_limit: usize,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            top_n: 10,
            histogram_bins: 30,
            city_bar_limit: 10,
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
        }
    }
}

impl DashboardConfig {
    /// Build from process arguments (program name already skipped).
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        Self {
            dataset_path: args.next().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Candidate dataset locations, most specific first.
    pub fn dataset_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.dataset_path {
            candidates.push(path.clone());
            // An explicit path is authoritative.
            return candidates;
        }
        candidates.push(PathBuf::from(DEFAULT_DATASET));
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(DEFAULT_DATASET));
        }
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join(DEFAULT_DATASET));
        }
        candidates
    }

    /// First existing candidate, if any.
    pub fn locate_dataset(&self) -> Option<PathBuf> {
        self.dataset_candidates().into_iter().find(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let cfg = DashboardConfig::from_args(vec!["data/zips.csv".to_string()].into_iter());
        assert_eq!(cfg.dataset_candidates(), vec![PathBuf::from("data/zips.csv")]);
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn defaults_search_for_known_file_name() {
        let cfg = DashboardConfig::from_args(std::iter::empty());
        let candidates = cfg.dataset_candidates();
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|p| p.ends_with(DEFAULT_DATASET)));
    }

    #[test]
    fn locate_finds_existing_explicit_file() {
        let tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let cfg = DashboardConfig {
            dataset_path: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(cfg.locate_dataset(), Some(tmp.path().to_path_buf()));

        let missing = DashboardConfig {
            dataset_path: Some(PathBuf::from("/no/such/file.csv")),
            ..Default::default()
        };
        assert_eq!(missing.locate_dataset(), None);
    }
}
