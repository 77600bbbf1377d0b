/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → ZipDataset (validates required columns)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ ZipDataset │  Vec<ZipRecord>, category / city domains, score bounds
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterCriteria → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ summary  │   │  export  │  FilteredView → CSV
///   └──────────┘   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
