/// Data layer: core types, loading, filtering and chart preparation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MeteoriteDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  recclass / fall membership, inclusive year range
///   └──────────┘
///        │
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   line series     binning          geo
///   (year, mass)    (bin, count)     (name, lon, lat)
///        └──────────────┴──────────────┘
///                       │
///                  pipeline::prepare → ChartInputs
/// ```

pub mod binning;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
pub mod pipeline;
