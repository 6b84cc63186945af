/// Data layer: one instrument record → one report.
///
/// Architecture:
/// ```text
///  record.txt (R| result lines + base64^ histogram fragments)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read text, run every extractor → CbcReport
///   └──────────┘
///        │             ├── params        R| lines → ParameterSet
///        │             ├── histogram     base64^ payload → ReconstructedCurve
///        │             └── distribution  MCV/RDW-CV, MPV/PDW → Gaussian curves,
///        │                               NEU%..BAS% → differential
///        ▼
///   ┌──────────┐
///   │  export   │  .html / .json / .csv / .parquet
///   └──────────┘
/// ```

pub mod distribution;
pub mod export;
pub mod loader;
pub mod model;
pub mod params;
