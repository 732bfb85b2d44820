/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / .dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ModeSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  ModeSet  │  Vec<Mode>, unit, optional ir. rep. labels
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  caller policy (imaginary modes, thresholds) → ModeSet
///   └──────────┘
///        │
///        ▼
///    synthesis  → Spectrum
/// ```

pub mod filter;
pub mod loader;
pub mod model;
