/// Data layer: core types, CSV persistence, filtering and aggregates.
///
/// Architecture:
/// ```text
///  folder/out.csv
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  read CSV → Dataset, write Dataset → CSV
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  named columns + stable row index
///   └──────────┘
///        │
///        ├────────────────┐
///        ▼                ▼
///   ┌──────────┐     ┌───────────┐
///   │  filter   │     │ aggregate  │  counts per status / assignee
///   └──────────┘     └───────────┘
///   normalize dates, infer column kinds,
///   apply per-column predicates → filtered view
/// ```

pub mod aggregate;
pub mod filter;
pub mod model;
pub mod store;
pub mod temporal;
