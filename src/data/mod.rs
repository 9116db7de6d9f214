/// Data layer: core types, loading, caching, and aggregation.
///
/// Architecture:
/// ```text
///  delimited text (csv / tsv, cp949 / euc-kr / utf-8)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  hypothesis search over (encoding, delimiter) → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  ordered columns, typed cells, unique-value index
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  group-by sum/mean → rank-ordered AggregationResult
///   └────────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod loader;
pub mod model;
