//! chartprep – prepares chart-ready data for a presentation layer.
//!
//! Three small pieces, consumed in order:
//! * [`load`] reads a delimited text file of unknown encoding/delimiter into
//!   a [`Table`], normalizing a date-like key column and coercing declared
//!   numeric columns.
//! * [`aggregate`] / [`filter_and_sum`] turn the table into a rank-ordered
//!   [`AggregationResult`].
//! * [`colorize`] assigns a color per rank: a fixed highlight for rank 1 and
//!   a fading gradient for the rest.
//!
//! The crate never renders anything; charts, tables, and maps are built by
//! the caller from the returned artifacts.

pub mod color;
pub mod data;
pub mod error;

pub use color::{colorize, distinct_palette, ColorAssignment, GradientSpec, Rgba};
pub use data::aggregate::{aggregate, filter_and_sum, Agg, AggregateRow, AggregationResult};
pub use data::cache::LoadCache;
pub use data::loader::{load, LoadOptions};
pub use data::model::{ColumnSpec, NumericColumns, Table, Value};
pub use error::{Error, Result};
