//! Tabular data model: columns, records and per-cell colors.

pub mod colors;
pub mod columns;
pub mod records;

pub use colors::{CellColorMap, label_colors};
pub use columns::{ColumnDescriptor, ID_COLUMN, PREDICTION_COLUMN, Schema};
pub use records::{Dataset, Fields, Record, RecordId};
