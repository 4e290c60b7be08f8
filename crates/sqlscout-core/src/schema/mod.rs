//! Schema document module

mod catalog;

pub use catalog::{ColumnDef, Schema, TableDef};
