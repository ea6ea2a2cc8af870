//! Concrete sinks: delimited text, line-delimited JSON, and a summary
//! writer.

mod delimited;
mod json;
mod info;

pub use delimited::CsvSink;
pub use json::JsonSink;
pub use info::InfoSink;

use crate::{ColumnDescriptor, DataType};

/// Semantic type label for output headers; unknown codes keep the raw
/// code visible.
pub(crate) fn type_label(column: &ColumnDescriptor) -> String {
    match DataType::from_code(column.type_code) {
        Some(kind) => kind.info().name.to_string(),
        None => format!("TYPE {:03}", column.type_code),
    }
}
