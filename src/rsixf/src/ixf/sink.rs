use super::*;

/// Receiver for the decoder's output, invoked synchronously from the
/// decode loop.
///
/// `on_table_def` fires exactly once, at schema freeze, strictly before
/// the first `on_row`; `on_row` fires once per row in source order with a
/// dense zero-origin index; `on_end` fires last and exactly once, at the
/// end of the stream, at the row limit, or at a truncation.
///
/// `Locator` slots are handed over untouched: a sink either inlines the
/// payload through [`LobLocator::read_value`] or writes a side-channel
/// identifier from [`side_file_name`].
pub trait Sink {
    fn on_table_def(&mut self, table: &TableDescriptor) -> Result<(), IxfError>;
    fn on_row(&mut self, row_index: u64, row: &[Value]) -> Result<(), IxfError>;
    fn on_end(&mut self) -> Result<(), IxfError>;
}

/// Canonical name for a side file a sink writes a LOB/XML payload to,
/// with the extension picked from the column's type.
pub fn side_file_name(table: &str, column: &ColumnDescriptor, row_index: u64) -> String {
    let extension = match DataType::from_code(column.type_code) {
        Some(DataType::Xml) => "xml",
        Some(DataType::Clob) | Some(DataType::Dbclob) => "txt",
        Some(kind) if kind.locator_is_text() => "txt",
        _ => "bin",
    };
    format!("{}_{}_{}.{}", table, column.name, row_index, extension)
}
