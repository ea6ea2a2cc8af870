use std::io::Write;

use crate::{IxfError, Sink, TableDescriptor, Value};

use super::type_label;

/// Consumes the stream and writes a human-readable summary: the table
/// definition up front, the row count at the end.
pub struct InfoSink<W: Write> {
    out: W,
    rows: u64,
}

impl<W: Write> InfoSink<W> {
    pub fn new(out: W) -> InfoSink<W> {
        InfoSink { out, rows: 0 }
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Hands the writer back so the caller can append its own summary
    /// lines.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for InfoSink<W> {
    fn on_table_def(&mut self, table: &TableDescriptor) -> Result<(), IxfError> {
        writeln!(self.out, "table: {}", table.name)?;
        if !table.qualifier.is_empty() {
            writeln!(self.out, "qualifier: {}", table.qualifier)?;
        }
        writeln!(self.out, "columns: {}", table.columns.len())?;
        for column in &table.columns {
            writeln!(
                self.out,
                "  {:<20} {:<16} {}",
                column.name,
                type_label(column),
                if column.nullable { "NULL" } else { "NOT NULL" }
            )?;
        }
        Ok(())
    }

    fn on_row(&mut self, _row_index: u64, _row: &[Value]) -> Result<(), IxfError> {
        self.rows += 1;
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), IxfError> {
        writeln!(self.out, "rows: {}", self.rows)?;
        self.out.flush()?;
        Ok(())
    }
}
