use std::io::Write;

use crate::{IxfError, Sink, TableDescriptor, Value};

use super::type_label;

/// Writes the table as delimited text: one row of column names, one row
/// of type names, then the data rows.
///
/// `Locator` slots are written as their `file.offset.length` reference by
/// default; with [`inline_lobs`](CsvSink::inline_lobs) the payload is
/// fetched and written in place, falling back to the reference when the
/// side file cannot be read.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    inline_lobs: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> CsvSink<W> {
        CsvSink {
            writer: csv::Writer::from_writer(out),
            inline_lobs: false,
        }
    }

    pub fn inline_lobs(mut self, inline: bool) -> CsvSink<W> {
        self.inline_lobs = inline;
        self
    }

    fn field(&self, value: &Value) -> String {
        match value {
            Value::Locator(locator) if self.inline_lobs => match locator.read_value() {
                Ok(payload) => payload.to_string(),
                Err(e) => {
                    log::warn!("{}; writing the locator reference instead", e);
                    locator.to_string()
                }
            },
            other => other.to_string(),
        }
    }
}

fn csv_err(e: csv::Error) -> IxfError {
    IxfError::Io(std::io::Error::other(e))
}

impl<W: Write> Sink for CsvSink<W> {
    fn on_table_def(&mut self, table: &TableDescriptor) -> Result<(), IxfError> {
        self.writer
            .write_record(table.columns.iter().map(|c| c.name.as_str()))
            .map_err(csv_err)?;
        self.writer
            .write_record(table.columns.iter().map(type_label))
            .map_err(csv_err)
    }

    fn on_row(&mut self, _row_index: u64, row: &[Value]) -> Result<(), IxfError> {
        let fields: Vec<String> = row.iter().map(|v| self.field(v)).collect();
        self.writer.write_record(&fields).map_err(csv_err)
    }

    fn on_end(&mut self) -> Result<(), IxfError> {
        self.writer.flush()?;
        Ok(())
    }
}
