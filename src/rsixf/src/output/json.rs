use std::io::Write;

use serde_json::json;

use crate::{IxfError, Sink, TableDescriptor, Value};

use super::type_label;

/// Writes line-delimited JSON: one metadata object for the table, then
/// one object per row keyed by column name.
///
/// Raw bytes are written as lowercase hex strings; locators as their
/// `file.offset.length` reference, or the fetched payload with
/// [`inline_lobs`](JsonSink::inline_lobs).
pub struct JsonSink<W: Write> {
    out: W,
    column_names: Vec<String>,
    inline_lobs: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> JsonSink<W> {
        JsonSink {
            out,
            column_names: Vec::new(),
            inline_lobs: false,
        }
    }

    pub fn inline_lobs(mut self, inline: bool) -> JsonSink<W> {
        self.inline_lobs = inline;
        self
    }

    fn json_value(&self, value: &Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Int(i) => json!(i),
            Value::Float(x) => json!(x),
            Value::Text(s) => json!(s),
            Value::Raw(bytes) => json!(crate::hex_string(bytes)),
            Value::Locator(locator) if self.inline_lobs => match locator.read_value() {
                Ok(payload) => self.json_value(&payload),
                Err(e) => {
                    log::warn!("{}; writing the locator reference instead", e);
                    json!(locator.to_string())
                }
            },
            Value::Locator(locator) => json!(locator.to_string()),
        }
    }
}

impl<W: Write> Sink for JsonSink<W> {
    fn on_table_def(&mut self, table: &TableDescriptor) -> Result<(), IxfError> {
        self.column_names = table.columns.iter().map(|c| c.name.clone()).collect();
        let columns: Vec<serde_json::Value> = table
            .columns
            .iter()
            .map(|c| json!({ "name": c.name, "type": type_label(c), "nullable": c.nullable }))
            .collect();
        let meta = json!({ "table": table.name, "columns": columns });
        writeln!(self.out, "{}", meta)?;
        Ok(())
    }

    fn on_row(&mut self, _row_index: u64, row: &[Value]) -> Result<(), IxfError> {
        let mut object = serde_json::Map::with_capacity(row.len());
        for (name, value) in self.column_names.iter().zip(row) {
            object.insert(name.clone(), self.json_value(value));
        }
        writeln!(self.out, "{}", serde_json::Value::Object(object))?;
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), IxfError> {
        self.out.flush()?;
        Ok(())
    }
}
