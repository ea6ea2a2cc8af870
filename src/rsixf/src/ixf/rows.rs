use std::collections::HashMap;
use std::path::PathBuf;

use encoding_rs::Encoding;

use super::*;

/// Rebuilds rows from the `D` record chain.
///
/// A row can span several `D` records: each column descriptor names the
/// record identifier (`cid`) its data lives in and the byte position
/// inside that record's columnar data. A record with `cid == 1` closes the
/// in-flight row and opens the next one; the stream end closes the last
/// row. The assembler also owns the `from_row` / `max_rows` accounting so
/// `row_index` stays dense and zero-origin over the rows actually emitted.
pub struct RowAssembler {
    /// Ordinal column lists per `D` record identifier. Columns sharing a
    /// `cid` are contiguous, so pushing in ordinal order keeps each list
    /// ordered.
    cid_index: HashMap<u32, Vec<usize>>,
    /// Per-column resolved decoders, indexed by `colno`.
    encodings: Vec<Option<&'static Encoding>>,
    lob_folder: PathBuf,
    width: usize,
    current: Option<Vec<Value>>,
    rows_seen: u64,
    emitted: u64,
    skip: u64,
    limit: Option<u64>,
}

impl RowAssembler {
    pub fn new(
        table: &TableDescriptor,
        encodings: Vec<Option<&'static Encoding>>,
        lob_folder: PathBuf,
        skip: u64,
        limit: Option<u64>,
    ) -> RowAssembler {
        let mut cid_index: HashMap<u32, Vec<usize>> = HashMap::new();
        for col in &table.columns {
            cid_index.entry(col.cid).or_default().push(col.colno);
        }
        RowAssembler {
            cid_index,
            encodings,
            lob_folder,
            width: table.columns.len(),
            current: None,
            rows_seen: 0,
            emitted: 0,
            skip,
            limit,
        }
    }

    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|l| self.emitted >= l)
    }

    /// Number of rows handed to the sink so far.
    pub fn rows_emitted(&self) -> u64 {
        self.emitted
    }

    /// Feeds one `D` record. Returns `false` once the row limit is
    /// reached and no further records should be read.
    pub fn on_data_record<S: Sink>(
        &mut self,
        table: &TableDescriptor,
        cid: u32,
        column_data: &[u8],
        sink: &mut S,
    ) -> Result<bool, IxfError> {
        if cid == 1 {
            self.flush(sink)?;
            if self.limit_reached() {
                return Ok(false);
            }
            self.current = Some(vec![Value::Null; self.width]);
        }

        let Some(row) = self.current.as_mut() else {
            log::warn!("data record {} arrived before the start of a row", cid);
            return Ok(true);
        };

        match self.cid_index.get(&cid) {
            Some(colnos) => {
                for &colno in colnos {
                    let col = &table.columns[colno];
                    let ctx = FieldContext {
                        encoding: self.encodings[colno],
                        lob_folder: &self.lob_folder,
                    };
                    row[colno] = extract_field(col, &ctx, column_data);
                }
            }
            None => log::warn!("no columns are mapped to data record identifier {}", cid),
        }
        Ok(true)
    }

    /// Closes the stream: the in-flight row, if any, is still emitted.
    pub fn finish<S: Sink>(&mut self, sink: &mut S) -> Result<(), IxfError> {
        self.flush(sink)
    }

    fn flush<S: Sink>(&mut self, sink: &mut S) -> Result<(), IxfError> {
        let Some(row) = self.current.take() else {
            return Ok(());
        };
        if self.rows_seen >= self.skip {
            sink.on_row(self.emitted, &row)?;
            self.emitted += 1;
        }
        self.rows_seen += 1;
        Ok(())
    }
}
