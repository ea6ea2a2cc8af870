use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::*;

/// Caller-tunable knobs for one decoding run.
#[derive(Debug, Clone, Default)]
pub struct IxfOptions {
    /// Code page forced over everything the file declares.
    pub code_page: Option<String>,
    /// Folder LOB side files resolve against. [`IxfParser::open`] defaults
    /// it to the input file's directory.
    pub lob_folder: Option<PathBuf>,
    /// Zero-origin index of the first row to emit; earlier rows are
    /// decoded but not handed to the sink.
    pub from_row: u64,
    /// Emit at most this many rows, then stop reading the file.
    pub max_rows: Option<u64>,
}

/// Decoder phases. Records arriving out of phase are warned about and
/// ignored; the first `D` record freezes the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NeedHeader,
    HaveHeader,
    HaveTable,
    Schema,
    Rows,
    End,
}

/// The IXF decoder: a single-threaded pull loop over the record stream
/// that drives a [`Sink`].
pub struct IxfParser {
    options: IxfOptions,
    state: State,
    header: Option<FileHeader>,
    table: Option<TableDescriptor>,
    assembler: Option<RowAssembler>,
    app_records: Vec<ApplicationRecord>,
    unknown_records: u64,
}

impl IxfParser {
    pub fn new(options: IxfOptions) -> IxfParser {
        IxfParser {
            options,
            state: State::NeedHeader,
            header: None,
            table: None,
            assembler: None,
            app_records: Vec::new(),
            unknown_records: 0,
        }
    }

    /// Opens an IXF file for [`process`](IxfParser::process), defaulting
    /// the LOB folder to the file's own directory.
    pub fn open(
        path: &Path,
        mut options: IxfOptions,
    ) -> Result<(IxfParser, BufReader<File>), IxfError> {
        if options.lob_folder.is_none() {
            let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
            options.lob_folder = Some(parent.unwrap_or(Path::new(".")).to_path_buf());
        }
        let file = File::open(path)?;
        Ok((IxfParser::new(options), BufReader::new(file)))
    }

    /// Decodes the whole stream, firing the sink callbacks in source
    /// order. The final in-flight row is emitted even when the stream is
    /// cut short, and `on_end` fires exactly once on every path that
    /// produced output.
    pub fn process<R: Read, S: Sink>(&mut self, src: &mut R, sink: &mut S) -> Result<(), IxfError> {
        loop {
            let record = match read_record(src) {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(IxfError::Truncated) => {
                    self.close(sink)?;
                    return Err(IxfError::Truncated);
                }
                Err(e) => return Err(e),
            };

            let Some(kind) = RecordKind::from_tag(record.tag) else {
                self.unknown_records += 1;
                log::warn!(
                    "skipping record with unknown type {:?}",
                    record.tag as char
                );
                continue;
            };

            if !self.dispatch(kind, &record.payload, sink)? {
                break;
            }
        }
        self.close(sink)
    }

    pub fn header(&self) -> Option<&FileHeader> {
        self.header.as_ref()
    }

    pub fn table(&self) -> Option<&TableDescriptor> {
        self.table.as_ref()
    }

    /// Every application record seen so far, in source order.
    pub fn application_records(&self) -> &[ApplicationRecord] {
        &self.app_records
    }

    pub fn rows_emitted(&self) -> u64 {
        self.assembler.as_ref().map_or(0, |a| a.rows_emitted())
    }

    pub fn unknown_records(&self) -> u64 {
        self.unknown_records
    }

    /// Returns `false` once the row limit is reached.
    fn dispatch<S: Sink>(
        &mut self,
        kind: RecordKind,
        payload: &[u8],
        sink: &mut S,
    ) -> Result<bool, IxfError> {
        match kind {
            RecordKind::Header => {
                if self.state == State::NeedHeader {
                    self.header = Some(FileHeader::from_record(payload));
                    self.state = State::HaveHeader;
                } else {
                    log::warn!("ignoring out-of-order header record");
                }
            }

            RecordKind::Table => {
                if self.state == State::HaveHeader {
                    self.table = Some(TableDescriptor::from_record(payload));
                    self.state = State::HaveTable;
                } else {
                    log::warn!("ignoring out-of-order table record");
                }
            }

            RecordKind::Column => match (self.state, self.table.as_mut()) {
                (State::HaveTable | State::Schema, Some(table)) => {
                    let colno = table.columns.len();
                    table.columns.push(ColumnDescriptor::from_record(colno, payload));
                    self.state = State::Schema;
                }
                _ => log::warn!("ignoring out-of-order column record"),
            },

            RecordKind::Data => {
                match self.state {
                    State::HaveTable | State::Schema => self.freeze(sink)?,
                    State::Rows => {}
                    _ => {
                        log::warn!("ignoring data record before the table definition");
                        return Ok(true);
                    }
                }
                let fields = split_fields(payload, DATA_LAYOUT);
                let cid = ascii_uint(fields.get(0)).unwrap_or(0) as u32;
                let column_data = fields.get(2);
                if let (Some(table), Some(assembler)) =
                    (self.table.as_ref(), self.assembler.as_mut())
                {
                    return assembler.on_data_record(table, cid, column_data, sink);
                }
            }

            RecordKind::Application => {
                self.app_records.push(decode_application_record(payload));
            }
        }
        Ok(true)
    }

    /// Schema freeze: resolves each column's decoder once, builds the row
    /// assembler, and announces the table definition.
    fn freeze<S: Sink>(&mut self, sink: &mut S) -> Result<(), IxfError> {
        let Some(table) = self.table.as_ref() else {
            return Ok(());
        };

        let mut encodings = Vec::with_capacity(table.columns.len());
        for col in &table.columns {
            match resolve_code_page(
                self.options.code_page.as_deref(),
                Some(col),
                Some(table),
                self.header.as_ref(),
            ) {
                Ok(encoding) => encodings.push(Some(encoding)),
                Err(e) => {
                    log::warn!("column {:?}: {}; its text fields stay raw", col.name, e);
                    encodings.push(None);
                }
            }
        }

        let lob_folder = self
            .options
            .lob_folder
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        self.assembler = Some(RowAssembler::new(
            table,
            encodings,
            lob_folder,
            self.options.from_row,
            self.options.max_rows,
        ));
        self.state = State::Rows;
        sink.on_table_def(table)
    }

    fn close<S: Sink>(&mut self, sink: &mut S) -> Result<(), IxfError> {
        if let Some(assembler) = self.assembler.as_mut() {
            assembler.finish(sink)?;
        }
        self.state = State::End;
        sink.on_end()
    }
}
