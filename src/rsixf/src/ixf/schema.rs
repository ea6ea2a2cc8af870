use super::*;

/// Normalises a 5-character code page field. `00000` (and blank) mean the
/// code page is unset and must never reach the resolver.
fn code_page_field(bytes: &[u8]) -> Option<String> {
    let text = ascii_text(bytes);
    match ascii_uint(bytes) {
        Some(0) | None => None,
        Some(_) => Some(text),
    }
}

fn char_field(bytes: &[u8]) -> char {
    bytes.first().map(|&b| b as char).unwrap_or(' ')
}

/// Decodes a `NAML`/`NAME` field pair: the name field is only meaningful
/// up to the length given in the companion length field.
fn sized_name(len_field: &[u8], name_field: &[u8]) -> String {
    let len = ascii_uint(len_field).unwrap_or(0) as usize;
    let end = len.min(name_field.len());
    String::from_utf8_lossy(&name_field[..end]).to_string()
}

/// The file header built from the single `H` record.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    /// IXF identifier, `IXF` for files DB2 wrote itself.
    pub identifier: String,
    pub version: String,
    pub product: String,
    pub date: String,
    pub time: String,
    pub heading_count: u32,
    pub sb_code_page: Option<String>,
    pub db_code_page: Option<String>,
}

impl FileHeader {
    pub fn from_record(payload: &[u8]) -> FileHeader {
        let fields = split_fields(payload, HEADER_LAYOUT);
        FileHeader {
            identifier: ascii_text(fields.get(0)),
            version: ascii_text(fields.get(1)),
            product: ascii_text(fields.get(2)),
            date: ascii_text(fields.get(3)),
            time: ascii_text(fields.get(4)),
            heading_count: ascii_uint(fields.get(5)).unwrap_or(0) as u32,
            sb_code_page: code_page_field(fields.get(6)),
            db_code_page: code_page_field(fields.get(7)),
        }
    }
}

/// The table descriptor built from the `T` record, with the column list
/// appended by subsequent `C` records until the schema freezes on the
/// first `D` record.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    /// Table name, with a `.ixf` suffix stripped when the exporting tool
    /// used the file name as the data name.
    pub name: String,
    pub qualifier: String,
    pub source: String,
    /// Data convention, `C` for PC/IXF.
    pub convention: char,
    /// Data format, `M` for PC/IXF.
    pub format: char,
    /// Machine format; `PC` means little-endian binary column data.
    pub machine_format: String,
    /// Data location, `I` when the data is internal to this file.
    pub location: char,
    /// Number of `C` records announced by the table record.
    pub column_record_count: u32,
    pub description: String,
    pub primary_key_name: String,
    /// PC/IXF table records carry no code pages; these stay unset and
    /// only participate in the resolver chain for completeness.
    pub sb_code_page: Option<String>,
    pub db_code_page: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn from_record(payload: &[u8]) -> TableDescriptor {
        let fields = split_fields(payload, TABLE_LAYOUT);
        let mut name = sized_name(fields.get(0), fields.get(1));
        if let Some(stripped) = name.strip_suffix(".ixf") {
            name = stripped.to_string();
        }
        TableDescriptor {
            name,
            qualifier: sized_name(fields.get(2), fields.get(3)),
            source: ascii_text(fields.get(4)),
            convention: char_field(fields.get(5)),
            format: char_field(fields.get(6)),
            machine_format: ascii_text(fields.get(7)),
            location: char_field(fields.get(8)),
            column_record_count: ascii_uint(fields.get(9)).unwrap_or(0) as u32,
            description: ascii_text(fields.get(11)),
            primary_key_name: ascii_text(fields.get(12)),
            sb_code_page: None,
            db_code_page: None,
            columns: Vec::new(),
        }
    }
}

/// One column descriptor from a `C` record.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Zero-based ordinal of the column in the table.
    pub colno: usize,
    pub name: String,
    pub nullable: bool,
    pub has_default: bool,
    pub selected: bool,
    /// One-origin position in the primary key, when part of it.
    pub key_position: Option<u32>,
    pub data_class: char,
    /// 3-digit DB2 type code, see [`DataType`].
    pub type_code: u16,
    pub sb_code_page: Option<String>,
    pub db_code_page: Option<String>,
    /// Raw `IXFCLENG` value; its interpretation depends on the type.
    pub data_len: u32,
    /// `D` record identifier this column's data lives in.
    pub cid: u32,
    /// One-origin byte offset of the column inside that `D` record's
    /// columnar data.
    pub pos: usize,
    pub description: String,
    pub lob_len: u64,
    pub udt_name: String,
    pub default_value: String,
    pub reference_type: char,
    pub dimension_count: u32,
    /// Raw dimension size field; nothing downstream interprets it.
    pub dimension_sizes: String,
}

impl ColumnDescriptor {
    pub fn from_record(colno: usize, payload: &[u8]) -> ColumnDescriptor {
        let fields = split_fields(payload, COLUMN_LAYOUT);
        ColumnDescriptor {
            colno,
            name: sized_name(fields.get(0), fields.get(1)),
            nullable: fields.get(2) == b"Y",
            has_default: fields.get(3) == b"Y",
            selected: fields.get(4) == b"Y",
            key_position: ascii_uint(fields.get(5)).filter(|&p| p > 0).map(|p| p as u32),
            data_class: char_field(fields.get(6)),
            type_code: ascii_uint(fields.get(7)).unwrap_or(0) as u16,
            sb_code_page: code_page_field(fields.get(8)),
            db_code_page: code_page_field(fields.get(9)),
            data_len: ascii_uint(fields.get(10)).unwrap_or(0) as u32,
            cid: ascii_uint(fields.get(11)).unwrap_or(0) as u32,
            pos: ascii_uint(fields.get(12)).unwrap_or(0) as usize,
            description: ascii_text(fields.get(13)),
            lob_len: ascii_uint(fields.get(14)).unwrap_or(0),
            udt_name: sized_name(fields.get(15), fields.get(16)),
            default_value: sized_name(fields.get(17), fields.get(18)),
            reference_type: char_field(fields.get(19)),
            dimension_count: ascii_uint(fields.get(20)).unwrap_or(0) as u32,
            dimension_sizes: ascii_text(fields.get(21)),
        }
    }
}
