//! Builders for synthetic IXF streams used across the test modules.

use super::*;

/// Frames a payload as a record: 6-digit length (type byte included),
/// type tag, payload.
pub fn framed(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = format!("{:06}", payload.len() + 1).into_bytes();
    out.push(tag);
    out.extend_from_slice(payload);
    out
}

/// Space-pads an ASCII field to its record width.
pub fn pad(text: &str, width: usize) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    assert!(out.len() <= width, "{:?} does not fit in {} bytes", text, width);
    out.resize(width, b' ');
    out
}

pub fn header_payload(sb_code_page: &str, db_code_page: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(b"IXF");
    p.extend_from_slice(b"0002");
    p.extend_from_slice(&pad("DB2 TEST", 12));
    p.extend_from_slice(b"20230425");
    p.extend_from_slice(b"103000");
    p.extend_from_slice(b"00000");
    p.extend_from_slice(&pad(sb_code_page, 5));
    p.extend_from_slice(&pad(db_code_page, 5));
    p.extend_from_slice(b"  ");
    p
}

pub fn header_record(sb_code_page: &str, db_code_page: &str) -> Vec<u8> {
    framed(b'H', &header_payload(sb_code_page, db_code_page))
}

/// Table record payload through `IXFTCCNT`; the reserved tail is legal to
/// omit.
pub fn table_payload(name: &str, column_count: u32) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(format!("{:03}", name.len()).as_bytes());
    p.extend_from_slice(&pad(name, 256));
    p.extend_from_slice(b"000");
    p.extend_from_slice(&pad("", 256));
    p.extend_from_slice(&pad("EXPORT", 12));
    p.push(b'C');
    p.push(b'M');
    p.extend_from_slice(&pad("PC", 5));
    p.push(b'I');
    p.extend_from_slice(format!("{:05}", column_count).as_bytes());
    p
}

pub fn table_record(name: &str, column_count: u32) -> Vec<u8> {
    framed(b'T', &table_payload(name, column_count))
}

#[derive(Clone, Copy)]
pub struct ColumnSpec<'a> {
    pub name: &'a str,
    pub nullable: bool,
    pub type_code: u16,
    pub sb_code_page: &'a str,
    pub data_len: u32,
    pub cid: u32,
    pub pos: usize,
}

/// Column record payload through `IXFCPOSN`.
pub fn column_payload(spec: ColumnSpec<'_>) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(format!("{:03}", spec.name.len()).as_bytes());
    p.extend_from_slice(&pad(spec.name, 256));
    p.push(if spec.nullable { b'Y' } else { b'N' });
    p.push(b'N');
    p.push(b'Y');
    p.extend_from_slice(b"  ");
    p.push(b'R');
    p.extend_from_slice(format!("{:03}", spec.type_code).as_bytes());
    p.extend_from_slice(&pad(spec.sb_code_page, 5));
    p.extend_from_slice(b"00000");
    p.extend_from_slice(format!("{:05}", spec.data_len).as_bytes());
    p.extend_from_slice(format!("{:03}", spec.cid).as_bytes());
    p.extend_from_slice(format!("{:06}", spec.pos).as_bytes());
    p
}

pub fn column_record(spec: ColumnSpec<'_>) -> Vec<u8> {
    framed(b'C', &column_payload(spec))
}

pub fn data_record(cid: u32, column_data: &[u8]) -> Vec<u8> {
    let mut p = format!("{:03}", cid).into_bytes();
    p.extend_from_slice(b"    ");
    p.extend_from_slice(column_data);
    framed(b'D', &p)
}

/// A column descriptor with the fields the extractor cares about; the
/// rest take neutral defaults.
pub fn col(type_code: u16, data_len: u32, pos: usize) -> ColumnDescriptor {
    ColumnDescriptor {
        colno: 0,
        name: "COL".to_string(),
        nullable: true,
        has_default: false,
        selected: true,
        key_position: None,
        data_class: 'R',
        type_code,
        sb_code_page: None,
        db_code_page: None,
        data_len,
        cid: 1,
        pos,
        description: String::new(),
        lob_len: 0,
        udt_name: String::new(),
        default_value: String::new(),
        reference_type: ' ',
        dimension_count: 0,
        dimension_sizes: String::new(),
    }
}
