use byteorder::{ByteOrder, LittleEndian};

use super::*;

/// Application identifier DB2 writes on its own `A` records.
pub const DB2_APPLICATION_ID: &str = "DB2    02.00";

/// A decoded `A` record.
///
/// DB2's own records (`DB2    02.00`) decode into the named fields of
/// their subtype; foreign application ids keep their payload as a single
/// raw field. The parser retains every application record it sees for the
/// sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub application_id: String,
    /// `I`, `X`, `Y`, `C`, `E`, `S` or `A` for DB2 records; `None` for
    /// foreign ones.
    pub subtype: Option<char>,
    pub fields: Vec<(&'static str, Value)>,
}

/// One field of an application-record layout.
///
/// `ShortLen` and `AsciiLen` fields size the *next* `SizedText` field:
/// its slot in the record keeps its declared width, but only the first
/// `length` bytes of it are meaningful.
#[derive(Debug, Clone, Copy)]
enum AppField {
    /// Fixed-width text, trailing padding dropped.
    Text(&'static str, usize),
    /// Text whose declared slot is `width` bytes (0 = remainder) but whose
    /// meaningful length came from the preceding length field.
    SizedText(&'static str, usize),
    /// 2-byte little-endian short, surfaced as an integer and applied to
    /// the next `SizedText`.
    ShortLen(&'static str),
    /// ASCII decimal length of `width` digits, applied to the next
    /// `SizedText`.
    AsciiLen(&'static str, usize),
    /// 2-byte little-endian short surfaced as an integer.
    Short(&'static str),
    /// Uninterpreted bytes.
    Raw(&'static str, usize),
}

use AppField::*;

/// DB2 INDEX RECORD, subtype `I`.
static INDEX_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    ShortLen("IXFANDXL"),
    SizedText("IXFANDXN", 256),
    ShortLen("IXFANCL"),
    SizedText("IXFANCN", 256),
    ShortLen("IXFATABL"),
    SizedText("IXFATABN", 256),
    ShortLen("IXFATCL"),
    SizedText("IXFATCN", 256),
    Text("IXFAUNIQ", 1),
    Short("IXFACCNT"),
    Text("IXFAREVS", 1),
    Text("IXFAIDXT", 1),
    Text("IXFAPCTF", 2),
    Text("IXFAPCTU", 2),
    Text("IXFAEXTI", 1),
    AsciiLen("IXFACNML", 6),
    SizedText("IXFACOLN", 0),
];

/// DB2 HIERARCHY RECORD, subtype `X`.
static HIERARCHY_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    Text("IXFAYCNT", 10),
    Text("IXFAYSTR", 10),
];

/// DB2 SUBTABLE RECORD, subtype `Y`.
static SUBTABLE_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    AsciiLen("IXFASCHL", 3),
    SizedText("IXFASCHN", 256),
    AsciiLen("IXFATYPL", 3),
    SizedText("IXFATYPN", 256),
    AsciiLen("IXFATABL", 3),
    SizedText("IXFATABN", 256),
    Text("IXFAPNDX", 10),
    Text("IXFASNDX", 5),
    Text("IXFAENDX", 5),
];

/// DB2 CONTINUATION RECORD, subtype `C`.
static CONTINUATION_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    Short("IXFALAST"),
    Short("IXFATHIS"),
    Short("IXFANEXT"),
];

/// DB2 TERMINATE RECORD, subtype `E`.
static TERMINATE_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
];

/// DB2 IDENTITY RECORD, subtype `S`.
static IDENTITY_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    Text("IXFACOLN", 6),
    Text("IXFAITYP", 1),
    Text("IXFASTRT", 33),
    Text("IXFAINCR", 33),
    Text("IXFACACH", 10),
    Text("IXFAMINV", 33),
    Text("IXFAMAXV", 33),
    Text("IXFACYCL", 1),
    Text("IXFAORDR", 1),
    AsciiLen("IXFARMRL", 3),
    SizedText("IXFARMRK", 254),
];

/// DB2 SQLCA RECORD, subtype `A`.
static SQLCA_LAYOUT: &[AppField] = &[
    Text("IXFADATE", 8),
    Text("IXFATIME", 6),
    Raw("IXFASLCA", 136),
];

fn layout_for(subtype: char) -> Option<&'static [AppField]> {
    match subtype {
        'I' => Some(INDEX_LAYOUT),
        'X' => Some(HIERARCHY_LAYOUT),
        'Y' => Some(SUBTABLE_LAYOUT),
        'C' => Some(CONTINUATION_LAYOUT),
        'E' => Some(TERMINATE_LAYOUT),
        'S' => Some(IDENTITY_LAYOUT),
        'A' => Some(SQLCA_LAYOUT),
        _ => None,
    }
}

/// Decodes an `A` record payload (`IXFAPPID` plus the application data).
pub fn decode_application_record(payload: &[u8]) -> ApplicationRecord {
    let fields = split_fields(payload, APPLICATION_LAYOUT);
    let application_id = ascii_text(fields.get(0));
    let data = fields.get(1);

    if application_id != DB2_APPLICATION_ID || data.is_empty() {
        return generic(application_id, data);
    }

    let subtype = data[0] as char;
    let Some(layout) = layout_for(subtype) else {
        log::warn!("unknown DB2 application record subtype {:?}", subtype);
        return generic(application_id, data);
    };

    ApplicationRecord {
        application_id,
        subtype: Some(subtype),
        fields: decode_layout(layout, &data[1..]),
    }
}

fn generic(application_id: String, data: &[u8]) -> ApplicationRecord {
    ApplicationRecord {
        application_id,
        subtype: None,
        fields: vec![("IXFADATA", Value::Raw(data.to_vec()))],
    }
}

fn clamp(data: &[u8], start: usize, width: usize) -> &[u8] {
    let start = start.min(data.len());
    let end = if width == 0 { data.len() } else { (start + width).min(data.len()) };
    &data[start..end]
}

fn decode_layout(layout: &[AppField], data: &[u8]) -> Vec<(&'static str, Value)> {
    let mut fields = Vec::with_capacity(layout.len());
    let mut off = 0usize;
    let mut sized_len: Option<usize> = None;

    for field in layout {
        match *field {
            Text(name, width) => {
                fields.push((name, Value::Text(ascii_text(clamp(data, off, width)))));
                off += width;
            }
            SizedText(name, width) => {
                let slot = clamp(data, off, width);
                let meaningful = sized_len.take().unwrap_or(slot.len()).min(slot.len());
                let text = String::from_utf8_lossy(&slot[..meaningful]).to_string();
                fields.push((name, Value::Text(text)));
                off += if width == 0 { slot.len() } else { width };
            }
            ShortLen(name) => {
                let slot = clamp(data, off, 2);
                let value = if slot.len() == 2 { LittleEndian::read_u16(slot) } else { 0 };
                sized_len = Some(value as usize);
                fields.push((name, Value::Int(value as i64)));
                off += 2;
            }
            AsciiLen(name, width) => {
                let value = ascii_uint(clamp(data, off, width)).unwrap_or(0);
                sized_len = Some(value as usize);
                fields.push((name, Value::Int(value as i64)));
                off += width;
            }
            Short(name) => {
                let slot = clamp(data, off, 2);
                let value = if slot.len() == 2 { LittleEndian::read_u16(slot) } else { 0 };
                fields.push((name, Value::Int(value as i64)));
                off += 2;
            }
            Raw(name, width) => {
                fields.push((name, Value::Raw(clamp(data, off, width).to_vec())));
                off += width;
            }
        }
    }
    fields
}
