use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;
use paste::paste;

use super::*;

/// How the storage length of a field is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Fixed storage size known from the type alone.
    Fixed(usize),
    /// The column's `IXFCLENG` is the storage size.
    Column,
    /// A 2-byte little-endian unsigned length prefix sits at the column
    /// position; the value follows it.
    Prefix2,
    /// A 4-byte little-endian unsigned length prefix sits at the column
    /// position; the value follows it.
    Prefix4,
    /// Computed from the column descriptor and the type together.
    Computed,
}

/// Metadata for one column data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeInfo {
    pub kind: DataType,
    /// The 3-digit DB2 type code as it appears in `IXFCTYPE`.
    pub code: u16,
    /// Semantic name, as DB2 documents it.
    pub name: &'static str,
    pub rule: LengthRule,
}

impl TypeInfo {
    pub const fn new(kind: DataType, code: u16, name: &'static str, rule: LengthRule) -> TypeInfo {
        TypeInfo { kind, code, name, rule }
    }
}

macro_rules! data_types {
    ($(TYPDEF($name:ident, $code:literal, $label:literal, $rule:expr))*) => {
        paste! {
            /// The DB2 column data types this reader understands, keyed
            /// by their 3-digit `IXFCTYPE` codes.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum DataType {
                $($name,)*
            }

            impl DataType {
                $(
                    const [<$name:upper _INFO>]: TypeInfo =
                        TypeInfo::new(DataType::$name, $code, $label, $rule);
                )*

                pub fn from_code(code: u16) -> Option<DataType> {
                    match code {
                        $($code => Some(DataType::$name),)*
                        _ => None,
                    }
                }

                pub fn info(&self) -> TypeInfo {
                    match self {
                        $(DataType::$name => Self::[<$name:upper _INFO>],)*
                    }
                }
            }
        }
    };
}

data_types! {
    TYPDEF(Date,           384, "DATE",             LengthRule::Fixed(10))
    TYPDEF(Time,           388, "TIME",             LengthRule::Fixed(8))
    TYPDEF(Timestamp,      392, "TIMESTAMP",        LengthRule::Computed)
    TYPDEF(Blob,           404, "BLOB",             LengthRule::Prefix4)
    TYPDEF(Clob,           408, "CLOB",             LengthRule::Prefix4)
    TYPDEF(Dbclob,         412, "DBCLOB",           LengthRule::Prefix2)
    TYPDEF(Varchar,        448, "VARCHAR",          LengthRule::Prefix2)
    TYPDEF(Char,           452, "CHAR",             LengthRule::Column)
    TYPDEF(LongVarchar,    456, "LONGVARCHAR",      LengthRule::Prefix2)
    TYPDEF(Vargraphic,     464, "VARGRAPHIC",       LengthRule::Prefix2)
    TYPDEF(Graphic,        468, "GRAPHIC",          LengthRule::Column)
    TYPDEF(LongVargraphic, 472, "LONG VARGRAPHIC",  LengthRule::Prefix2)
    TYPDEF(Float,          480, "FLOATING POINT",   LengthRule::Computed)
    TYPDEF(Decimal,        484, "DECIMAL",          LengthRule::Computed)
    TYPDEF(Bigint,         492, "BIGINT",           LengthRule::Fixed(8))
    TYPDEF(Integer,        496, "INTEGER",          LengthRule::Fixed(4))
    TYPDEF(Smallint,       500, "SMALLINT",         LengthRule::Fixed(2))
    TYPDEF(Varbinary,      908, "VARBINARY",        LengthRule::Prefix2)
    TYPDEF(Binary,         912, "BINARY",           LengthRule::Column)
    TYPDEF(BlobFile,       916, "BLOB_FILE",        LengthRule::Prefix2)
    TYPDEF(ClobFile,       920, "CLOB_FILE",        LengthRule::Prefix2)
    TYPDEF(DbclobFile,     924, "DBCLOB_FILE",      LengthRule::Prefix2)
    TYPDEF(BlobLocation,   960, "BLOB_LOCATION",    LengthRule::Prefix2)
    TYPDEF(ClobLocation,   964, "CLOB_LOCATION",    LengthRule::Prefix2)
    TYPDEF(DbclobLocation, 968, "DBCLOB_LOCATION",  LengthRule::Prefix2)
    TYPDEF(Xml,            988, "XML",              LengthRule::Prefix4)
    TYPDEF(Decfloat,       996, "DECFLOAT",         LengthRule::Computed)
}

impl DataType {
    /// Types whose field starts with a `0xFF` byte when the value is
    /// NULL.
    pub fn has_null_sentinel(&self) -> bool {
        matches!(
            self,
            DataType::Date
                | DataType::Time
                | DataType::Timestamp
                | DataType::Char
                | DataType::Graphic
                | DataType::Binary
        )
    }

    /// The six locator/file types whose field is an ASCII
    /// `file.offset.length` reference into a side file.
    pub fn is_locator(&self) -> bool {
        matches!(
            self,
            DataType::BlobFile
                | DataType::ClobFile
                | DataType::DbclobFile
                | DataType::BlobLocation
                | DataType::ClobLocation
                | DataType::DbclobLocation
        )
    }

    /// Locator variants that reference character data and therefore carry
    /// the column's resolved encoding.
    pub fn locator_is_text(&self) -> bool {
        matches!(
            self,
            DataType::ClobFile
                | DataType::DbclobFile
                | DataType::ClobLocation
                | DataType::DbclobLocation
        )
    }
}

/// Per-column decoding context, fixed at schema freeze.
pub struct FieldContext<'a> {
    /// Resolved text decoder; `None` after an `UnknownCodePage`, in which
    /// case text fields surface as raw bytes.
    pub encoding: Option<&'static Encoding>,
    pub lob_folder: &'a Path,
}

/// Extracts one column's value from a `D` record's columnar data.
///
/// `data` is the whole `IXFDCOLS` slice; the column addresses it at its
/// own one-origin `pos`. The extractor never reads past the end of the
/// slice: a field that would overrun leaves the column absent with a
/// warning, and the row keeps going.
pub fn extract_field(col: &ColumnDescriptor, ctx: &FieldContext<'_>, data: &[u8]) -> Value {
    let pos = col.pos.saturating_sub(1);

    let Some(kind) = DataType::from_code(col.type_code) else {
        log::warn!(
            "column {:?}: unknown type code {}, passing {} raw bytes through",
            col.name,
            col.type_code,
            col.data_len
        );
        return match take(data, pos, col.data_len as usize) {
            Some(bytes) => Value::Raw(bytes.to_vec()),
            None => overrun(col, data.len()),
        };
    };

    if kind.has_null_sentinel() && data.get(pos) == Some(&0xFF) {
        return Value::Null;
    }

    match kind.info().rule {
        LengthRule::Fixed(len) => {
            let Some(bytes) = take(data, pos, len) else {
                return overrun(col, data.len());
            };
            match kind {
                DataType::Smallint => Value::Int(LittleEndian::read_i16(bytes) as i64),
                DataType::Integer => Value::Int(LittleEndian::read_i32(bytes) as i64),
                DataType::Bigint => Value::Int(LittleEndian::read_i64(bytes)),
                // DATE and TIME.
                _ => decode_text(col, ctx, bytes),
            }
        }

        LengthRule::Column => {
            let Some(bytes) = take(data, pos, col.data_len as usize) else {
                return overrun(col, data.len());
            };
            match kind {
                DataType::Binary => Value::Raw(bytes.to_vec()),
                // CHAR and GRAPHIC.
                _ => decode_text(col, ctx, bytes),
            }
        }

        LengthRule::Prefix2 => {
            let Some(prefix) = take(data, pos, 2) else {
                return overrun(col, data.len());
            };
            let len = LittleEndian::read_u16(prefix) as usize;
            let Some(bytes) = take(data, pos + 2, len) else {
                return overrun(col, data.len());
            };
            if kind.is_locator() {
                return locator_field(col, ctx, kind, bytes);
            }
            match kind {
                DataType::Varbinary => Value::Raw(bytes.to_vec()),
                // VARCHAR, LONGVARCHAR, VARGRAPHIC, LONG VARGRAPHIC,
                // DBCLOB.
                _ => decode_text(col, ctx, bytes),
            }
        }

        LengthRule::Prefix4 => {
            let Some(prefix) = take(data, pos, 4) else {
                return overrun(col, data.len());
            };
            let len = LittleEndian::read_u32(prefix) as usize;
            let Some(bytes) = take(data, pos + 4, len) else {
                return overrun(col, data.len());
            };
            match kind {
                DataType::Clob => decode_text(col, ctx, bytes),
                DataType::Xml => xml_field(col, ctx, bytes),
                // BLOB.
                _ => Value::Raw(bytes.to_vec()),
            }
        }

        LengthRule::Computed => match kind {
            DataType::Float => {
                let len = col.data_len as usize;
                let Some(bytes) = take(data, pos, len) else {
                    return overrun(col, data.len());
                };
                match len {
                    4 => Value::Float(LittleEndian::read_f32(bytes) as f64),
                    8 => Value::Float(LittleEndian::read_f64(bytes)),
                    _ => {
                        log::warn!(
                            "column {:?}: FLOATING POINT of width {} is not IEEE-754, keeping raw bytes",
                            col.name,
                            len
                        );
                        Value::Raw(bytes.to_vec())
                    }
                }
            }

            DataType::Decimal => {
                // Precision sits in the high half of IXFCLENG; a packed
                // decimal of precision P occupies (P+2)/2 bytes. Numeric
                // conversion is out of scope, the storage is surfaced
                // as-is.
                let precision = (col.data_len >> 16) as usize;
                let storage = (precision + 2) / 2;
                match take(data, pos, storage) {
                    Some(bytes) => Value::Raw(bytes.to_vec()),
                    None => overrun(col, data.len()),
                }
            }

            DataType::Decfloat => {
                let storage = if col.data_len == 16 { 8 } else { 16 };
                match take(data, pos, storage) {
                    Some(bytes) => Value::Raw(bytes.to_vec()),
                    None => overrun(col, data.len()),
                }
            }

            // TIMESTAMP: 20 bytes up to the seconds plus IXFCLENG
            // fractional digits. The NULL sentinel was handled above.
            _ => {
                let len = 20 + col.data_len as usize;
                match take(data, pos, len) {
                    Some(bytes) => decode_text(col, ctx, bytes),
                    None => overrun(col, data.len()),
                }
            }
        },
    }
}

fn take(data: &[u8], pos: usize, len: usize) -> Option<&[u8]> {
    data.get(pos..pos.checked_add(len)?)
}

fn overrun(col: &ColumnDescriptor, have: usize) -> Value {
    log::warn!(
        "column {:?}: field at position {} runs past the {} bytes of record data, leaving it absent",
        col.name,
        col.pos,
        have
    );
    Value::Null
}

fn decode_text(col: &ColumnDescriptor, ctx: &FieldContext<'_>, bytes: &[u8]) -> Value {
    let Some(encoding) = ctx.encoding else {
        return Value::Raw(bytes.to_vec());
    };
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!(
            "column {:?}: {} bytes do not decode as {}, keeping raw bytes",
            col.name,
            bytes.len(),
            encoding.name()
        );
        return Value::Raw(bytes.to_vec());
    }
    Value::Text(text.into_owned())
}

/// Locator payloads end in a sentinel byte; everything before it is the
/// ASCII `file.offset.length` reference.
fn locator_field(
    col: &ColumnDescriptor,
    ctx: &FieldContext<'_>,
    kind: DataType,
    bytes: &[u8],
) -> Value {
    let spec_bytes = &bytes[..bytes.len().saturating_sub(1)];
    let spec = String::from_utf8_lossy(spec_bytes);
    let encoding = if kind.locator_is_text() { ctx.encoding } else { None };
    match LobLocator::from_spec(spec.trim(), encoding, ctx.lob_folder) {
        Some(locator) => Value::Locator(locator),
        None => {
            log::warn!(
                "column {:?}: {:?} is not a file.offset.length locator, keeping raw bytes",
                col.name,
                spec
            );
            Value::Raw(bytes.to_vec())
        }
    }
}

fn xml_field(col: &ColumnDescriptor, ctx: &FieldContext<'_>, bytes: &[u8]) -> Value {
    let xds = String::from_utf8_lossy(bytes);
    match LobLocator::from_xds(&xds, ctx.encoding, ctx.lob_folder) {
        Some(locator) => Value::Locator(locator),
        None => {
            log::warn!(
                "column {:?}: payload is not an XML Data Specifier, keeping raw bytes",
                col.name
            );
            Value::Raw(bytes.to_vec())
        }
    }
}
