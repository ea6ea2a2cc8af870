use std::fmt;
use std::path::PathBuf;

use encoding_rs::Encoding;

use super::*;

/// Extracts the inner value of a [`Value`] variant, panicking on a
/// mismatch. Test and sink helper.
#[macro_export]
macro_rules! cast_value {
    ($variant:path, $expr:expr) => {
        match $expr {
            $variant(x) => x,
            other => panic!("failed to cast {:?} to {}", other, stringify!($variant)),
        }
    };
}

/// One decoded field slot of a row.
///
/// `Null` covers both SQL NULL sentinels and fields the extractor had to
/// give up on (the row keeps going either way). `Raw` carries bytes for
/// the types this tool does not interpret: BINARY, VARBINARY, BLOB,
/// DECIMAL and DECFLOAT storage, and anything with an unknown type code
/// or code page.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Raw(Vec<u8>),
    Locator(LobLocator),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Raw(bytes) => f.write_str(&hex_string(bytes)),
            Value::Locator(l) => write!(f, "{}", l),
        }
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// A reference into a LOB side file: `file.offset.length`, where the file
/// name may itself contain dots, so the string form splits on the last
/// two.
///
/// Textual variants (CLOB/DBCLOB locators and files, XML) carry the
/// column's resolved encoding; binary ones do not. The folder the
/// reference resolves against travels with the locator so sinks can fetch
/// the payload without the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct LobLocator {
    pub file: String,
    pub offset: u64,
    pub length: u64,
    pub encoding: Option<&'static Encoding>,
    pub lob_folder: PathBuf,
}

impl LobLocator {
    /// Parses the `file.offset.length` string form.
    pub fn from_spec(
        spec: &str,
        encoding: Option<&'static Encoding>,
        lob_folder: &std::path::Path,
    ) -> Option<LobLocator> {
        let (rest, length) = spec.rsplit_once('.')?;
        let (file, offset) = rest.rsplit_once('.')?;
        if file.is_empty() {
            return None;
        }
        Some(LobLocator {
            file: file.to_string(),
            offset: offset.trim().parse().ok()?,
            length: length.trim().parse().ok()?,
            encoding,
            lob_folder: lob_folder.to_path_buf(),
        })
    }

    /// Parses an XML Data Specifier, `<XDS FIL='f' OFF='n' LEN='m' />`.
    /// Attribute order does not matter and both quote styles are
    /// accepted.
    pub fn from_xds(
        xds: &str,
        encoding: Option<&'static Encoding>,
        lob_folder: &std::path::Path,
    ) -> Option<LobLocator> {
        let xds = xds.trim();
        if !xds.starts_with("<XDS") {
            return None;
        }
        Some(LobLocator {
            file: xds_attr(xds, "FIL")?.to_string(),
            offset: xds_attr(xds, "OFF")?.parse().ok()?,
            length: xds_attr(xds, "LEN")?.parse().ok()?,
            encoding,
            lob_folder: lob_folder.to_path_buf(),
        })
    }

    /// Fetches the `[offset, offset + length)` byte range from the side
    /// file. See [`fetch_lob`](crate::fetch_lob) for the path search order.
    pub fn read(&self) -> Result<Vec<u8>, IxfError> {
        fetch_lob(self)
    }

    /// Fetches and, for textual variants, decodes the payload.
    pub fn read_value(&self) -> Result<Value, IxfError> {
        fetch_lob_value(self)
    }
}

impl fmt::Display for LobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.file, self.offset, self.length)
    }
}

fn xds_attr<'a>(xds: &'a str, name: &str) -> Option<&'a str> {
    let mut search = xds;
    loop {
        let at = search.find(name)?;
        let rest = search[at + name.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            search = &search[at + name.len()..];
            continue;
        };
        let rest = rest.trim_start();
        let quote = rest.chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let rest = &rest[1..];
        return rest.split(quote).next();
    }
}
