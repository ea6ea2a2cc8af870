use encoding_rs::{Encoding, UTF_8};

use super::*;

/// Code page assumed when neither the caller, the column, the table, nor
/// the header names one.
pub const DEFAULT_CODE_PAGE: &str = "01200";

/// Maps an IXF code page string to a decoder.
///
/// Only the Unicode pages `01200` and `01208` are supported; both decode
/// as UTF-8 here. EBCDIC and the other national pages DB2 can emit fail
/// with [`IxfError::UnknownCodePage`], which the caller downgrades to a
/// per-column raw-bytes fallback.
pub fn lookup_code_page(code_page: &str) -> Result<&'static Encoding, IxfError> {
    match code_page.trim().trim_start_matches('0') {
        "1200" | "1208" => Ok(UTF_8),
        _ => Err(IxfError::UnknownCodePage(code_page.to_string())),
    }
}

/// Resolves the decoder for one column.
///
/// The first code page present wins: caller override, column double-byte,
/// column single-byte, table double-byte, table single-byte, header
/// double-byte, header single-byte, then [`DEFAULT_CODE_PAGE`]. The result
/// is a pure function of its four inputs.
pub fn resolve_code_page(
    override_cp: Option<&str>,
    column: Option<&ColumnDescriptor>,
    table: Option<&TableDescriptor>,
    header: Option<&FileHeader>,
) -> Result<&'static Encoding, IxfError> {
    let chain = [
        override_cp,
        column.and_then(|c| c.db_code_page.as_deref()),
        column.and_then(|c| c.sb_code_page.as_deref()),
        table.and_then(|t| t.db_code_page.as_deref()),
        table.and_then(|t| t.sb_code_page.as_deref()),
        header.and_then(|h| h.db_code_page.as_deref()),
        header.and_then(|h| h.sb_code_page.as_deref()),
    ];
    for code_page in chain.into_iter().flatten() {
        return lookup_code_page(code_page);
    }
    lookup_code_page(DEFAULT_CODE_PAGE)
}
