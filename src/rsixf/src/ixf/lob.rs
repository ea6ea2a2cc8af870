use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::*;

/// Materialises a locator's byte range.
///
/// The side file is looked up as the literal path first, then under the
/// locator's LOB folder, then by a recursive basename search below that
/// folder. Lookup, open, seek, and short-read failures all come back as
/// [`IxfError::LobFetchFailed`] so the sink can decide what to do with
/// the slot; the decoder itself never fails a row over it.
pub fn fetch_lob(locator: &LobLocator) -> Result<Vec<u8>, IxfError> {
    let path = resolve_path(locator)?;
    let fail = |source| IxfError::LobFetchFailed { path: path.clone(), source };

    let mut file = File::open(&path).map_err(fail)?;
    file.seek(SeekFrom::Start(locator.offset)).map_err(fail)?;
    let mut payload = vec![0u8; locator.length as usize];
    file.read_exact(&mut payload).map_err(fail)?;
    Ok(payload)
}

/// Fetches the range and decodes it when the locator carries an encoding.
pub fn fetch_lob_value(locator: &LobLocator) -> Result<Value, IxfError> {
    let payload = fetch_lob(locator)?;
    let Some(encoding) = locator.encoding else {
        return Ok(Value::Raw(payload));
    };
    let (text, _, had_errors) = encoding.decode(&payload);
    if had_errors {
        log::warn!(
            "LOB {:?} does not decode as {}, keeping raw bytes",
            locator.file,
            encoding.name()
        );
        return Ok(Value::Raw(payload));
    }
    Ok(Value::Text(text.into_owned()))
}

fn resolve_path(locator: &LobLocator) -> Result<PathBuf, IxfError> {
    let literal = PathBuf::from(&locator.file);
    if literal.is_file() {
        return Ok(literal);
    }

    let in_folder = locator.lob_folder.join(&locator.file);
    if in_folder.is_file() {
        return Ok(in_folder);
    }

    let base_name = literal.file_name().map(|n| n.to_os_string());
    if let Some(base_name) = base_name {
        if let Some(found) = find_by_name(&locator.lob_folder, &base_name) {
            return Ok(found);
        }
    }

    Err(IxfError::LobFetchFailed {
        path: in_folder,
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such LOB side file"),
    })
}

fn find_by_name(dir: &Path, base_name: &std::ffi::OsStr) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && path.file_name() == Some(base_name) {
            return Some(path);
        }
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.iter().find_map(|d| find_by_name(d, base_name))
}
