use std::path::PathBuf;

use thiserror::Error;

/// Faults that stop the decoder.
///
/// Everything recoverable stays off this enum: unknown record types are
/// counted and skipped, unknown column type codes and failed text decodes
/// fall back to raw bytes, and all of those are reported on the `log`
/// channel instead so a partially corrupt file still yields as many good
/// rows as possible.
#[derive(Debug, Error)]
pub enum IxfError {
    /// The input ended in the middle of a record, or a record length
    /// prefix was not a decimal number.
    #[error("input ended in the middle of a record")]
    Truncated,

    /// A record announced a length above the 64 MiB cap.
    #[error("record of {0} bytes exceeds the 64 MiB record cap")]
    RecordTooLarge(usize),

    /// A code page other than the supported UTF-8 pages was requested.
    #[error("unsupported code page {0:?}")]
    UnknownCodePage(String),

    /// A LOB side file could not be located, opened, or read in full.
    #[error("cannot fetch LOB data from {path:?}")]
    LobFetchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
