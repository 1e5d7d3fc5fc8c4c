//! Crate-specific error types for mmap-view.

use std::io;
use thiserror::Error;

/// Result alias for mmap-view operations.
pub type Result<T> = std::result::Result<T, MmapViewError>;

/// Error type covering file opening, path encoding, range arithmetic, and
/// mapping-primitive failures.
///
/// Every fallible operation in this crate returns a `Result` carrying one of
/// these variants; there is no process-wide last-error slot to query.
#[derive(Debug, Error)]
pub enum MmapViewError {
    /// Wrapper for `std::io::Error` raised while opening or inspecting the
    /// backing file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The mode string selected no access, or an operation was attempted in
    /// an incompatible mode.
    #[error("invalid access mode: {0}")]
    InvalidMode(&'static str),

    /// The requested range cannot be represented: adding the alignment shift
    /// to the length overflows, or an extend-to-end offset lies past the end
    /// of the file.
    #[error("range overflow: len={len}, offset={offset}")]
    RangeOverflow {
        /// Requested length.
        len: usize,
        /// Requested file offset.
        offset: u64,
    },

    /// A zero-length, non-extending view was requested on a platform that
    /// cannot represent one (Win32).
    #[error("zero-length views are not representable on this platform")]
    ZeroSize,

    /// A path name failed encoding conversion. Raised before any filesystem
    /// call is attempted.
    #[error("path encoding error: {0}")]
    Encoding(&'static str),

    /// The OS mapping primitive itself failed. Any file handle or mapping
    /// object acquired earlier in the call has already been released.
    #[error("mapping failed: {0}")]
    MapFailed(io::Error),

    /// No mapping backend is compiled in for this target.
    #[error("no mapping backend compiled for this platform")]
    Unsupported,
}
