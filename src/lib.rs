//! # mmap-view: byte-exact memory-mapped file views
//!
//! This crate maps arbitrary `(offset, length)` byte ranges of a file into
//! process address space and hides the platform's alignment rules from the
//! caller: the pointer you get back starts at exactly the offset you asked
//! for, whatever page or allocation granularity the OS imposed underneath.
//!
//! ## Features
//!
//! - **Byte-exact views**: request any offset; the alignment shift is
//!   handled internally
//! - **One interface, one backend per target**: POSIX (`mmap`) and Win32
//!   (`CreateFileMapping`/`MapViewOfFile`) drivers behind the same type
//! - **Small mode vocabulary**: read/write, extend-to-EOF, private
//!   (copy-on-write), inheritable handles
//! - **Three name encodings**: native paths, UTF-8 bytes, and wide (UTF-16)
//!   names all funnel into the same open path
//! - **No hidden global state**: every fallible operation returns a
//!   [`Result`]; there is no errno-style last-error slot
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmap_view::MappedView;
//!
//! // Map 100 bytes of data.bin starting at byte 4050.
//! let view = MappedView::open("data.bin", "r", 100, 4050)?;
//! assert_eq!(view.len(), 100);
//! for byte in view.as_slice() {
//!     // ...
//!     # let _ = byte;
//! }
//! # Ok::<(), mmap_view::MmapViewError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types for all operations
//! - [`mode`]: Mode string parsing (`"r"`, `"we"`, `"rpq"`, ...)
//! - [`range`]: Alignment arithmetic between caller ranges and OS windows
//! - [`encoding`]: Path name encoding converters
//! - [`view`]: The owned [`MappedView`] handle
//! - [`manager`]: Free-function conveniences

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/mmap-view")]

pub mod encoding;
pub mod errors;
pub mod manager;
pub mod mode;
mod platform;
pub mod range;
pub mod utils;
pub mod view;

pub use errors::{MmapViewError, Result};
pub use manager::{map_file, map_file_u8, map_file_wide};
pub use mode::{Access, ModeSpec};
pub use utils::granularity;
pub use view::MappedView;

/// Mapping backend compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// No backend; every open fails with [`MmapViewError::Unsupported`].
    None,
    /// POSIX `mmap` driver.
    Posix,
    /// Win32 `CreateFileMapping`/`MapViewOfFile` driver.
    Win32,
}

/// Report which mapping backend this build uses.
#[must_use]
pub fn platform_kind() -> PlatformKind {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            PlatformKind::Win32
        } else if #[cfg(unix)] {
            PlatformKind::Posix
        } else {
            PlatformKind::None
        }
    }
}

/// Whether the platform applies the non-inheritable flag atomically when the
/// file handle is created.
///
/// Win32 decides inheritance in the `CreateFileW` call itself, so the answer
/// there is `Some(true)`. The POSIX driver sets `FD_CLOEXEC` with a separate
/// `fcntl` after `open`, leaving a window in which a concurrent fork/exec
/// can inherit the descriptor; the answer there is `Some(false)`. `None`
/// means no backend is compiled in.
#[must_use]
pub fn inheritance_race_free() -> Option<bool> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            Some(true)
        } else if #[cfg(unix)] {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_kind_matches_target() {
        let kind = platform_kind();
        if cfg!(windows) {
            assert_eq!(kind, PlatformKind::Win32);
        } else if cfg!(unix) {
            assert_eq!(kind, PlatformKind::Posix);
        } else {
            assert_eq!(kind, PlatformKind::None);
        }
    }

    #[test]
    fn inheritance_race_query_is_consistent_with_backend() {
        match platform_kind() {
            PlatformKind::Win32 => assert_eq!(inheritance_race_free(), Some(true)),
            PlatformKind::Posix => assert_eq!(inheritance_race_free(), Some(false)),
            PlatformKind::None => assert_eq!(inheritance_race_free(), None),
        }
    }
}
