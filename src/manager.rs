//! High-level convenience functions over [`MappedView`].

use std::path::Path;

use crate::errors::Result;
use crate::mode::ModeSpec;
use crate::view::MappedView;

/// Map `len` bytes of the file at `path` starting at `offset`.
///
/// Thin wrapper over [`MappedView::open`].
///
/// # Errors
///
/// Returns errors from `MappedView::open`.
pub fn map_file<P, M>(path: P, mode: M, len: usize, offset: u64) -> Result<MappedView>
where
    P: AsRef<Path>,
    M: Into<ModeSpec>,
{
    MappedView::open(path, mode, len, offset)
}

/// Map a byte range of a file named by a UTF-8 encoded name.
///
/// # Errors
///
/// Returns errors from `MappedView::open_u8`.
pub fn map_file_u8<M>(name: &[u8], mode: M, len: usize, offset: u64) -> Result<MappedView>
where
    M: Into<ModeSpec>,
{
    MappedView::open_u8(name, mode, len, offset)
}

/// Map a byte range of a file named by a wide (UTF-16) name.
///
/// # Errors
///
/// Returns errors from `MappedView::open_wide`.
pub fn map_file_wide<M>(name: &[u16], mode: M, len: usize, offset: u64) -> Result<MappedView>
where
    M: Into<ModeSpec>,
{
    MappedView::open_wide(name, mode, len, offset)
}
