//! The mapped-view handle: an owned, byte-exact window into a file.

use std::path::Path;

use crate::errors::{MmapViewError, Result};
use crate::mode::{Access, ModeSpec};
use crate::platform::RawMapping;
use crate::utils::ensure_in_bounds;

/// An owned memory-mapped view of a byte range of a file.
///
/// The view is byte-exact: whatever alignment the OS imposed on the
/// underlying mapping is hidden, and [`as_slice`](Self::as_slice) starts at
/// exactly the offset that was requested. Dropping the view unmaps the
/// region and closes the file handle, in that order.
///
/// All fields are fixed at open time, so a view may be shared across threads
/// freely; writable access goes through `&mut self` and is therefore
/// exclusive by construction.
///
/// # Examples
///
/// ```no_run
/// use mmap_view::MappedView;
///
/// // Map 100 bytes starting at byte 4050 of the file.
/// let view = MappedView::open("data.bin", "r", 100, 4050)?;
/// assert_eq!(view.len(), 100);
/// let bytes: &[u8] = view.as_slice();
/// # let _ = bytes;
/// # Ok::<(), mmap_view::MmapViewError>(())
/// ```
pub struct MappedView {
    raw: RawMapping,
    access: Access,
    private: bool,
}

impl std::fmt::Debug for MappedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedView")
            .field("len", &self.len())
            .field("shift", &self.raw.shift())
            .field("os_size", &self.raw.os_size())
            .field("access", &self.access)
            .field("private", &self.private)
            .finish()
    }
}

impl MappedView {
    /// Open a file by native path and map `len` bytes starting at `offset`.
    ///
    /// `mode` accepts either a parsed [`ModeSpec`] or a mode string such as
    /// `"r"`, `"we"`, or `"rp"`. With the `e` (extend-to-end) flag, `len` is
    /// ignored and the view spans from `offset` to the current end of file.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::InvalidMode` if the mode selects no access,
    /// `Io` if the file cannot be opened, `RangeOverflow`/`ZeroSize` for
    /// unsatisfiable ranges, and `MapFailed` if the OS mapping call fails.
    /// On every failure all partially acquired OS resources have been
    /// released.
    pub fn open<P, M>(path: P, mode: M, len: usize, offset: u64) -> Result<Self>
    where
        P: AsRef<Path>,
        M: Into<ModeSpec>,
    {
        Self::open_native(path.as_ref(), &mode.into(), len, offset)
    }

    /// Open a file by UTF-8 encoded name.
    ///
    /// On POSIX targets the bytes are passed to `open` as-is (POSIX file
    /// names are byte strings). On Windows the name is validated and
    /// re-encoded to UTF-16 first; malformed UTF-8 fails before any
    /// filesystem call.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus `MmapViewError::Encoding` for invalid
    /// UTF-8 or an interior NUL byte.
    pub fn open_u8<M>(name: &[u8], mode: M, len: usize, offset: u64) -> Result<Self>
    where
        M: Into<ModeSpec>,
    {
        let mode = mode.into();
        #[cfg(unix)]
        {
            let name = std::ffi::CString::new(name)
                .map_err(|_| MmapViewError::Encoding("path contains an interior NUL byte"))?;
            let raw = RawMapping::open(&name, &mode, len, offset)?;
            Ok(Self::from_raw(raw, &mode))
        }
        #[cfg(windows)]
        {
            let wide = crate::encoding::utf8_to_wide(name)?;
            Self::open_wide_units(wide, &mode, len, offset)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = (name, mode, len, offset);
            Err(MmapViewError::Unsupported)
        }
    }

    /// Open a file by wide (UTF-16) name.
    ///
    /// On Windows the units are passed to `CreateFileW` directly. On POSIX
    /// targets the name is converted to the active locale's multibyte
    /// encoding first; call `setlocale` beforehand if the name is not
    /// ASCII.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus `MmapViewError::Encoding` for unpaired
    /// surrogates, an interior NUL, or characters the active locale cannot
    /// represent.
    pub fn open_wide<M>(name: &[u16], mode: M, len: usize, offset: u64) -> Result<Self>
    where
        M: Into<ModeSpec>,
    {
        let mode = mode.into();
        #[cfg(unix)]
        {
            let bytes = crate::encoding::wide_to_locale_bytes(name)?;
            let name = std::ffi::CString::new(bytes)
                .map_err(|_| MmapViewError::Encoding("path contains an interior NUL byte"))?;
            let raw = RawMapping::open(&name, &mode, len, offset)?;
            Ok(Self::from_raw(raw, &mode))
        }
        #[cfg(windows)]
        {
            Self::open_wide_units(name.to_vec(), &mode, len, offset)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = (name, mode, len, offset);
            Err(MmapViewError::Unsupported)
        }
    }

    fn open_native(path: &Path, mode: &ModeSpec, len: usize, offset: u64) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            let name = std::ffi::CString::new(path.as_os_str().as_bytes())
                .map_err(|_| MmapViewError::Encoding("path contains an interior NUL byte"))?;
            let raw = RawMapping::open(&name, mode, len, offset)?;
            Ok(Self::from_raw(raw, mode))
        }
        #[cfg(windows)]
        {
            use std::os::windows::ffi::OsStrExt;
            let wide: Vec<u16> = path.as_os_str().encode_wide().collect();
            Self::open_wide_units(wide, mode, len, offset)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let raw = RawMapping::open(path, mode, len, offset)?;
            Ok(Self::from_raw(raw, mode))
        }
    }

    #[cfg(windows)]
    fn open_wide_units(mut wide: Vec<u16>, mode: &ModeSpec, len: usize, offset: u64) -> Result<Self> {
        if wide.contains(&0) {
            return Err(MmapViewError::Encoding("path contains an interior NUL unit"));
        }
        wide.push(0);
        let raw = RawMapping::open(&wide, mode, len, offset)?;
        Ok(Self::from_raw(raw, mode))
    }

    fn from_raw(raw: RawMapping, mode: &ModeSpec) -> Self {
        // open() rejected access == None before mapping anything
        let access = mode.access().unwrap_or(Access::Read);
        Self {
            raw,
            access,
            private: mode.is_private(),
        }
    }

    /// Logical length of the view in bytes: exactly the requested length,
    /// or `file size - offset` for extend-to-end opens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.logical_len()
    }

    /// Whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pointer to the first byte of the logical view.
    ///
    /// The region is resident for the whole life of the handle, so this
    /// cannot fail. The pointer is dangling (but non-null) for an empty
    /// view.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.raw.logical_ptr()
    }

    /// The whole logical view as a byte slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the mapping stays valid and at least len() bytes long for
        // the lifetime of &self; writable aliases require &mut self.
        unsafe { std::slice::from_raw_parts(self.raw.logical_ptr(), self.len()) }
    }

    /// A bounds-checked sub-slice of the logical view.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::RangeOverflow` if `[offset, offset+len)` does
    /// not fit inside the view.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        ensure_in_bounds(offset, len, self.len())?;
        Ok(&self.as_slice()[offset..offset + len])
    }

    /// The whole logical view as a mutable byte slice.
    ///
    /// For a private mapping the writes land in this process's copy-on-write
    /// pages and never reach the backing file.
    ///
    /// # Errors
    ///
    /// Returns `MmapViewError::InvalidMode` if the view was opened
    /// read-only.
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        if self.access != Access::Write {
            return Err(MmapViewError::InvalidMode(
                "mutable access to a read-only mapping",
            ));
        }
        // SAFETY: the mapping is writable (PROT_WRITE / FILE_MAP_WRITE or
        // the copy-on-write equivalents) and &mut self guarantees
        // exclusivity.
        unsafe {
            Ok(std::slice::from_raw_parts_mut(
                self.raw.logical_ptr(),
                self.len(),
            ))
        }
    }

    /// Access mode the view was opened with.
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether writes are copy-on-write rather than shared.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Bytes of alignment padding hidden at the front of the underlying OS
    /// mapping: `requested offset mod granularity`.
    #[must_use]
    pub fn shift(&self) -> usize {
        self.raw.shift()
    }
}

#[cfg(all(test, any(unix, windows)))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn open_and_read_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("view.bin");
        fs::write(&path, b"0123456789").expect("write");

        let view = MappedView::open(&path, "r", 4, 3).expect("open");
        assert_eq!(view.len(), 4);
        assert_eq!(view.as_slice(), b"3456");
        assert_eq!(view.slice(1, 2).expect("slice"), b"45");
        assert!(view.slice(3, 2).is_err());
    }

    #[test]
    fn read_only_view_denies_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ro.bin");
        fs::write(&path, b"abcdef").expect("write");

        let mut view = MappedView::open(&path, "r", 6, 0).expect("open");
        assert_eq!(view.access(), Access::Read);
        assert!(matches!(
            view.as_mut_slice(),
            Err(MmapViewError::InvalidMode(_))
        ));
    }

    #[test]
    fn empty_mode_fails_at_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nomode.bin");
        fs::write(&path, b"abc").expect("write");

        assert!(matches!(
            MappedView::open(&path, "", 3, 0),
            Err(MmapViewError::InvalidMode(_))
        ));
    }

    #[test]
    fn missing_file_fails_with_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.bin");
        assert!(matches!(
            MappedView::open(&path, "r", 1, 0),
            Err(MmapViewError::Io(_))
        ));
    }

    #[test]
    fn interior_nul_in_path_is_an_encoding_error() {
        assert!(matches!(
            MappedView::open_u8(b"bad\0name", "r", 1, 0),
            Err(MmapViewError::Encoding(_))
        ));
    }
}
