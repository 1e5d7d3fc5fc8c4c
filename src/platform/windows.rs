//! Win32 mapping driver: `CreateFileW`/`CreateFileMappingW`/`MapViewOfFile`.

use std::io;
use std::mem;
use std::ptr;

use log::{debug, trace};

use windows_sys::Win32::Foundation::{
    CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Security::SECURITY_ATTRIBUTES;
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, GetFileSizeEx, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE,
    OPEN_EXISTING,
};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, MapViewOfFile, UnmapViewOfFile, FILE_MAP_COPY, FILE_MAP_READ,
    FILE_MAP_WRITE, MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READONLY, PAGE_READWRITE, PAGE_WRITECOPY,
};

use crate::errors::{MmapViewError, Result};
use crate::mode::{Access, ModeSpec};
use crate::range::{self, MapWindow};
use crate::utils::{align_up, granularity};

/// Closes the handle on drop unless released; keeps the error paths in
/// `RawMapping::open` from leaking file or mapping-object handles.
struct HandleGuard(HANDLE);

impl HandleGuard {
    fn release(self) -> HANDLE {
        let handle = self.0;
        mem::forget(self);
        handle
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        // SAFETY: the guard owns the handle until released.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn file_size(file: HANDLE) -> Result<u64> {
    let mut size = 0i64;
    // SAFETY: file is a valid handle opened with at least read access.
    let ok = unsafe { GetFileSizeEx(file, &mut size) };
    if ok == 0 {
        return Err(MmapViewError::Io(io::Error::last_os_error()));
    }
    #[allow(clippy::cast_sign_loss)]
    Ok(size.max(0) as u64)
}

/// A live Win32 file mapping: file handle, mapping object, and mapped view.
pub(crate) struct RawMapping {
    view: MEMORY_MAPPED_VIEW_ADDRESS,
    os_size: usize,
    shift: usize,
    map_handle: HANDLE,
    file_handle: HANDLE,
}

// SAFETY: every field is written once in `open` and never mutated; the
// mapped view stays valid until Drop, so shared access from any thread only
// ever reads stable state.
unsafe impl Send for RawMapping {}
// SAFETY: see above; interior mutation of the mapped bytes is only reachable
// through exclusive borrows handed out by the owning view.
unsafe impl Sync for RawMapping {}

impl RawMapping {
    pub(crate) fn open(name: &[u16], mode: &ModeSpec, len: usize, offset: u64) -> Result<Self> {
        debug_assert_eq!(name.last(), Some(&0), "name must be NUL-terminated");
        let access = mode
            .access()
            .ok_or(MmapViewError::InvalidMode("mode selects neither read nor write"))?;
        if len == 0 && !mode.extend_to_end() {
            // Win32 has no representation for a zero-length view; MapViewOfFile
            // treats zero bytes-to-map as "to the end of the mapping".
            return Err(MmapViewError::ZeroSize);
        }

        let desired_access = match access {
            Access::Read => GENERIC_READ,
            Access::Write => GENERIC_READ | GENERIC_WRITE,
        };
        // Inheritance is decided atomically here, at handle creation.
        let security = SECURITY_ATTRIBUTES {
            nLength: mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
            lpSecurityDescriptor: ptr::null_mut(),
            bInheritHandle: i32::from(mode.is_inheritable()),
        };

        // SAFETY: name is NUL-terminated; the security attributes outlive
        // the call.
        let file = unsafe {
            CreateFileW(
                name.as_ptr(),
                desired_access,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                &security,
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if file == INVALID_HANDLE_VALUE {
            return Err(MmapViewError::Io(io::Error::last_os_error()));
        }
        let file_guard = HandleGuard(file);

        let size = file_size(file)?;
        let len = range::resolve_len(len, offset, mode.extend_to_end(), size)?;
        let MapWindow {
            os_offset,
            os_size,
            shift,
        } = range::window(len, offset, granularity())?;

        // The mapping object's maximum extent is the requested window rounded
        // up to the allocation granularity, clamped to the file size so a
        // writable mapping never grows the file.
        let rounded = align_up(os_size, granularity());
        let extent_end = os_offset
            .checked_add(rounded as u64)
            .ok_or(MmapViewError::RangeOverflow { len, offset })?;
        let max_extent = extent_end.min(size);

        let protect = match (access, mode.is_private()) {
            (Access::Read, _) => PAGE_READONLY,
            (Access::Write, false) => PAGE_READWRITE,
            (Access::Write, true) => PAGE_WRITECOPY,
        };
        // SAFETY: file is a valid handle; a null name keeps the mapping
        // object anonymous.
        let mapping = unsafe {
            CreateFileMappingW(
                file,
                &security,
                protect,
                (max_extent >> 32) as u32,
                (max_extent & 0xFFFF_FFFF) as u32,
                ptr::null(),
            )
        };
        if mapping.is_null() {
            return Err(MmapViewError::MapFailed(io::Error::last_os_error()));
        }
        let map_guard = HandleGuard(mapping);

        let view_access = match (access, mode.is_private()) {
            (Access::Read, _) => FILE_MAP_READ,
            (Access::Write, false) => FILE_MAP_READ | FILE_MAP_WRITE,
            (Access::Write, true) => FILE_MAP_COPY,
        };
        // SAFETY: mapping is a valid mapping object; offset and size were
        // validated against the clamped extent by the system call itself.
        let view = unsafe {
            MapViewOfFile(
                mapping,
                view_access,
                (os_offset >> 32) as u32,
                (os_offset & 0xFFFF_FFFF) as u32,
                os_size,
            )
        };
        if view.Value.is_null() {
            return Err(MmapViewError::MapFailed(io::Error::last_os_error()));
        }

        let map_handle = map_guard.release();
        let file_handle = file_guard.release();
        debug!("mapped view: os_offset={os_offset} os_size={os_size} shift={shift} max_extent={max_extent}");
        Ok(Self {
            view,
            os_size,
            shift,
            map_handle,
            file_handle,
        })
    }

    /// Base address of the logical view: the OS base plus the alignment
    /// shift.
    pub(crate) fn logical_ptr(&self) -> *mut u8 {
        // SAFETY: shift never exceeds os_size, so the offset pointer stays
        // inside the mapping or one past its end.
        unsafe { self.view.Value.cast::<u8>().add(self.shift) }
    }

    /// Byte count of the logical view.
    pub(crate) fn logical_len(&self) -> usize {
        self.os_size - self.shift
    }

    pub(crate) fn shift(&self) -> usize {
        self.shift
    }

    pub(crate) fn os_size(&self) -> usize {
        self.os_size
    }
}

impl Drop for RawMapping {
    fn drop(&mut self) {
        trace!("unmapping view: os_size={}", self.os_size);
        // Teardown mirrors acquisition in reverse: view, mapping object,
        // file handle.
        // SAFETY: each resource was acquired exactly once in `open` and is
        // released exactly once here.
        unsafe {
            UnmapViewOfFile(self.view);
            CloseHandle(self.map_handle);
            CloseHandle(self.file_handle);
        }
    }
}
