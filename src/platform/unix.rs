//! POSIX mapping driver: `open`/`fstat`/`mmap`/`munmap`/`close`.

use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;
use std::ptr;

use log::{debug, trace};

use crate::errors::{MmapViewError, Result};
use crate::mode::{Access, ModeSpec};
use crate::range::{self, MapWindow};
use crate::utils::granularity;

/// Closes the descriptor on drop unless released; keeps the error paths in
/// `RawMapping::open` from leaking a half-opened file.
struct FdGuard(libc::c_int);

impl FdGuard {
    fn release(self) -> libc::c_int {
        let fd = self.0;
        std::mem::forget(self);
        fd
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        // SAFETY: the guard owns the descriptor until released.
        unsafe {
            libc::close(self.0);
        }
    }
}

fn file_size(fd: libc::c_int) -> Result<u64> {
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: fstat fills the whole struct on success.
    let rc = unsafe { libc::fstat(fd, st.as_mut_ptr()) };
    if rc != 0 {
        return Err(MmapViewError::Io(io::Error::last_os_error()));
    }
    // SAFETY: rc == 0 means st was initialized.
    let st = unsafe { st.assume_init() };
    #[allow(clippy::cast_sign_loss)]
    Ok(st.st_size.max(0) as u64)
}

/// A live POSIX file mapping.
///
/// On POSIX the mapping is the descriptor's projection; there is no separate
/// mapping object to track. A zero-sized request keeps `ptr` null and never
/// calls `mmap` (which rejects zero lengths), so an empty view is still a
/// valid handle.
pub(crate) struct RawMapping {
    ptr: *mut libc::c_void,
    os_size: usize,
    shift: usize,
    fd: libc::c_int,
}

// SAFETY: every field is written once in `open` and never mutated; the
// mapped region stays valid until Drop, so shared access from any thread
// only ever reads stable state.
unsafe impl Send for RawMapping {}
// SAFETY: see above; interior mutation of the mapped bytes is only reachable
// through exclusive borrows handed out by the owning view.
unsafe impl Sync for RawMapping {}

impl RawMapping {
    pub(crate) fn open(name: &CStr, mode: &ModeSpec, len: usize, offset: u64) -> Result<Self> {
        let access = mode
            .access()
            .ok_or(MmapViewError::InvalidMode("mode selects neither read nor write"))?;
        let oflag = match access {
            Access::Read => libc::O_RDONLY,
            Access::Write => libc::O_RDWR,
        };

        // SAFETY: name is NUL-terminated and the flags carry no creation
        // bits, so no mode argument is needed.
        let fd = unsafe { libc::open(name.as_ptr(), oflag) };
        if fd < 0 {
            return Err(MmapViewError::Io(io::Error::last_os_error()));
        }
        let guard = FdGuard(fd);

        if !mode.is_inheritable() {
            // The descriptor is inheritable between open() and this fcntl();
            // a concurrent fork/exec in that window still sees it. The race
            // is reported by `inheritance_race_free()` rather than hidden.
            // SAFETY: fd is owned by the guard and valid.
            let rc = unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) };
            if rc != 0 {
                return Err(MmapViewError::Io(io::Error::last_os_error()));
            }
        }

        let len = if mode.extend_to_end() {
            range::resolve_len(len, offset, true, file_size(fd)?)?
        } else {
            len
        };
        let MapWindow {
            os_offset,
            os_size,
            shift,
        } = range::window(len, offset, granularity())?;
        let os_offset = libc::off_t::try_from(os_offset)
            .map_err(|_| MmapViewError::RangeOverflow { len, offset })?;

        let ptr = if os_size == 0 {
            // Only reachable for an aligned zero-length request. POSIX lets
            // such an open succeed with an empty view; mmap itself would
            // fail with EINVAL, so it is skipped.
            ptr::null_mut()
        } else {
            let prot = match access {
                Access::Read => libc::PROT_READ,
                Access::Write => libc::PROT_READ | libc::PROT_WRITE,
            };
            let flags = if mode.is_private() {
                libc::MAP_PRIVATE
            } else {
                libc::MAP_SHARED
            };
            // SAFETY: fd is valid, os_offset is page-aligned, os_size is
            // non-zero; the OS picks the base address.
            let ptr = unsafe { libc::mmap(ptr::null_mut(), os_size, prot, flags, fd, os_offset) };
            if ptr == libc::MAP_FAILED {
                return Err(MmapViewError::MapFailed(io::Error::last_os_error()));
            }
            ptr
        };

        let fd = guard.release();
        debug!("mapped fd {fd}: os_offset={os_offset} os_size={os_size} shift={shift}");
        Ok(Self {
            ptr,
            os_size,
            shift,
            fd,
        })
    }

    /// Base address of the logical view: the OS base plus the alignment
    /// shift. Dangling (but well-aligned and non-null) for an empty view.
    pub(crate) fn logical_ptr(&self) -> *mut u8 {
        if self.ptr.is_null() {
            ptr::NonNull::<u8>::dangling().as_ptr()
        } else {
            // SAFETY: shift never exceeds os_size, so the offset pointer
            // stays inside the mapping or one past its end.
            unsafe { self.ptr.cast::<u8>().add(self.shift) }
        }
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
        trace!("unmapping fd {}: os_size={}", self.fd, self.os_size);
        if !self.ptr.is_null() {
            // SAFETY: ptr/os_size describe exactly one live mapping created
            // in `open`; unmap strictly before closing the descriptor.
            unsafe {
                libc::munmap(self.ptr, self.os_size);
            }
        }
        // SAFETY: the descriptor is owned and still open.
        unsafe {
            libc::close(self.fd);
        }
    }
}
