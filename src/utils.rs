//! Utility helpers for alignment, mapping granularity, and safe range checks.

use crate::errors::{MmapViewError, Result};

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        /// Get the platform's mapping alignment granularity in bytes.
        ///
        /// On Windows this is the allocation granularity (usually 64 KiB),
        /// which governs the alignment of `MapViewOfFile` offsets. It is
        /// distinct from, and larger than, the page size.
        #[must_use]
        pub fn granularity() -> usize {
            use std::mem::MaybeUninit;
            use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

            let mut sysinfo = MaybeUninit::<SYSTEM_INFO>::uninit();
            // SAFETY: GetSystemInfo always succeeds and fills the whole struct.
            unsafe {
                GetSystemInfo(sysinfo.as_mut_ptr());
                sysinfo.assume_init().dwAllocationGranularity as usize
            }
        }
    } else if #[cfg(unix)] {
        /// Get the platform's mapping alignment granularity in bytes.
        ///
        /// On POSIX systems `mmap` offsets must be multiples of the page size.
        #[must_use]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        pub fn granularity() -> usize {
            // SAFETY: sysconf with _SC_PAGESIZE is always safe to call.
            unsafe { libc::sysconf(libc::_SC_PAGESIZE).max(0) as usize }
        }
    } else {
        /// Get the platform's mapping alignment granularity in bytes.
        ///
        /// Zero on targets without a mapping backend; range normalization
        /// treats zero as "no alignment information".
        #[must_use]
        pub fn granularity() -> usize {
            0
        }
    }
}

/// Align a value up to the nearest multiple of `alignment`.
#[must_use]
pub fn align_up(value: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return value;
    }
    // Fast path for power-of-2 alignments (the common case for page and
    // allocation granularities)
    if alignment.is_power_of_two() {
        let mask = alignment - 1;
        (value + mask) & !mask
    } else {
        value.div_ceil(alignment) * alignment
    }
}

/// Ensure the requested [offset, offset+len) range is within [0, total).
/// Returns `Ok(())` if valid; otherwise a `RangeOverflow` error.
///
/// # Errors
///
/// Returns `MmapViewError::RangeOverflow` if the range exceeds bounds.
pub fn ensure_in_bounds(offset: usize, len: usize, total: usize) -> Result<()> {
    let out_of_bounds = MmapViewError::RangeOverflow {
        len,
        offset: offset as u64,
    };
    if offset > total {
        return Err(out_of_bounds);
    }
    if offset.saturating_add(len) > total {
        return Err(out_of_bounds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_powers_of_two() {
        assert_eq!(align_up(0, 4096), 0);
        assert_eq!(align_up(1, 4096), 4096);
        assert_eq!(align_up(4096, 4096), 4096);
        assert_eq!(align_up(4097, 4096), 8192);
        assert_eq!(align_up(100, 65536), 65536);
    }

    #[test]
    fn align_up_degenerate_alignment() {
        assert_eq!(align_up(123, 0), 123);
        assert_eq!(align_up(123, 1), 123);
        // Non-power-of-two alignments still round correctly
        assert_eq!(align_up(10, 3), 12);
    }

    #[test]
    fn bounds_checks() {
        assert!(ensure_in_bounds(0, 10, 10).is_ok());
        assert!(ensure_in_bounds(10, 0, 10).is_ok());
        assert!(ensure_in_bounds(11, 0, 10).is_err());
        assert!(ensure_in_bounds(5, 6, 10).is_err());
        assert!(ensure_in_bounds(usize::MAX, 1, usize::MAX).is_err());
    }

    #[test]
    fn granularity_is_power_of_two_on_supported_targets() {
        let g = granularity();
        if cfg!(any(unix, windows)) {
            assert!(g.is_power_of_two(), "granularity {g} not a power of two");
        }
    }
}
