//! Platform mapping drivers.
//!
//! Exactly one driver is compiled per target. Each module exports the same
//! surface:
//!
//! * `pub struct RawMapping` — owns the OS handles and the mapped region
//! * `RawMapping::open(native_name, &ModeSpec, len, offset) -> Result<RawMapping>`
//! * `logical_ptr()` / `logical_len()` / `shift()` / `os_size()`
//! * `Drop` — unmaps, releases the mapping object where one exists, then
//!   closes the file handle, in that order

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        mod windows;
        pub(crate) use self::windows::RawMapping;
    } else if #[cfg(unix)] {
        mod unix;
        pub(crate) use self::unix::RawMapping;
    } else {
        mod unsupported;
        pub(crate) use self::unsupported::RawMapping;
    }
}
