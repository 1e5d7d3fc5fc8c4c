//! Stub driver for targets without a mapping backend. Every open fails with
//! `Unsupported`; the handle type is uninhabited.

use crate::errors::{MmapViewError, Result};
use crate::mode::ModeSpec;

enum Never {}

/// Placeholder mapping handle; no value of this type can be constructed.
pub(crate) struct RawMapping {
    never: Never,
}

impl RawMapping {
    pub(crate) fn open(
        _name: &std::path::Path,
        _mode: &ModeSpec,
        _len: usize,
        _offset: u64,
    ) -> Result<Self> {
        Err(MmapViewError::Unsupported)
    }

    pub(crate) fn logical_ptr(&self) -> *mut u8 {
        match self.never {}
    }

    pub(crate) fn logical_len(&self) -> usize {
        match self.never {}
    }

    pub(crate) fn shift(&self) -> usize {
        match self.never {}
    }

    pub(crate) fn os_size(&self) -> usize {
        match self.never {}
    }
}
