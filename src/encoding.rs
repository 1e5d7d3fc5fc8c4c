//! Path name encoding converters.
//!
//! The open functions accept names in three forms: platform-native, UTF-8,
//! and wide (UTF-16). The converters here bridge those forms to whatever the
//! target platform's file-open primitive requires. Malformed input always
//! fails with [`MmapViewError::Encoding`]; nothing is ever silently replaced,
//! and the failure is raised before any filesystem call.
//!
//! Every converter sizes its output in a first pass, allocates exactly once,
//! then converts in a second pass.

use crate::errors::{MmapViewError, Result};

const ERR_UTF8: &str = "invalid UTF-8 sequence in path name";
const ERR_UTF16: &str = "unpaired surrogate in path name";
#[cfg(unix)]
const ERR_LOCALE: &str = "path name not representable in the active locale";

/// Decode one scalar value from UTF-8 `bytes` starting at `i`.
/// Returns the code point and the number of bytes consumed.
fn decode_utf8_at(bytes: &[u8], i: usize) -> Result<(u32, usize)> {
    let b0 = bytes[i];
    let (len, init) = match b0 {
        0x00..=0x7F => return Ok((u32::from(b0), 1)),
        // 0xC0 and 0xC1 can only start overlong encodings
        0xC2..=0xDF => (2, u32::from(b0 & 0x1F)),
        0xE0..=0xEF => (3, u32::from(b0 & 0x0F)),
        0xF0..=0xF4 => (4, u32::from(b0 & 0x07)),
        _ => return Err(MmapViewError::Encoding(ERR_UTF8)),
    };
    if i + len > bytes.len() {
        return Err(MmapViewError::Encoding(ERR_UTF8));
    }
    let mut cp = init;
    for &b in &bytes[i + 1..i + len] {
        if b & 0xC0 != 0x80 {
            return Err(MmapViewError::Encoding(ERR_UTF8));
        }
        cp = (cp << 6) | u32::from(b & 0x3F);
    }
    let min = match len {
        2 => 0x80,
        3 => 0x800,
        _ => 0x1_0000,
    };
    // Overlong forms, the UTF-16 surrogate block, and anything at or above
    // U+110000 are all invalid scalar values.
    if cp < min || cp >= 0x11_0000 || (0xD800..0xE000).contains(&cp) {
        return Err(MmapViewError::Encoding(ERR_UTF8));
    }
    Ok((cp, len))
}

/// Decode one scalar value from UTF-16 `units` starting at `i`.
/// Returns the code point and the number of units consumed.
fn decode_utf16_at(units: &[u16], i: usize) -> Result<(u32, usize)> {
    let u0 = units[i];
    match u0 {
        0xD800..=0xDBFF => {
            let lo = *units
                .get(i + 1)
                .ok_or(MmapViewError::Encoding(ERR_UTF16))?;
            if !(0xDC00..=0xDFFF).contains(&lo) {
                return Err(MmapViewError::Encoding(ERR_UTF16));
            }
            let cp = 0x1_0000 + ((u32::from(u0) - 0xD800) << 10) + (u32::from(lo) - 0xDC00);
            Ok((cp, 2))
        }
        0xDC00..=0xDFFF => Err(MmapViewError::Encoding(ERR_UTF16)),
        _ => Ok((u32::from(u0), 1)),
    }
}

/// Convert a UTF-8 name to UTF-16.
///
/// Code points at or beyond U+10000 become surrogate pairs. The output
/// carries no terminator.
///
/// # Errors
///
/// Returns `MmapViewError::Encoding` for truncated or malformed continuation
/// sequences, overlong forms, surrogate code points, and values at or above
/// U+110000.
pub fn utf8_to_wide(name: &[u8]) -> Result<Vec<u16>> {
    // Sizing pass
    let mut units = 0usize;
    let mut i = 0;
    while i < name.len() {
        let (cp, adv) = decode_utf8_at(name, i)?;
        units += if cp >= 0x1_0000 { 2 } else { 1 };
        i += adv;
    }
    // Conversion pass into an exact-sized buffer
    let mut out = Vec::with_capacity(units);
    i = 0;
    while i < name.len() {
        let (cp, adv) = decode_utf8_at(name, i)?;
        if cp >= 0x1_0000 {
            let v = cp - 0x1_0000;
            out.push(0xD800 | (v >> 10) as u16);
            out.push(0xDC00 | (v & 0x3FF) as u16);
        } else {
            out.push(cp as u16);
        }
        i += adv;
    }
    Ok(out)
}

/// Convert a wide (UTF-16) name to UTF-8.
///
/// # Errors
///
/// Returns `MmapViewError::Encoding` for unpaired surrogates.
pub fn wide_to_utf8(name: &[u16]) -> Result<Vec<u8>> {
    fn utf8_len(cp: u32) -> usize {
        match cp {
            0..=0x7F => 1,
            0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 4,
        }
    }

    // Sizing pass
    let mut bytes = 0usize;
    let mut i = 0;
    while i < name.len() {
        let (cp, adv) = decode_utf16_at(name, i)?;
        bytes += utf8_len(cp);
        i += adv;
    }
    // Conversion pass
    let mut out = Vec::with_capacity(bytes);
    i = 0;
    while i < name.len() {
        let (cp, adv) = decode_utf16_at(name, i)?;
        match utf8_len(cp) {
            1 => out.push(cp as u8),
            2 => {
                out.push(0xC0 | (cp >> 6) as u8);
                out.push(0x80 | (cp & 0x3F) as u8);
            }
            3 => {
                out.push(0xE0 | (cp >> 12) as u8);
                out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
                out.push(0x80 | (cp & 0x3F) as u8);
            }
            _ => {
                out.push(0xF0 | (cp >> 18) as u8);
                out.push(0x80 | ((cp >> 12) & 0x3F) as u8);
                out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
                out.push(0x80 | (cp & 0x3F) as u8);
            }
        }
        i += adv;
    }
    Ok(out)
}

#[cfg(unix)]
extern "C" {
    // `libc` 0.2 does not export a binding for the re-entrant `wcsrtombs`,
    // so we declare it here matching the POSIX signature.
    fn wcsrtombs(
        dest: *mut libc::c_char,
        src: *mut *const libc::wchar_t,
        len: libc::size_t,
        ps: *mut libc::mbstate_t,
    ) -> libc::size_t;
}

/// Convert a wide (UTF-16) name to the active locale's multibyte encoding.
///
/// Uses `wcsrtombs` with an explicit conversion state, the re-entrant form;
/// the stateful `wcstombs` is never used. Sizing follows the same two-pass
/// discipline as the other converters: `wcsrtombs` is first called with a
/// null destination to measure, then again into an exact-sized buffer.
///
/// # Errors
///
/// Returns `MmapViewError::Encoding` if the name contains an unpaired
/// surrogate or a character the active locale cannot represent.
#[cfg(unix)]
pub fn wide_to_locale_bytes(name: &[u16]) -> Result<Vec<u8>> {
    use std::mem;
    use std::ptr;

    // Widen to wchar_t, decoding surrogate pairs, with a terminator for
    // wcsrtombs.
    let mut wide: Vec<libc::wchar_t> = Vec::with_capacity(name.len() + 1);
    let mut i = 0;
    while i < name.len() {
        let (cp, adv) = decode_utf16_at(name, i)?;
        #[allow(clippy::cast_possible_wrap)]
        wide.push(cp as libc::wchar_t);
        i += adv;
    }
    wide.push(0);

    // Sizing pass with a null output buffer
    let needed = {
        let mut state: libc::mbstate_t = unsafe { mem::zeroed() };
        let mut src = wide.as_ptr();
        // SAFETY: src points at a NUL-terminated wchar_t string; a null
        // destination makes wcsrtombs measure without writing.
        unsafe { wcsrtombs(ptr::null_mut(), &mut src, 0, &mut state) }
    };
    if needed == usize::MAX {
        return Err(MmapViewError::Encoding(ERR_LOCALE));
    }

    // Conversion pass into an exact-sized buffer plus terminator
    let mut out = vec![0u8; needed + 1];
    let written = {
        let mut state: libc::mbstate_t = unsafe { mem::zeroed() };
        let mut src = wide.as_ptr();
        // SAFETY: the destination holds needed+1 bytes, enough for the
        // measured conversion and its terminator.
        unsafe {
            wcsrtombs(
                out.as_mut_ptr().cast::<libc::c_char>(),
                &mut src,
                needed + 1,
                &mut state,
            )
        }
    };
    if written == usize::MAX {
        return Err(MmapViewError::Encoding(ERR_LOCALE));
    }
    out.truncate(written);
    Ok(out)
}
