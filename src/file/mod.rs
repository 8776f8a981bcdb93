//! Owning byte container and bounds-checked access primitives.
//!
//! A typelib is parsed out of a single immutable byte buffer. This module provides
//! the two backends for owning that buffer (an in-memory vector and a memory-mapped
//! file) together with the access primitives every higher layer goes through:
//! [`bytes_at`] for typed windows, [`string_at`] for NUL-terminated string pool
//! lookups, and [`validate_name`] for identifier hygiene.
//!
//! No layer above this one touches the raw slice directly; all offsets and counts in
//! a typelib are attacker-controlled, so every access is bounds-checked here.

pub mod io;

use std::ffi::CStr;
use std::fs;
use std::path::Path;

use memmap2::Mmap;

use crate::Result;

/// Maximum length of a name in the string pool, including the NUL terminator.
pub const MAX_NAME_LEN: usize = 2048;

/// The owning byte container behind a typelib.
///
/// Mirrors the two ways a typelib reaches memory: read into an owned buffer, or
/// memory-mapped from disk. Both are immutable once constructed.
pub(crate) enum TypelibData {
    /// Typelib bytes held in an owned memory buffer
    Memory(Vec<u8>),
    /// Typelib bytes memory-mapped from a file on disk
    Mapped(Mmap),
}

impl TypelibData {
    /// Load a typelib container by memory-mapping the file at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`](crate::Error::FileError) if the file cannot be
    /// opened or mapped.
    pub(crate) fn from_path(path: &Path) -> Result<TypelibData> {
        let file = fs::File::open(path)?;

        // Safety: the map is read-only and the typelib contract requires the backing
        // file to stay unmodified for the lifetime of the container.
        let map = unsafe { Mmap::map(&file)? };

        Ok(TypelibData::Mapped(map))
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            TypelibData::Memory(data) => data,
            TypelibData::Mapped(map) => map,
        }
    }
}

/// Returns true if `offset` is aligned to a 4-byte boundary.
#[must_use]
pub(crate) fn is_aligned(offset: u32) -> bool {
    offset % 4 == 0
}

/// Get a window of `n` bytes starting at `offset`.
///
/// # Errors
/// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the window
/// would extend past the end of the buffer.
pub(crate) fn bytes_at(data: &[u8], offset: u32, n: usize) -> Result<&[u8]> {
    let start = offset as usize;
    let end = start.checked_add(n).ok_or_else(|| {
        typelib_error!(
            TruncatedBuffer,
            "Window of {} bytes at offset {} overflows",
            n,
            offset
        )
    })?;

    if end > data.len() {
        return Err(typelib_error!(
            TruncatedBuffer,
            "The buffer is too short: {} bytes needed at offset {}, length {}",
            n,
            offset,
            data.len()
        ));
    }

    Ok(&data[start..end])
}

/// Resolve `offset` into the string pool as a NUL-terminated string.
///
/// The returned string is not checked against the identifier character set; callers
/// that require hygiene use [`validate_name`] instead.
///
/// # Errors
/// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if `offset` lies
/// past the end of the buffer, or [`Error::InvalidName`](crate::Error::InvalidName) if
/// no NUL terminator exists or the bytes are not valid UTF-8.
pub(crate) fn string_at(data: &[u8], offset: u32) -> Result<&str> {
    let start = offset as usize;
    if start >= data.len() {
        return Err(typelib_error!(
            TruncatedBuffer,
            "Buffer is too short while looking up string at offset {}",
            offset
        ));
    }

    match CStr::from_bytes_until_nul(&data[start..]) {
        Ok(raw) => raw
            .to_str()
            .map_err(|_| typelib_error!(InvalidName, "Invalid string at offset {}", offset)),
        Err(_) => Err(typelib_error!(
            InvalidName,
            "Unterminated string at offset {}",
            offset
        )),
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Validate the name at `offset` in the string pool and return it.
///
/// A name must be NUL-terminated within [`MAX_NAME_LEN`] bytes and contain only
/// characters from `[A-Za-z0-9_-]`. `what` names the field being validated and is
/// included in error messages.
///
/// # Errors
/// - [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if `offset` lies past
///   the end of the buffer
/// - [`Error::NameTooLong`](crate::Error::NameTooLong) if no NUL terminator is found
///   within [`MAX_NAME_LEN`] bytes
/// - [`Error::InvalidName`](crate::Error::InvalidName) if a byte falls outside the
///   permitted character set
pub(crate) fn validate_name<'a>(data: &'a [u8], what: &str, offset: u32) -> Result<&'a str> {
    let start = offset as usize;
    if start >= data.len() {
        return Err(typelib_error!(
            TruncatedBuffer,
            "Buffer is too short while looking up the {} name",
            what
        ));
    }

    let window_end = usize::min(start + MAX_NAME_LEN, data.len());
    let window = &data[start..window_end];

    let Some(nul) = window.iter().position(|&b| b == 0) else {
        return Err(typelib_error!(NameTooLong, "The {} is too long", what));
    };

    let name = &window[..nul];
    if !name.iter().all(|&b| is_name_byte(b)) {
        return Err(typelib_error!(
            InvalidName,
            "The {} contains invalid characters: '{}'",
            what,
            String::from_utf8_lossy(name)
        ));
    }

    // the character set is a subset of ASCII, so the conversion cannot fail
    std::str::from_utf8(name)
        .map_err(|_| typelib_error!(InvalidName, "The {} is not valid UTF-8", what))
}
