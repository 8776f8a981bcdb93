//! Low-level byte order and safe reading utilities for typelib parsing.
//!
//! This module provides the [`TypelibIO`] trait for safe reading of primitive types
//! from byte slices. All multi-byte values in a typelib are little-endian; every read
//! is bounds-checked so that attacker-controlled offsets cannot cause out-of-bounds
//! access.

use crate::Result;

/// Trait for implementing type specific safe readers
///
/// This trait abstracts over reading primitive types from byte slices in a safe way.
/// It is implemented for all integer types used in typelib parsing.
pub trait TypelibIO: Sized {
    #[allow(missing_docs)]
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

impl TypelibIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }
}

impl TypelibIO for i8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i8::from_le_bytes(bytes)
    }
}

impl TypelibIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

impl TypelibIO for i16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i16::from_le_bytes(bytes)
    }
}

impl TypelibIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

impl TypelibIO for i32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i32::from_le_bytes(bytes)
    }
}

impl TypelibIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

/// Read a value of type T from `data` at `*offset` in little-endian, advancing `offset`.
///
/// # Errors
/// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the read would
/// exceed the data length.
pub fn read_le_at<T: TypelibIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let size = std::mem::size_of::<T>();
    let end = offset.checked_add(size).ok_or_else(|| {
        typelib_error!(
            TruncatedBuffer,
            "Read of {} bytes at offset {} overflows",
            size,
            offset
        )
    })?;

    if end > data.len() {
        return Err(typelib_error!(
            TruncatedBuffer,
            "The buffer is too short: read of {} bytes at offset {}, length {}",
            size,
            offset,
            data.len()
        ));
    }

    let Ok(bytes) = T::Bytes::try_from(&data[*offset..end]) else {
        return Err(typelib_error!(
            TruncatedBuffer,
            "The buffer is too short: read of {} bytes at offset {}",
            size,
            offset
        ));
    };

    *offset = end;
    Ok(T::from_le_bytes(bytes))
}

/// Read a value of type T from the start of `data` in little-endian.
///
/// # Errors
/// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the read would
/// exceed the data length.
pub fn read_le<T: TypelibIO>(data: &[u8]) -> Result<T> {
    read_le_at::<T>(data, &mut 0)
}
