//! Directory entries and checked index access.
//!
//! The directory is an array of fixed 12-byte entries starting at
//! `header.directory`. The first `n_local_entries` positions describe blobs defined
//! in this typelib; the remaining positions are references into other typelibs and
//! carry only a namespace name and a local name. Directory indices are 1-based
//! throughout the format.

use crate::{
    file::{bytes_at, io::read_le_at},
    typelib::header::Header,
    Result,
};

/// Tag identifying the kind of a top-level blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum BlobType {
    /// Reserved invalid tag
    Invalid = 0,
    /// A namespace-level function
    Function = 1,
    /// A callback type
    Callback = 2,
    /// A structure
    Struct = 3,
    /// A boxed type (struct layout with registered copy/free semantics)
    Boxed = 4,
    /// An enumeration
    Enum = 5,
    /// A flags enumeration
    Flags = 6,
    /// A class
    Object = 7,
    /// An interface
    Interface = 8,
    /// A constant
    Constant = 9,
    /// A union
    Union = 11,
}

impl BlobType {
    /// The highest assigned blob type tag.
    pub const MAX: u16 = BlobType::Union as u16;

    /// Map a raw tag to a known blob type, or `None` for unassigned tags.
    #[must_use]
    pub fn from_u16(value: u16) -> Option<BlobType> {
        match value {
            0 => Some(BlobType::Invalid),
            1 => Some(BlobType::Function),
            2 => Some(BlobType::Callback),
            3 => Some(BlobType::Struct),
            4 => Some(BlobType::Boxed),
            5 => Some(BlobType::Enum),
            6 => Some(BlobType::Flags),
            7 => Some(BlobType::Object),
            8 => Some(BlobType::Interface),
            9 => Some(BlobType::Constant),
            11 => Some(BlobType::Union),
            _ => None,
        }
    }
}

/// One directory entry.
///
/// For local entries `offset` is the byte offset of the described blob; for
/// non-local entries it is the string pool offset of the defining namespace name.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
    /// Blob type tag; kept raw because non-local entries may carry tags this
    /// typelib does not define
    pub blob_type: u16,
    /// Whether the entry is defined in this typelib
    pub local: bool,
    /// String pool offset of the entry name
    pub name: u32,
    /// Blob offset (local) or namespace name offset (non-local)
    pub offset: u32,
}

impl DirEntry {
    /// Size of an on-disk directory entry in bytes
    pub const SIZE: usize = 12;

    /// Decode the directory entry at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if fewer
    /// than [`DirEntry::SIZE`] bytes remain at `offset`.
    pub fn read(data: &[u8], offset: u32) -> Result<DirEntry> {
        bytes_at(data, offset, DirEntry::SIZE)?;

        let mut cursor = offset as usize;
        Ok(DirEntry {
            blob_type: read_le_at::<u16>(data, &mut cursor)?,
            local: read_le_at::<u16>(data, &mut cursor)? & 0x0001 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            offset: read_le_at::<u32>(data, &mut cursor)?,
        })
    }

    /// Whether this entry names a registered-type blob kind
    /// (struct, boxed, enum, flags, object, or interface).
    #[must_use]
    pub fn is_registered_type(&self) -> bool {
        matches!(
            BlobType::from_u16(self.blob_type),
            Some(
                BlobType::Struct
                    | BlobType::Boxed
                    | BlobType::Enum
                    | BlobType::Flags
                    | BlobType::Object
                    | BlobType::Interface
            )
        )
    }
}

/// Fetch the directory entry at 1-based `index`, verifying both the index range and
/// the buffer bounds.
///
/// # Errors
/// Returns [`Error::InvalidBlob`](crate::Error::InvalidBlob) when `index` is zero or
/// exceeds `header.n_entries`, or
/// [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) when the entry does not
/// fit inside the buffer.
pub(crate) fn dir_entry(data: &[u8], header: &Header, index: u16) -> Result<DirEntry> {
    if index == 0 || index > header.n_entries {
        return Err(typelib_error!(InvalidBlob, "Invalid directory index {}", index));
    }

    let offset = u64::from(header.directory)
        + u64::from(index - 1) * u64::from(header.entry_blob_size);
    let offset = u32::try_from(offset).map_err(|_| {
        typelib_error!(TruncatedBuffer, "Directory entry {} lies outside the buffer", index)
    })?;
    DirEntry::read(data, offset)
}
