use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Access flags of a field blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u8 {
        /// The field may be read
        const READABLE          = 1 << 0;
        /// The field may be written
        const WRITABLE          = 1 << 1;
        /// A callback blob follows the field immediately, replacing the type slot
        const HAS_EMBEDDED_TYPE = 1 << 2;
    }
}

/// A field blob inside a struct, union, or object.
///
/// When [`FieldFlags::HAS_EMBEDDED_TYPE`] is set, the bytes immediately after the
/// field are a callback blob describing the field's function pointer type, and the
/// inline type slot is unused.
#[derive(Debug, Clone, Copy)]
pub struct FieldBlob {
    /// String pool offset of the field name
    pub name: u32,
    /// Access flags
    pub flags: FieldFlags,
    /// Bit width for bitfields, or 0
    pub bits: u8,
    /// Byte offset of the field inside its containing structure
    pub struct_offset: u16,
}

impl FieldBlob {
    /// Size of an on-disk field blob in bytes, excluding any embedded callback
    pub const SIZE: usize = 16;

    /// Offset of the field type slot within the blob
    pub const TYPE_OFFSET: u32 = 12;

    /// Decode the field blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<FieldBlob> {
        bytes_at(data, offset, FieldBlob::SIZE)?;

        let mut cursor = offset as usize;
        Ok(FieldBlob {
            name: read_le_at::<u32>(data, &mut cursor)?,
            flags: FieldFlags::from_bits_truncate(read_le_at::<u8>(data, &mut cursor)?),
            bits: read_le_at::<u8>(data, &mut cursor)?,
            struct_offset: read_le_at::<u16>(data, &mut cursor)?,
        })
    }

    /// Whether a callback blob follows this field in the container's tail.
    #[must_use]
    pub fn has_embedded_type(&self) -> bool {
        self.flags.contains(FieldFlags::HAS_EMBEDDED_TYPE)
    }
}
