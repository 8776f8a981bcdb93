use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Access and construction flags of a property blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PropertyFlags: u32 {
        /// The property is deprecated
        const DEPRECATED                   = 1 << 0;
        /// The property may be read
        const READABLE                     = 1 << 1;
        /// The property may be written
        const WRITABLE                     = 1 << 2;
        /// The property may be set at construction time
        const CONSTRUCT                    = 1 << 3;
        /// The property may only be set at construction time
        const CONSTRUCT_ONLY               = 1 << 4;
        /// Ownership of the value transfers on set
        const TRANSFER_OWNERSHIP           = 1 << 5;
        /// Ownership of the container transfers, but not its elements
        const TRANSFER_CONTAINER_OWNERSHIP = 1 << 6;
    }
}

/// A property blob inside an object or interface.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBlob {
    /// String pool offset of the property name
    pub name: u32,
    /// Access and construction flags
    pub flags: PropertyFlags,
}

impl PropertyBlob {
    /// Size of an on-disk property blob in bytes
    pub const SIZE: usize = 16;

    /// Offset of the property type slot within the blob
    pub const TYPE_OFFSET: u32 = 12;

    /// Decode the property blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<PropertyBlob> {
        bytes_at(data, offset, PropertyBlob::SIZE)?;

        let mut cursor = offset as usize;
        Ok(PropertyBlob {
            name: read_le_at::<u32>(data, &mut cursor)?,
            flags: PropertyFlags::from_bits_truncate(read_le_at::<u32>(data, &mut cursor)?),
        })
    }
}
