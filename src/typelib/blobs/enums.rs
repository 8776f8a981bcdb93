use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// An enum or flags blob, followed contiguously by its value blobs and then its
/// method blobs.
///
/// Enum blobs may record an error domain name, which makes them discoverable
/// through the error-domain lookup.
#[derive(Debug, Clone, Copy)]
pub struct EnumBlob {
    /// Raw blob type tag, expected to be enum or flags
    pub blob_type: u16,
    /// Whether the enumeration is deprecated
    pub deprecated: bool,
    /// Whether the enumeration has no type-system registration
    pub unregistered: bool,
    /// Storage type tag used for values of the enumeration
    pub storage_type: u8,
    /// String pool offset of the enumeration name
    pub name: u32,
    /// String pool offset of the type-system registration name, or 0 when
    /// unregistered
    pub gtype_name: u32,
    /// String pool offset of the type initializer symbol, or 0 when unregistered
    pub gtype_init: u32,
    /// Number of value blobs in the tail
    pub n_values: u16,
    /// Number of method blobs in the tail
    pub n_methods: u16,
    /// String pool offset of the error domain name, or 0
    pub error_domain: u32,
}

impl EnumBlob {
    /// Size of an on-disk enum blob in bytes
    pub const SIZE: usize = 24;

    /// Decode the enum blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<EnumBlob> {
        bytes_at(data, offset, EnumBlob::SIZE)?;

        let mut cursor = offset as usize;
        let blob_type = read_le_at::<u16>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u16>(data, &mut cursor)?;

        Ok(EnumBlob {
            blob_type,
            deprecated: raw_flags & 0x0001 != 0,
            unregistered: raw_flags & 0x0002 != 0,
            storage_type: ((raw_flags >> 2) & 0x1F) as u8,
            name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_init: read_le_at::<u32>(data, &mut cursor)?,
            n_values: read_le_at::<u16>(data, &mut cursor)?,
            n_methods: read_le_at::<u16>(data, &mut cursor)?,
            error_domain: read_le_at::<u32>(data, &mut cursor)?,
        })
    }
}

/// A single enumeration value.
///
/// Duplicate values are permitted; the validator only checks the name.
#[derive(Debug, Clone, Copy)]
pub struct ValueBlob {
    /// Whether the value is deprecated
    pub deprecated: bool,
    /// Whether the 32-bit value should be interpreted as unsigned
    pub unsigned_value: bool,
    /// String pool offset of the value name
    pub name: u32,
    /// The value, sign-interpreted according to `unsigned_value`
    pub value: i32,
}

impl ValueBlob {
    /// Size of an on-disk value blob in bytes
    pub const SIZE: usize = 12;

    /// Decode the value blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<ValueBlob> {
        bytes_at(data, offset, ValueBlob::SIZE)?;

        let mut cursor = offset as usize;
        let raw_flags = read_le_at::<u32>(data, &mut cursor)?;

        Ok(ValueBlob {
            deprecated: raw_flags & 0x0000_0001 != 0,
            unsigned_value: raw_flags & 0x0000_0002 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            value: read_le_at::<i32>(data, &mut cursor)?,
        })
    }
}
