use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// A union blob.
///
/// Unions carry field and function counts like structs, plus optional
/// discriminator metadata. The validator accepts unions without walking their
/// tails, matching the established behavior for this blob kind.
#[derive(Debug, Clone, Copy)]
pub struct UnionBlob {
    /// Raw blob type tag, expected to be union
    pub blob_type: u16,
    /// Whether the union is deprecated
    pub deprecated: bool,
    /// Whether the union has no type-system registration
    pub unregistered: bool,
    /// Whether the union carries a discriminator field
    pub discriminated: bool,
    /// String pool offset of the union name
    pub name: u32,
    /// String pool offset of the type-system registration name, or 0
    pub gtype_name: u32,
    /// String pool offset of the type initializer symbol, or 0
    pub gtype_init: u32,
    /// Total size of the union in bytes, or 0 when unknown
    pub size: u32,
    /// Number of field blobs in the tail
    pub n_fields: u16,
    /// Number of method blobs in the tail
    pub n_functions: u16,
    /// String pool offset of the copy function symbol, or 0
    pub copy_func: u32,
    /// String pool offset of the free function symbol, or 0
    pub free_func: u32,
    /// Byte offset of the discriminator inside the union, when discriminated
    pub discriminator_offset: i32,
}

impl UnionBlob {
    /// Size of an on-disk union blob in bytes, excluding the tail
    pub const SIZE: usize = 40;

    /// Decode the union blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<UnionBlob> {
        bytes_at(data, offset, UnionBlob::SIZE)?;

        let mut cursor = offset as usize;
        let blob_type = read_le_at::<u16>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u16>(data, &mut cursor)?;

        Ok(UnionBlob {
            blob_type,
            deprecated: raw_flags & 0x0001 != 0,
            unregistered: raw_flags & 0x0002 != 0,
            discriminated: raw_flags & 0x0004 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_init: read_le_at::<u32>(data, &mut cursor)?,
            size: read_le_at::<u32>(data, &mut cursor)?,
            n_fields: read_le_at::<u16>(data, &mut cursor)?,
            n_functions: read_le_at::<u16>(data, &mut cursor)?,
            copy_func: read_le_at::<u32>(data, &mut cursor)?,
            free_func: read_le_at::<u32>(data, &mut cursor)?,
            discriminator_offset: read_le_at::<i32>(data, &mut cursor)?,
        })
    }
}
