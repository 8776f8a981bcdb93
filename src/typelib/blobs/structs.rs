use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// A struct or boxed blob, followed contiguously by its field blobs (each
/// optionally trailed by an embedded callback) and then its method blobs.
#[derive(Debug, Clone, Copy)]
pub struct StructBlob {
    /// Raw blob type tag, expected to be struct or boxed
    pub blob_type: u16,
    /// Whether the structure is deprecated
    pub deprecated: bool,
    /// Whether the structure has no type-system registration
    pub unregistered: bool,
    /// Whether the structure is the class or interface structure of another entry
    pub is_gtype_struct: bool,
    /// Required alignment of the structure, in bytes
    pub alignment: u8,
    /// Whether the structure is defined by a foreign binding
    pub foreign: bool,
    /// String pool offset of the structure name
    pub name: u32,
    /// String pool offset of the type-system registration name, or 0 when
    /// unregistered
    pub gtype_name: u32,
    /// String pool offset of the type initializer symbol, or 0 when unregistered
    pub gtype_init: u32,
    /// Total size of the structure in bytes, or 0 when unknown
    pub size: u32,
    /// Number of field blobs in the tail
    pub n_fields: u16,
    /// Number of method blobs in the tail
    pub n_methods: u16,
    /// String pool offset of the copy function symbol, or 0
    pub copy_func: u32,
    /// String pool offset of the free function symbol, or 0
    pub free_func: u32,
}

impl StructBlob {
    /// Size of an on-disk struct blob in bytes
    pub const SIZE: usize = 32;

    /// Decode the struct blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<StructBlob> {
        bytes_at(data, offset, StructBlob::SIZE)?;

        let mut cursor = offset as usize;
        let blob_type = read_le_at::<u16>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u16>(data, &mut cursor)?;

        Ok(StructBlob {
            blob_type,
            deprecated: raw_flags & 0x0001 != 0,
            unregistered: raw_flags & 0x0002 != 0,
            is_gtype_struct: raw_flags & 0x0004 != 0,
            alignment: ((raw_flags >> 3) & 0x3F) as u8,
            foreign: raw_flags & 0x0200 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_init: read_le_at::<u32>(data, &mut cursor)?,
            size: read_le_at::<u32>(data, &mut cursor)?,
            n_fields: read_le_at::<u16>(data, &mut cursor)?,
            n_methods: read_le_at::<u16>(data, &mut cursor)?,
            copy_func: read_le_at::<u32>(data, &mut cursor)?,
            free_func: read_le_at::<u32>(data, &mut cursor)?,
        })
    }
}
