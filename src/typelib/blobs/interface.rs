use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// An interface blob.
///
/// The tail follows contiguously in this order: prerequisite indices (2 bytes
/// each, padded to 4-byte alignment), properties, methods, signals, vfuncs,
/// constants. Each prerequisite must name an interface or object entry, or an
/// opaque non-local entry.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceBlob {
    /// Raw blob type tag, expected to be interface
    pub blob_type: u16,
    /// Whether the interface is deprecated
    pub deprecated: bool,
    /// String pool offset of the interface name
    pub name: u32,
    /// String pool offset of the type-system registration name
    pub gtype_name: u32,
    /// String pool offset of the type initializer symbol
    pub gtype_init: u32,
    /// Directory index of the interface structure, or 0
    pub gtype_struct: u16,
    /// Number of prerequisite indices in the tail
    pub n_prerequisites: u16,
    /// Number of property blobs in the tail
    pub n_properties: u16,
    /// Number of method blobs in the tail
    pub n_methods: u16,
    /// Number of signal blobs in the tail
    pub n_signals: u16,
    /// Number of vfunc blobs in the tail
    pub n_vfuncs: u16,
    /// Number of constant blobs in the tail
    pub n_constants: u16,
}

impl InterfaceBlob {
    /// Size of an on-disk interface blob in bytes, excluding the tail
    pub const SIZE: usize = 40;

    /// Decode the interface blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<InterfaceBlob> {
        bytes_at(data, offset, InterfaceBlob::SIZE)?;

        let mut cursor = offset as usize;
        Ok(InterfaceBlob {
            blob_type: read_le_at::<u16>(data, &mut cursor)?,
            deprecated: read_le_at::<u16>(data, &mut cursor)? & 0x0001 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_init: read_le_at::<u32>(data, &mut cursor)?,
            gtype_struct: read_le_at::<u16>(data, &mut cursor)?,
            n_prerequisites: read_le_at::<u16>(data, &mut cursor)?,
            n_properties: read_le_at::<u16>(data, &mut cursor)?,
            n_methods: read_le_at::<u16>(data, &mut cursor)?,
            n_signals: read_le_at::<u16>(data, &mut cursor)?,
            n_vfuncs: read_le_at::<u16>(data, &mut cursor)?,
            n_constants: read_le_at::<u16>(data, &mut cursor)?,
        })
    }
}
