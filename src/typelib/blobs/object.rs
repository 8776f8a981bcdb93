use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// An object (class) blob.
///
/// The tail follows contiguously in this order: implemented-interface indices
/// (2 bytes each, padded to 4-byte alignment), fields (each optionally trailed by
/// an embedded callback), properties, methods, signals, vfuncs, constants. The
/// number of embedded field callbacks observed while walking the fields must equal
/// `n_field_callbacks`.
#[derive(Debug, Clone, Copy)]
pub struct ObjectBlob {
    /// Raw blob type tag, expected to be object
    pub blob_type: u16,
    /// Whether the class is deprecated
    pub deprecated: bool,
    /// Whether the class is abstract
    pub abstract_: bool,
    /// Whether the class is a fundamental type outside the default type system
    pub fundamental: bool,
    /// Whether the class cannot be subclassed
    pub final_: bool,
    /// String pool offset of the class name
    pub name: u32,
    /// String pool offset of the type-system registration name
    pub gtype_name: u32,
    /// String pool offset of the type initializer symbol
    pub gtype_init: u32,
    /// Directory index of the parent class, or 0
    pub parent: u16,
    /// Directory index of the class structure, or 0
    pub gtype_struct: u16,
    /// Number of implemented-interface indices in the tail
    pub n_interfaces: u16,
    /// Number of field blobs in the tail
    pub n_fields: u16,
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
    /// Declared number of embedded field callbacks
    pub n_field_callbacks: u16,
    /// String pool offset of the ref function symbol for fundamental types, or 0
    pub ref_func: u32,
    /// String pool offset of the unref function symbol for fundamental types, or 0
    pub unref_func: u32,
    /// String pool offset of the value setter symbol for fundamental types, or 0
    pub set_value_func: u32,
    /// String pool offset of the value getter symbol for fundamental types, or 0
    pub get_value_func: u32,
}

impl ObjectBlob {
    /// Size of an on-disk object blob in bytes, excluding the tail
    pub const SIZE: usize = 60;

    /// Decode the object blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<ObjectBlob> {
        bytes_at(data, offset, ObjectBlob::SIZE)?;

        let mut cursor = offset as usize;
        let blob_type = read_le_at::<u16>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u16>(data, &mut cursor)?;

        Ok(ObjectBlob {
            blob_type,
            deprecated: raw_flags & 0x0001 != 0,
            abstract_: raw_flags & 0x0002 != 0,
            fundamental: raw_flags & 0x0004 != 0,
            final_: raw_flags & 0x0008 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_name: read_le_at::<u32>(data, &mut cursor)?,
            gtype_init: read_le_at::<u32>(data, &mut cursor)?,
            parent: read_le_at::<u16>(data, &mut cursor)?,
            gtype_struct: read_le_at::<u16>(data, &mut cursor)?,
            n_interfaces: read_le_at::<u16>(data, &mut cursor)?,
            n_fields: read_le_at::<u16>(data, &mut cursor)?,
            n_properties: read_le_at::<u16>(data, &mut cursor)?,
            n_methods: read_le_at::<u16>(data, &mut cursor)?,
            n_signals: read_le_at::<u16>(data, &mut cursor)?,
            n_vfuncs: read_le_at::<u16>(data, &mut cursor)?,
            n_constants: read_le_at::<u16>(data, &mut cursor)?,
            n_field_callbacks: read_le_at::<u16>(data, &mut cursor)?,
            ref_func: read_le_at::<u32>(data, &mut cursor)?,
            unref_func: read_le_at::<u32>(data, &mut cursor)?,
            set_value_func: read_le_at::<u32>(data, &mut cursor)?,
            get_value_func: read_le_at::<u32>(data, &mut cursor)?,
        })
    }
}
