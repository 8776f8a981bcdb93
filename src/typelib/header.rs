//! Fixed typelib header decoding and fast structural checks.
//!
//! The header is the first 112 bytes of every typelib. Besides the magic and version
//! it records the entry counts, the offsets of the directory, attribute table, string
//! pool entries and section table, and one size field per blob kind. The blob size
//! fields are a strict part of the format contract: a file whose recorded sizes
//! disagree with the format constants is rejected outright, which pins the format to
//! `major_version == 4`.

use crate::{
    file::{io::read_le_at, is_aligned},
    typelib::{
        blobs::{
            ArgBlob, AttributeBlob, CallbackBlob, ConstantBlob, EnumBlob, FieldBlob, FunctionBlob,
            InterfaceBlob, ObjectBlob, PropertyBlob, SignalBlob, SignatureBlob, StructBlob,
            UnionBlob, VFuncBlob, ValueBlob,
        },
        directory::DirEntry,
    },
    Result,
};

/// The 16-byte magic identifier at the start of every typelib.
pub const TYPELIB_MAGIC: &[u8; 16] = b"GOBJ\nMETADATA\r\n\x1a";

/// The only supported major format version.
pub const TYPELIB_MAJOR_VERSION: u8 = 4;

/// The fixed typelib header.
///
/// All offsets are byte offsets from the start of the buffer; all string fields are
/// offsets into the string pool (0 meaning absent where documented). The struct is an
/// approximation of the on-disk record: the magic and padding are checked during
/// [`Header::read`] and not retained.
#[derive(Debug, Clone)]
pub struct Header {
    /// Major format version, always 4
    pub major_version: u8,
    /// Minor format version
    pub minor_version: u8,
    /// Number of entries in the directory
    pub n_entries: u16,
    /// Number of entries referring to blobs in this typelib; the local entries
    /// occupy the first `n_local_entries` positions of the directory
    pub n_local_entries: u16,
    /// Offset of the directory, 4-byte aligned
    pub directory: u32,
    /// Number of attribute blocks
    pub n_attributes: u32,
    /// Offset of the attribute table, 4-byte aligned
    pub attributes: u32,
    /// String pool offset of the `|`-separated dependency list, or 0
    pub dependencies: u32,
    /// Total size of the typelib; must equal the buffer length
    pub size: u32,
    /// String pool offset of the namespace name
    pub namespace: u32,
    /// String pool offset of the namespace version
    pub nsversion: u32,
    /// String pool offset of the comma-separated shared library list, or 0
    pub shared_library: u32,
    /// String pool offset of the comma-separated C prefix list, or 0
    pub c_prefix: u32,
    /// Recorded size of a directory entry
    pub entry_blob_size: u16,
    /// Recorded size of a function blob
    pub function_blob_size: u16,
    /// Recorded size of a callback blob
    pub callback_blob_size: u16,
    /// Recorded size of a signal blob
    pub signal_blob_size: u16,
    /// Recorded size of a vfunc blob
    pub vfunc_blob_size: u16,
    /// Recorded size of an argument blob
    pub arg_blob_size: u16,
    /// Recorded size of a property blob
    pub property_blob_size: u16,
    /// Recorded size of a field blob
    pub field_blob_size: u16,
    /// Recorded size of an enumeration value blob
    pub value_blob_size: u16,
    /// Recorded size of an attribute blob
    pub attribute_blob_size: u16,
    /// Recorded size of a constant blob
    pub constant_blob_size: u16,
    /// Reserved size slot for a removed blob kind; not cross-checked
    pub error_domain_blob_size: u16,
    /// Recorded size of a signature blob
    pub signature_blob_size: u16,
    /// Recorded size of an enum blob
    pub enum_blob_size: u16,
    /// Recorded size of a struct blob
    pub struct_blob_size: u16,
    /// Recorded size of an object blob
    pub object_blob_size: u16,
    /// Recorded size of an interface blob
    pub interface_blob_size: u16,
    /// Recorded size of a union blob
    pub union_blob_size: u16,
    /// Offset of the section table, or 0 when no sections are present
    pub sections: u32,
}

impl Header {
    /// Size of the on-disk header in bytes
    pub const SIZE: usize = 112;

    /// Decode the header and run the fast structural checks.
    ///
    /// This is the check that runs immediately on construction of a
    /// [`Typelib`](crate::Typelib): buffer length, magic, major version, entry count
    /// consistency, declared size, the blob-size table, table alignment, and the
    /// attribute count/offset pairing. Name validation is left to the full
    /// validation pass.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHeader`](crate::Error::InvalidHeader) describing the
    /// first check that failed.
    pub fn read(data: &[u8]) -> Result<Header> {
        if data.len() < Header::SIZE {
            return Err(typelib_error!(
                InvalidHeader,
                "The specified typelib length {} is too short",
                data.len()
            ));
        }

        if &data[0..16] != TYPELIB_MAGIC {
            return Err(typelib_error!(InvalidHeader, "Invalid magic header"));
        }

        let mut offset = 16;
        let header = Header {
            major_version: read_le_at::<u8>(data, &mut offset)?,
            minor_version: read_le_at::<u8>(data, &mut offset)?,
            n_entries: {
                // skip the reserved u16
                offset += 2;
                read_le_at::<u16>(data, &mut offset)?
            },
            n_local_entries: read_le_at::<u16>(data, &mut offset)?,
            directory: read_le_at::<u32>(data, &mut offset)?,
            n_attributes: read_le_at::<u32>(data, &mut offset)?,
            attributes: read_le_at::<u32>(data, &mut offset)?,
            dependencies: read_le_at::<u32>(data, &mut offset)?,
            size: read_le_at::<u32>(data, &mut offset)?,
            namespace: read_le_at::<u32>(data, &mut offset)?,
            nsversion: read_le_at::<u32>(data, &mut offset)?,
            shared_library: read_le_at::<u32>(data, &mut offset)?,
            c_prefix: read_le_at::<u32>(data, &mut offset)?,
            entry_blob_size: read_le_at::<u16>(data, &mut offset)?,
            function_blob_size: read_le_at::<u16>(data, &mut offset)?,
            callback_blob_size: read_le_at::<u16>(data, &mut offset)?,
            signal_blob_size: read_le_at::<u16>(data, &mut offset)?,
            vfunc_blob_size: read_le_at::<u16>(data, &mut offset)?,
            arg_blob_size: read_le_at::<u16>(data, &mut offset)?,
            property_blob_size: read_le_at::<u16>(data, &mut offset)?,
            field_blob_size: read_le_at::<u16>(data, &mut offset)?,
            value_blob_size: read_le_at::<u16>(data, &mut offset)?,
            attribute_blob_size: read_le_at::<u16>(data, &mut offset)?,
            constant_blob_size: read_le_at::<u16>(data, &mut offset)?,
            error_domain_blob_size: read_le_at::<u16>(data, &mut offset)?,
            signature_blob_size: read_le_at::<u16>(data, &mut offset)?,
            enum_blob_size: read_le_at::<u16>(data, &mut offset)?,
            struct_blob_size: read_le_at::<u16>(data, &mut offset)?,
            object_blob_size: read_le_at::<u16>(data, &mut offset)?,
            interface_blob_size: read_le_at::<u16>(data, &mut offset)?,
            union_blob_size: read_le_at::<u16>(data, &mut offset)?,
            sections: read_le_at::<u32>(data, &mut offset)?,
        };

        if header.major_version != TYPELIB_MAJOR_VERSION {
            return Err(typelib_error!(
                InvalidHeader,
                "Typelib version mismatch; expected {}, found {}",
                TYPELIB_MAJOR_VERSION,
                header.major_version
            ));
        }

        if header.n_entries < header.n_local_entries {
            return Err(typelib_error!(InvalidHeader, "Inconsistent entry counts"));
        }

        if header.size as usize != data.len() {
            return Err(typelib_error!(
                InvalidHeader,
                "Typelib size {} does not match {}",
                header.size,
                data.len()
            ));
        }

        // The hardcoded constants protect against inadvertent or buggy changes to
        // the typelib format itself; a file recording different sizes was produced
        // for an incompatible format revision.
        if header.entry_blob_size as usize != DirEntry::SIZE
            || header.function_blob_size as usize != FunctionBlob::SIZE
            || header.callback_blob_size as usize != CallbackBlob::SIZE
            || header.signal_blob_size as usize != SignalBlob::SIZE
            || header.vfunc_blob_size as usize != VFuncBlob::SIZE
            || header.arg_blob_size as usize != ArgBlob::SIZE
            || header.property_blob_size as usize != PropertyBlob::SIZE
            || header.field_blob_size as usize != FieldBlob::SIZE
            || header.value_blob_size as usize != ValueBlob::SIZE
            || header.attribute_blob_size as usize != AttributeBlob::SIZE
            || header.constant_blob_size as usize != ConstantBlob::SIZE
            || header.signature_blob_size as usize != SignatureBlob::SIZE
            || header.enum_blob_size as usize != EnumBlob::SIZE
            || header.struct_blob_size as usize != StructBlob::SIZE
            || header.object_blob_size as usize != ObjectBlob::SIZE
            || header.interface_blob_size as usize != InterfaceBlob::SIZE
            || header.union_blob_size as usize != UnionBlob::SIZE
        {
            return Err(typelib_error!(InvalidHeader, "Blob size mismatch"));
        }

        if !is_aligned(header.directory) {
            return Err(typelib_error!(InvalidHeader, "Misaligned directory"));
        }

        if !is_aligned(header.attributes) {
            return Err(typelib_error!(InvalidHeader, "Misaligned attributes"));
        }

        if header.attributes == 0 && header.n_attributes > 0 {
            return Err(typelib_error!(InvalidHeader, "Wrong number of attributes"));
        }

        Ok(header)
    }
}
