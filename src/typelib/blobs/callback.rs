use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

/// A callback blob: a named function pointer type with a signature.
///
/// Callbacks appear both as top-level directory entries and embedded after field
/// blobs whose `has_embedded_type` flag is set.
#[derive(Debug, Clone, Copy)]
pub struct CallbackBlob {
    /// Raw blob type tag, expected to be callback
    pub blob_type: u16,
    /// Whether the callback is deprecated
    pub deprecated: bool,
    /// String pool offset of the callback name
    pub name: u32,
    /// Byte offset of the signature blob
    pub signature: u32,
}

impl CallbackBlob {
    /// Size of an on-disk callback blob in bytes
    pub const SIZE: usize = 12;

    /// Decode the callback blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<CallbackBlob> {
        bytes_at(data, offset, CallbackBlob::SIZE)?;

        let mut cursor = offset as usize;
        Ok(CallbackBlob {
            blob_type: read_le_at::<u16>(data, &mut cursor)?,
            deprecated: read_le_at::<u16>(data, &mut cursor)? & 0x0001 != 0,
            name: read_le_at::<u32>(data, &mut cursor)?,
            signature: read_le_at::<u32>(data, &mut cursor)?,
        })
    }
}
